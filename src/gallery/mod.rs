//! Archive gallery: date cursor, pagination store, search, and selection.

mod archive;
mod cursor;
mod filter;
mod selection;

pub use archive::{ArchiveStats, ArchiveStatus, ArchiveStore, FetchOutcome, Footer, PendingFetch};
pub use cursor::{
    earliest_date, first_window, next_window, window_before, DateWindow, WINDOW_DAYS,
};
pub use filter::filter_by_title;
pub use selection::{DetailMedia, DetailView, Selection};
