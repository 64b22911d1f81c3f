//! Remote data client for the APOD backend.

mod http;
mod throttle;

pub use http::{resolve_user_agent, ApodClient};
pub use throttle::{Throttle, ThrottleConfig, ThrottleStats};

use async_trait::async_trait;
use chrono::NaiveDate;

use crate::error::Result;
use crate::gallery::DateWindow;
use crate::models::MediaItem;

/// Read access to APOD entries.
///
/// Implemented over HTTP by [`ApodClient`]; the pagination store and hero
/// lookup only depend on this trait.
#[async_trait]
pub trait ApodApi: Send + Sync {
    /// Fetch the entry for one date, or the most recent entry when `None`.
    async fn fetch_day(&self, date: Option<NaiveDate>) -> Result<MediaItem>;

    /// Fetch every entry within an inclusive date window, in no particular order.
    async fn fetch_range(&self, window: DateWindow) -> Result<Vec<MediaItem>>;
}
