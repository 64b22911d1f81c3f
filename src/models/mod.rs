//! Domain models.

mod media;

pub use media::{
    parse_date, video_thumbnail, ApodRecord, MediaItem, MediaType, DATE_FORMAT,
    PLACEHOLDER_THUMBNAIL,
};
