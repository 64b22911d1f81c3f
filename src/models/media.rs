//! APOD media records.
//!
//! `ApodRecord` mirrors the JSON the backend sends; `MediaItem` is the
//! canonical form used everywhere else. Conversion happens once, at the
//! client boundary.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::{ApodError, Result};

/// Shown when a video has no usable thumbnail source.
pub const PLACEHOLDER_THUMBNAIL: &str =
    "https://upload.wikimedia.org/wikipedia/commons/thumb/a/ac/No_image_available.svg/1024px-No_image_available.svg.png";

/// Date format used on the wire and in cache keys.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Parse a `YYYY-MM-DD` date.
pub fn parse_date(value: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), DATE_FORMAT)
        .map_err(|_| ApodError::InvalidDate(value.to_string()))
}

/// Kind of media attached to an entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaType {
    Image,
    Video,
    /// Anything else the backend reports (e.g. "other").
    Other,
}

impl MediaType {
    pub fn from_str(s: &str) -> Self {
        match s.trim().to_ascii_lowercase().as_str() {
            "image" => MediaType::Image,
            "video" => MediaType::Video,
            _ => MediaType::Other,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            MediaType::Image => "image",
            MediaType::Video => "video",
            MediaType::Other => "other",
        }
    }

    pub fn is_image(&self) -> bool {
        matches!(self, MediaType::Image)
    }
}

/// Raw record as returned by `/apod` and `/apod/range`.
///
/// The high-resolution URL shows up as either `hdurl` or `hdUrl`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ApodRecord {
    pub date: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub explanation: String,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub hdurl: Option<String>,
    #[serde(default, rename = "hdUrl")]
    pub hd_url: Option<String>,
    #[serde(default)]
    pub media_type: Option<String>,
    #[serde(default)]
    pub copyright: Option<String>,
}

impl TryFrom<ApodRecord> for MediaItem {
    type Error = ApodError;

    fn try_from(record: ApodRecord) -> Result<Self> {
        let date = NaiveDate::parse_from_str(record.date.trim(), DATE_FORMAT)
            .map_err(|_| ApodError::Decode(format!("bad date '{}'", record.date)))?;

        let hd_url = record
            .hdurl
            .or(record.hd_url)
            .filter(|u| !u.trim().is_empty());

        Ok(MediaItem {
            date,
            title: record.title,
            explanation: record.explanation,
            url: record.url.unwrap_or_default(),
            hd_url,
            media_type: record
                .media_type
                .as_deref()
                .map(MediaType::from_str)
                .unwrap_or(MediaType::Other),
            copyright: record.copyright.filter(|c| !c.trim().is_empty()),
        })
    }
}

/// One daily APOD entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MediaItem {
    pub date: NaiveDate,
    pub title: String,
    pub explanation: String,
    /// Primary media location (image, or embeddable player for video).
    pub url: String,
    pub hd_url: Option<String>,
    pub media_type: MediaType,
    pub copyright: Option<String>,
}

impl MediaItem {
    /// ISO date string, also the natural cache key.
    pub fn date_key(&self) -> String {
        self.date.format(DATE_FORMAT).to_string()
    }

    pub fn is_video(&self) -> bool {
        matches!(self.media_type, MediaType::Video)
    }

    /// High-resolution URL when present, otherwise the primary URL.
    pub fn best_url(&self) -> &str {
        self.hd_url.as_deref().unwrap_or(&self.url)
    }

    /// Copyright with embedded line breaks stripped.
    pub fn display_copyright(&self) -> Option<String> {
        self.copyright
            .as_deref()
            .map(|c| c.replace(['\n', '\r'], ""))
    }

    /// Suggested filename for saving the image.
    pub fn download_filename(&self) -> String {
        format!("APOD-{}.jpg", self.date_key())
    }

    /// Still image to show in grid cards.
    pub fn thumbnail_url(&self) -> String {
        if self.media_type.is_image() {
            return self.url.clone();
        }
        video_thumbnail(&self.url)
    }
}

/// Derive a still thumbnail for an embedded video URL.
pub fn video_thumbnail(url: &str) -> String {
    if url.trim().is_empty() {
        return PLACEHOLDER_THUMBNAIL.to_string();
    }

    if url.contains("youtube.com") || url.contains("youtu.be") {
        let video_id = url
            .rsplit('/')
            .next()
            .and_then(|segment| segment.split('?').next())
            .unwrap_or_default();
        return format!("https://img.youtube.com/vi/{}/hqdefault.jpg", video_id);
    }

    url.to_string()
}
