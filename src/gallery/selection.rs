//! Selected entry and its detail view.

use chrono::NaiveDate;

use crate::models::MediaItem;

/// At most one entry open for detailed viewing.
///
/// Selecting stores a copy of an already-loaded entry; nothing is refetched.
#[derive(Debug, Clone, Default)]
pub struct Selection {
    current: Option<MediaItem>,
}

impl Selection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Open `item`, replacing any previous selection.
    pub fn select(&mut self, item: &MediaItem) {
        self.current = Some(item.clone());
    }

    pub fn clear(&mut self) {
        self.current = None;
    }

    pub fn current(&self) -> Option<&MediaItem> {
        self.current.as_ref()
    }

    pub fn is_open(&self) -> bool {
        self.current.is_some()
    }

    pub fn detail(&self) -> Option<DetailView> {
        self.current.as_ref().map(DetailView::from)
    }
}

/// Media panel of the detail view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DetailMedia {
    Image {
        /// Full-size source, high resolution when available.
        src: String,
        /// Standard-resolution image used as blurred backdrop.
        backdrop: String,
    },
    /// Embedded player.
    Embed { src: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DetailView {
    pub date: NaiveDate,
    pub title: String,
    pub copyright: Option<String>,
    pub explanation: String,
    /// Target of "View High-Res Source".
    pub source_url: String,
    pub media: DetailMedia,
}

impl From<&MediaItem> for DetailView {
    fn from(item: &MediaItem) -> Self {
        let media = if item.media_type.is_image() {
            DetailMedia::Image {
                src: item.best_url().to_string(),
                backdrop: item.url.clone(),
            }
        } else {
            DetailMedia::Embed {
                src: item.url.clone(),
            }
        };

        DetailView {
            date: item.date,
            title: item.title.clone(),
            copyright: item.display_copyright(),
            explanation: item.explanation.clone(),
            source_url: item.best_url().to_string(),
            media,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::MediaType;

    fn item(title: &str, media_type: MediaType, hd: Option<&str>) -> MediaItem {
        MediaItem {
            date: NaiveDate::from_ymd_opt(2024, 6, 9).unwrap(),
            title: title.to_string(),
            explanation: "A long explanation.".to_string(),
            url: "https://apod.example/std.jpg".to_string(),
            hd_url: hd.map(str::to_string),
            media_type,
            copyright: Some("Ann\nSmith".to_string()),
        }
    }

    #[test]
    fn test_select_and_clear() {
        let mut selection = Selection::new();
        assert!(!selection.is_open());

        let first = item("First", MediaType::Image, None);
        let second = item("Second", MediaType::Image, None);

        selection.select(&first);
        assert_eq!(selection.current().unwrap().title, "First");

        selection.select(&second);
        assert_eq!(selection.current().unwrap().title, "Second");

        selection.clear();
        assert!(selection.current().is_none());
        assert!(selection.detail().is_none());
    }

    #[test]
    fn test_image_detail_prefers_hd() {
        let detail = DetailView::from(&item("M42", MediaType::Image, Some("https://apod.example/hd.jpg")));
        assert_eq!(detail.source_url, "https://apod.example/hd.jpg");
        assert_eq!(
            detail.media,
            DetailMedia::Image {
                src: "https://apod.example/hd.jpg".to_string(),
                backdrop: "https://apod.example/std.jpg".to_string(),
            }
        );
        assert_eq!(detail.copyright.as_deref(), Some("AnnSmith"));
    }

    #[test]
    fn test_video_detail_embeds_url() {
        let mut video = item("Launch", MediaType::Video, None);
        video.url = "https://www.youtube.com/embed/abc".to_string();
        video.copyright = None;

        let detail = DetailView::from(&video);
        assert_eq!(
            detail.media,
            DetailMedia::Embed {
                src: "https://www.youtube.com/embed/abc".to_string()
            }
        );
        assert_eq!(detail.copyright, None);
    }
}
