//! Hero banner: a single picked date and its entry.
//!
//! Lookups never fail outward. Transport errors and missing entries both
//! collapse into [`HeroView::SignalLost`], which renders as an inert banner
//! with the download action disabled.

use std::time::Duration;

use chrono::NaiveDate;
use tracing::{debug, info, warn};

use crate::cache::{ResponseCache, DEFAULT_TTL};
use crate::client::ApodApi;
use crate::error::{ApodError, Result};
use crate::models::{MediaItem, DATE_FORMAT};

pub const SIGNAL_LOST_TITLE: &str = "Signal Lost";
pub const SIGNAL_LOST_EXPLANATION: &str = "We couldn't retrieve the visual data for this stardate. \
It is likely a future date or the transmission was intercepted. \
Please adjust your mission clock (Date Picker).";

/// Cache key used when no date is picked.
const LATEST_KEY: &str = "latest";

/// First day APOD was published.
pub fn first_apod_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(1995, 6, 16).unwrap_or(NaiveDate::MIN)
}

/// A date accepted by the hero date picker: `1995-06-16 ..= today`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct HeroDate(NaiveDate);

impl HeroDate {
    pub fn new(date: NaiveDate, today: NaiveDate) -> Result<Self> {
        let min = first_apod_date();
        if date < min || date > today {
            return Err(ApodError::OutOfRange {
                date,
                min,
                max: today,
            });
        }
        Ok(Self(date))
    }

    /// Initial selection: yesterday.
    pub fn default_for(today: NaiveDate) -> Self {
        Self(today.pred_opt().unwrap_or(today).max(first_apod_date()))
    }

    pub fn date(&self) -> NaiveDate {
        self.0
    }

    pub fn key(&self) -> String {
        self.0.format(DATE_FORMAT).to_string()
    }
}

/// Banner background.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HeroMedia {
    Image(String),
    Embed(String),
    /// Static-noise placeholder shown when the signal is lost.
    Static,
}

/// Enabled download action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadAction {
    pub url: String,
    pub filename: String,
}

/// Presentation state of the hero banner.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HeroView {
    Loaded(MediaItem),
    SignalLost,
}

impl HeroView {
    pub fn is_signal_lost(&self) -> bool {
        matches!(self, HeroView::SignalLost)
    }

    pub fn item(&self) -> Option<&MediaItem> {
        match self {
            HeroView::Loaded(item) => Some(item),
            HeroView::SignalLost => None,
        }
    }

    pub fn badge(&self) -> String {
        match self {
            HeroView::Loaded(item) => format!("APOD • {}", item.date_key()),
            HeroView::SignalLost => "TRANSMISSION ERROR".to_string(),
        }
    }

    pub fn title(&self) -> &str {
        match self {
            HeroView::Loaded(item) => &item.title,
            HeroView::SignalLost => SIGNAL_LOST_TITLE,
        }
    }

    pub fn explanation(&self) -> &str {
        match self {
            HeroView::Loaded(item) => &item.explanation,
            HeroView::SignalLost => SIGNAL_LOST_EXPLANATION,
        }
    }

    pub fn media(&self) -> HeroMedia {
        match self {
            HeroView::Loaded(item) if item.media_type.is_image() => {
                HeroMedia::Image(item.best_url().to_string())
            }
            HeroView::Loaded(item) => HeroMedia::Embed(item.url.clone()),
            HeroView::SignalLost => HeroMedia::Static,
        }
    }

    /// Download action, `None` when disabled.
    pub fn download(&self) -> Option<DownloadAction> {
        match self {
            HeroView::Loaded(item) if item.media_type.is_image() => Some(DownloadAction {
                url: item.best_url().to_string(),
                filename: item.download_filename(),
            }),
            _ => None,
        }
    }

    pub fn download_label(&self) -> &'static str {
        match self {
            HeroView::Loaded(_) => "Download HD",
            HeroView::SignalLost => "No Signal",
        }
    }
}

/// Single-date lookup with a per-date cache and one retry.
pub struct HeroLookup<A> {
    api: A,
    cache: ResponseCache<MediaItem>,
    max_attempts: u32,
    retry_delay: Duration,
}

impl<A: ApodApi> HeroLookup<A> {
    pub fn new(api: A) -> Self {
        Self::with_ttl(api, DEFAULT_TTL)
    }

    pub fn with_ttl(api: A, ttl: Duration) -> Self {
        Self {
            api,
            cache: ResponseCache::new(ttl),
            max_attempts: 2,
            retry_delay: Duration::from_secs(1),
        }
    }

    pub fn with_retry_delay(mut self, delay: Duration) -> Self {
        self.retry_delay = delay;
        self
    }

    pub fn api(&self) -> &A {
        &self.api
    }

    pub fn cache(&self) -> &ResponseCache<MediaItem> {
        &self.cache
    }

    /// Resolve the banner for `date` (`None` = most recent entry).
    pub async fn lookup(&mut self, date: Option<HeroDate>) -> HeroView {
        let key = date.map(|d| d.key()).unwrap_or_else(|| LATEST_KEY.to_string());

        if let Some(item) = self.cache.get_fresh(&key) {
            debug!("Hero cache hit for {}", key);
            return HeroView::Loaded(item);
        }

        match self.fetch_with_retry(date.map(|d| d.date())).await {
            Ok(item) => {
                info!("Loaded hero entry {} ({})", item.date_key(), item.title);
                self.cache.insert(key, item.clone());
                HeroView::Loaded(item)
            }
            Err(e) => {
                warn!("Hero lookup for {} failed: {}", key, e);
                HeroView::SignalLost
            }
        }
    }

    async fn fetch_with_retry(&self, date: Option<NaiveDate>) -> Result<MediaItem> {
        let mut attempt = 1;
        loop {
            match self.api.fetch_day(date).await {
                Ok(item) => return Ok(item),
                Err(e) if attempt < self.max_attempts => {
                    debug!("Hero fetch attempt {} failed: {}, retrying", attempt, e);
                    attempt += 1;
                    if !self.retry_delay.is_zero() {
                        tokio::time::sleep(self.retry_delay).await;
                    }
                }
                Err(e) => return Err(e),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::MediaType;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, DATE_FORMAT).unwrap()
    }

    fn image(d: &str) -> MediaItem {
        MediaItem {
            date: date(d),
            title: "Pillars of Creation".to_string(),
            explanation: "Gas and dust.".to_string(),
            url: "https://apod.example/std.jpg".to_string(),
            hd_url: Some("https://apod.example/hd.jpg".to_string()),
            media_type: MediaType::Image,
            copyright: None,
        }
    }

    #[test]
    fn test_hero_date_bounds() {
        let today = date("2024-06-10");
        assert!(HeroDate::new(date("1995-06-16"), today).is_ok());
        assert!(HeroDate::new(today, today).is_ok());
        assert!(matches!(
            HeroDate::new(date("1995-06-15"), today),
            Err(ApodError::OutOfRange { .. })
        ));
        assert!(matches!(
            HeroDate::new(date("2024-06-11"), today),
            Err(ApodError::OutOfRange { .. })
        ));
    }

    #[test]
    fn test_default_is_yesterday() {
        let hero = HeroDate::default_for(date("2024-06-10"));
        assert_eq!(hero.date(), date("2024-06-09"));
        assert_eq!(hero.key(), "2024-06-09");
    }

    #[test]
    fn test_signal_lost_view() {
        let view = HeroView::SignalLost;
        assert_eq!(view.title(), "Signal Lost");
        assert_eq!(view.badge(), "TRANSMISSION ERROR");
        assert_eq!(view.media(), HeroMedia::Static);
        assert_eq!(view.download(), None);
        assert_eq!(view.download_label(), "No Signal");
    }

    #[test]
    fn test_loaded_image_view() {
        let view = HeroView::Loaded(image("2024-06-09"));
        assert_eq!(view.badge(), "APOD • 2024-06-09");
        assert_eq!(view.media(), HeroMedia::Image("https://apod.example/hd.jpg".to_string()));
        assert_eq!(
            view.download(),
            Some(DownloadAction {
                url: "https://apod.example/hd.jpg".to_string(),
                filename: "APOD-2024-06-09.jpg".to_string(),
            })
        );
        assert_eq!(view.download_label(), "Download HD");
    }

    #[test]
    fn test_loaded_video_view_has_no_download() {
        let mut item = image("2024-06-09");
        item.media_type = MediaType::Video;
        item.url = "https://www.youtube.com/embed/xyz".to_string();
        let view = HeroView::Loaded(item);
        assert_eq!(
            view.media(),
            HeroMedia::Embed("https://www.youtube.com/embed/xyz".to_string())
        );
        assert_eq!(view.download(), None);
    }
}
