//! reqwest-backed APOD client.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use chrono::NaiveDate;
use reqwest::Client;
use serde::de::DeserializeOwned;
use tracing::debug;
use url::Url;

use super::throttle::{Throttle, ThrottleConfig};
use super::ApodApi;
use crate::config::Settings;
use crate::error::{ApodError, Result};
use crate::gallery::DateWindow;
use crate::models::{ApodRecord, MediaItem, DATE_FORMAT};

const USER_AGENT: &str = concat!("apod-explorer/", env!("CARGO_PKG_VERSION"));

/// Resolve user agent from config value.
/// - None or empty => default apod-explorer user agent
/// - other => custom user agent string
pub fn resolve_user_agent(config: Option<&str>) -> String {
    match config.map(str::trim) {
        None | Some("") => USER_AGENT.to_string(),
        Some(custom) => custom.to_string(),
    }
}

/// HTTP client for the `/apod` and `/apod/range` endpoints.
#[derive(Clone, Debug)]
pub struct ApodClient {
    client: Client,
    base_url: Url,
    throttle: Throttle,
}

impl ApodClient {
    /// Create a client from application settings.
    pub fn from_settings(settings: &Settings) -> Result<Self> {
        let mut client = Self::new(
            &settings.base_url,
            Duration::from_secs(settings.request_timeout),
            Some(settings.user_agent.as_str()),
        )?;
        client.throttle = Throttle::with_config(ThrottleConfig {
            base_delay: settings.request_delay(),
            ..Default::default()
        });
        Ok(client)
    }

    /// Create a client for a base URL such as `http://localhost:8080/api/v1`.
    pub fn new(base_url: &str, timeout: Duration, user_agent: Option<&str>) -> Result<Self> {
        let base_url = Url::parse(base_url)
            .map_err(|e| ApodError::transport(format!("invalid base URL '{}': {}", base_url, e)))?;
        if base_url.cannot_be_a_base() {
            return Err(ApodError::transport(format!(
                "base URL '{}' cannot carry a path",
                base_url
            )));
        }

        let client = Client::builder()
            .user_agent(resolve_user_agent(user_agent))
            .timeout(timeout)
            .gzip(true)
            .brotli(true)
            .build()
            .map_err(|e| ApodError::transport(format!("failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url,
            throttle: Throttle::new(),
        })
    }

    pub fn throttle(&self) -> &Throttle {
        &self.throttle
    }

    /// URL for the single-date endpoint.
    pub fn day_url(&self, date: Option<NaiveDate>) -> Url {
        let mut url = self.endpoint(&["apod"]);
        if let Some(date) = date {
            url.query_pairs_mut()
                .append_pair("date", &date.format(DATE_FORMAT).to_string());
        }
        url
    }

    /// URL for the range endpoint.
    pub fn range_url(&self, window: &DateWindow) -> Url {
        let mut url = self.endpoint(&["apod", "range"]);
        url.query_pairs_mut()
            .append_pair("start_date", &window.start_param())
            .append_pair("end_date", &window.end_param());
        url
    }

    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        url.set_query(None);
        // Checked in the constructor.
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    /// GET a URL, report the outcome to the throttle, and return the body.
    async fn get_bytes(&self, url: Url) -> Result<Vec<u8>> {
        self.throttle.acquire().await;

        let start = Instant::now();
        let response = self.client.get(url.clone()).send().await?;
        let status = response.status();
        self.throttle.report_status(status.as_u16()).await;

        debug!(
            "GET {} -> {} in {}ms",
            url,
            status.as_u16(),
            start.elapsed().as_millis()
        );

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ApodError::Transport {
                status: Some(status.as_u16()),
                message: body.trim().chars().take(200).collect(),
            });
        }

        Ok(response.bytes().await?.to_vec())
    }

    async fn get_json<T: DeserializeOwned>(&self, url: Url) -> Result<T> {
        let body = self.get_bytes(url).await?;
        serde_json::from_slice(&body).map_err(|e| ApodError::Decode(e.to_string()))
    }

    /// Download media bytes from an absolute URL (not relative to the backend).
    pub async fn download(&self, url: &str) -> Result<Vec<u8>> {
        let response = self.client.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(ApodError::Transport {
                status: Some(status.as_u16()),
                message: format!("download of {} failed", url),
            });
        }
        Ok(response.bytes().await?.to_vec())
    }
}

#[async_trait]
impl ApodApi for ApodClient {
    async fn fetch_day(&self, date: Option<NaiveDate>) -> Result<MediaItem> {
        let record: Option<ApodRecord> = self.get_json(self.day_url(date)).await?;
        let record = record.ok_or(ApodError::EmptyResult)?;
        MediaItem::try_from(record)
    }

    async fn fetch_range(&self, window: DateWindow) -> Result<Vec<MediaItem>> {
        let records: Option<Vec<ApodRecord>> = self.get_json(self.range_url(&window)).await?;
        records
            .unwrap_or_default()
            .into_iter()
            .map(MediaItem::try_from)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client(base: &str) -> ApodClient {
        ApodClient::new(base, Duration::from_secs(5), None).unwrap()
    }

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, DATE_FORMAT).unwrap()
    }

    #[test]
    fn test_resolve_user_agent_default() {
        assert!(resolve_user_agent(None).starts_with("apod-explorer/"));
        assert!(resolve_user_agent(Some("  ")).starts_with("apod-explorer/"));
    }

    #[test]
    fn test_resolve_user_agent_custom() {
        assert_eq!(resolve_user_agent(Some("MyBot/1.0")), "MyBot/1.0");
    }

    #[test]
    fn test_day_url_with_and_without_date() {
        let c = client("http://localhost:8080/api/v1");
        assert_eq!(
            c.day_url(Some(date("2024-06-09"))).as_str(),
            "http://localhost:8080/api/v1/apod?date=2024-06-09"
        );
        assert_eq!(c.day_url(None).as_str(), "http://localhost:8080/api/v1/apod");
    }

    #[test]
    fn test_range_url_trailing_slash_base() {
        let c = client("http://localhost:8080/api/v1/");
        let window = DateWindow::new(date("2024-06-03"), date("2024-06-09"));
        assert_eq!(
            c.range_url(&window).as_str(),
            "http://localhost:8080/api/v1/apod/range?start_date=2024-06-03&end_date=2024-06-09"
        );
    }

    #[tokio::test]
    async fn test_from_settings_uses_request_delay() {
        let settings = Settings {
            request_delay_ms: 750,
            ..Settings::default()
        };
        let c = ApodClient::from_settings(&settings).unwrap();
        assert_eq!(c.throttle().config().base_delay, Duration::from_millis(750));
        assert_eq!(
            c.throttle().stats().await.current_delay,
            Duration::from_millis(750)
        );
    }

    #[test]
    fn test_invalid_base_url() {
        let err = ApodClient::new("not a url", Duration::from_secs(1), None).unwrap_err();
        assert!(matches!(err, ApodError::Transport { .. }));
    }
}
