//! Adaptive request throttle for the APOD backend.
//!
//! The backend enforces a global request budget and answers 429 when it is
//! exceeded. The throttle backs off on 429/503, eases off on other server
//! errors, and gradually recovers after a run of successes.

use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::Mutex;
use tracing::{debug, info, warn};

/// Configuration for throttling behavior.
#[derive(Debug, Clone)]
pub struct ThrottleConfig {
    /// Delay between requests when not backing off.
    pub base_delay: Duration,
    /// Ceiling for backoff.
    pub max_delay: Duration,
    /// Multiplier applied on 429/503.
    pub backoff_multiplier: f64,
    /// Multiplier applied on other 5xx responses.
    pub server_error_multiplier: f64,
    /// Multiplier for recovery on success (< 1.0 to decrease delay).
    pub recovery_multiplier: f64,
    /// Number of consecutive successes before reducing delay.
    pub recovery_threshold: u32,
}

impl Default for ThrottleConfig {
    fn default() -> Self {
        Self {
            base_delay: Duration::ZERO,
            max_delay: Duration::from_secs(60),
            backoff_multiplier: 2.0,
            server_error_multiplier: 1.5,
            recovery_multiplier: 0.8,
            recovery_threshold: 5,
        }
    }
}

/// Backoff grows from at least this much, so a zero base delay still backs off.
const MIN_BACKOFF: Duration = Duration::from_millis(250);

#[derive(Debug)]
struct ThrottleState {
    current_delay: Duration,
    last_request: Option<Instant>,
    consecutive_successes: u32,
    in_backoff: bool,
    total_requests: u64,
    rate_limit_hits: u64,
}

impl ThrottleState {
    fn new(base_delay: Duration) -> Self {
        Self {
            current_delay: base_delay,
            last_request: None,
            consecutive_successes: 0,
            in_backoff: false,
            total_requests: 0,
            rate_limit_hits: 0,
        }
    }

    fn time_until_ready(&self) -> Duration {
        match self.last_request {
            Some(last) => self.current_delay.saturating_sub(last.elapsed()),
            None => Duration::ZERO,
        }
    }

    fn grow(&mut self, multiplier: f64, max: Duration) {
        let from = self.current_delay.max(MIN_BACKOFF);
        let next = Duration::from_secs_f64(from.as_secs_f64() * multiplier);
        self.current_delay = next.min(max);
    }
}

/// Snapshot of throttle state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ThrottleStats {
    pub current_delay: Duration,
    pub in_backoff: bool,
    pub total_requests: u64,
    pub rate_limit_hits: u64,
}

/// Shared, cloneable throttle. Clones observe the same state.
#[derive(Debug, Clone)]
pub struct Throttle {
    config: ThrottleConfig,
    state: Arc<Mutex<ThrottleState>>,
}

impl Throttle {
    pub fn new() -> Self {
        Self::with_config(ThrottleConfig::default())
    }

    pub fn with_config(config: ThrottleConfig) -> Self {
        let state = ThrottleState::new(config.base_delay);
        Self {
            config,
            state: Arc::new(Mutex::new(state)),
        }
    }

    pub fn config(&self) -> &ThrottleConfig {
        &self.config
    }

    /// Wait until the backend may be contacted again, then record the request.
    pub async fn acquire(&self) {
        let wait = self.state.lock().await.time_until_ready();
        if wait > Duration::ZERO {
            debug!("Throttling request: waiting {:?}", wait);
            tokio::time::sleep(wait).await;
        }

        let mut state = self.state.lock().await;
        state.last_request = Some(Instant::now());
        state.total_requests += 1;
    }

    /// Feed a response status back into the throttle.
    pub async fn report_status(&self, status: u16) {
        match status {
            429 | 503 => self.report_rate_limit(status).await,
            500..=599 => self.report_server_error().await,
            200..=399 => self.report_success().await,
            _ => {}
        }
    }

    async fn report_success(&self) {
        let mut state = self.state.lock().await;
        state.consecutive_successes += 1;

        if state.in_backoff && state.consecutive_successes >= self.config.recovery_threshold {
            let reduced = Duration::from_secs_f64(
                state.current_delay.as_secs_f64() * self.config.recovery_multiplier,
            );
            state.consecutive_successes = 0;

            if reduced <= self.config.base_delay.max(MIN_BACKOFF) {
                state.in_backoff = false;
                state.current_delay = self.config.base_delay;
                info!("Backend recovered from rate limit backoff");
            } else {
                state.current_delay = reduced;
                debug!("Backoff reduced to {:?}", state.current_delay);
            }
        }
    }

    async fn report_rate_limit(&self, status: u16) {
        let mut state = self.state.lock().await;
        state.rate_limit_hits += 1;
        state.consecutive_successes = 0;
        state.in_backoff = true;
        state.grow(self.config.backoff_multiplier, self.config.max_delay);

        warn!(
            "Rate limited by backend (HTTP {}), backing off to {:?}",
            status, state.current_delay
        );
    }

    async fn report_server_error(&self) {
        let mut state = self.state.lock().await;
        state.consecutive_successes = 0;
        state.in_backoff = true;
        state.grow(self.config.server_error_multiplier, self.config.max_delay);
        debug!("Server error, delay increased to {:?}", state.current_delay);
    }

    pub async fn stats(&self) -> ThrottleStats {
        let state = self.state.lock().await;
        ThrottleStats {
            current_delay: state.current_delay,
            in_backoff: state.in_backoff,
            total_requests: state.total_requests,
            rate_limit_hits: state.rate_limit_hits,
        }
    }
}

impl Default for Throttle {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_acquire_counts_requests() {
        let throttle = Throttle::new();
        throttle.acquire().await;
        throttle.acquire().await;
        assert_eq!(throttle.stats().await.total_requests, 2);
    }

    #[tokio::test]
    async fn test_backoff_on_rate_limit() {
        let throttle = Throttle::with_config(ThrottleConfig {
            base_delay: Duration::from_millis(100),
            ..Default::default()
        });

        throttle.report_status(429).await;

        let stats = throttle.stats().await;
        assert!(stats.in_backoff);
        assert_eq!(stats.rate_limit_hits, 1);
        assert!(stats.current_delay >= Duration::from_millis(500));
    }

    #[tokio::test]
    async fn test_backoff_is_capped() {
        let throttle = Throttle::with_config(ThrottleConfig {
            max_delay: Duration::from_secs(1),
            ..Default::default()
        });

        for _ in 0..10 {
            throttle.report_status(503).await;
        }
        assert_eq!(throttle.stats().await.current_delay, Duration::from_secs(1));
    }

    #[tokio::test]
    async fn test_recovers_after_successes() {
        let throttle = Throttle::with_config(ThrottleConfig {
            recovery_threshold: 2,
            recovery_multiplier: 0.1,
            ..Default::default()
        });

        throttle.report_status(429).await;
        assert!(throttle.stats().await.in_backoff);

        throttle.report_status(200).await;
        throttle.report_status(200).await;

        let stats = throttle.stats().await;
        assert!(!stats.in_backoff);
        assert_eq!(stats.current_delay, Duration::ZERO);
    }

    #[tokio::test]
    async fn test_client_errors_leave_delay_unchanged() {
        let throttle = Throttle::new();
        throttle.report_status(404).await;
        let stats = throttle.stats().await;
        assert!(!stats.in_backoff);
        assert_eq!(stats.current_delay, Duration::ZERO);
    }
}
