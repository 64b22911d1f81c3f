//! Error types shared across the crate.

use chrono::NaiveDate;
use thiserror::Error;

/// Errors raised while talking to the APOD backend or validating input.
#[derive(Debug, Error)]
pub enum ApodError {
    /// Network failure or a non-success HTTP status.
    #[error("transport failure{}: {message}", status_suffix(.status))]
    Transport {
        status: Option<u16>,
        message: String,
    },

    /// The response body could not be decoded into media records.
    #[error("failed to decode response: {0}")]
    Decode(String),

    /// Well-formed response without a usable item.
    #[error("backend returned no usable item")]
    EmptyResult,

    /// A picked date lies outside the selectable range.
    #[error("date {date} is outside the selectable range {min}..={max}")]
    OutOfRange {
        date: NaiveDate,
        min: NaiveDate,
        max: NaiveDate,
    },

    /// Input that is not a `YYYY-MM-DD` date.
    #[error("invalid date '{0}', expected YYYY-MM-DD")]
    InvalidDate(String),
}

impl ApodError {
    pub fn transport(message: impl Into<String>) -> Self {
        ApodError::Transport {
            status: None,
            message: message.into(),
        }
    }

    /// HTTP status attached to a transport failure, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            ApodError::Transport { status, .. } => *status,
            _ => None,
        }
    }
}

impl From<reqwest::Error> for ApodError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            return ApodError::Decode(err.to_string());
        }
        ApodError::Transport {
            status: err.status().map(|s| s.as_u16()),
            message: err.to_string(),
        }
    }
}

fn status_suffix(status: &Option<u16>) -> String {
    status.map(|s| format!(" (HTTP {})", s)).unwrap_or_default()
}

pub type Result<T> = std::result::Result<T, ApodError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transport_display_includes_status() {
        let err = ApodError::Transport {
            status: Some(429),
            message: "too many requests".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "transport failure (HTTP 429): too many requests"
        );
        assert_eq!(err.status(), Some(429));
    }

    #[test]
    fn test_transport_display_without_status() {
        let err = ApodError::transport("connection refused");
        assert_eq!(err.to_string(), "transport failure: connection refused");
        assert_eq!(err.status(), None);
    }
}
