use thiserror::Error;

/// Errors raised by the storage and backend layers of the feed.
#[derive(Debug, Error)]
pub enum FeedError {
    /// The matching backend was unreachable or answered with a non-OK status.
    #[error("matching backend request to {url} failed: {detail}")]
    Backend {
        url: String,
        status: Option<u16>,
        detail: String,
    },

    #[error("invalid matching backend base url: {0}")]
    InvalidBaseUrl(String),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl FeedError {
    pub(crate) fn connect_failed(url: &str, err: impl ToString) -> Self {
        FeedError::Backend {
            url: url.to_string(),
            status: None,
            detail: err.to_string(),
        }
    }

    pub(crate) fn non_ok(url: &str, status: u16) -> Self {
        FeedError::Backend {
            url: url.to_string(),
            status: Some(status),
            detail: format!("non-OK status {}", status),
        }
    }
}

/// Why a device coordinate could not be resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum LocationError {
    #[error("location permission denied")]
    PermissionDenied,

    #[error("no location fix within the acquisition timeout")]
    SignalUnavailable,
}
