//! Fetch error types

/// Errors produced by filter data sources and the requests issued against them.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FetchError {
    /// The data source reported a failure.
    #[error("source error: {0}")]
    Source(String),

    /// The request was cancelled before it completed.
    #[error("request cancelled")]
    Cancelled,

    /// A newer request for the same axis finished first; this response was discarded.
    #[error("stale response for request {token} (current {current})")]
    Stale {
        /// Token of the discarded request.
        token: u64,
        /// Token of the request that superseded it.
        current: u64,
    },
}

impl FetchError {
    /// Creates a source error.
    pub fn source(message: impl Into<String>) -> Self {
        Self::Source(message.into())
    }

    /// Returns `true` if the request was cancelled or superseded.
    ///
    /// Callers typically ignore these; only [`FetchError::Source`] is worth surfacing.
    pub fn is_superseded(&self) -> bool {
        matches!(self, Self::Cancelled | Self::Stale { .. })
    }
}
