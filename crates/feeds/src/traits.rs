use async_trait::async_trait;
use thiserror::Error;

use spacewx_core::{Feed, RawFeedDocument};

/// Why a feed could not be turned into a document this cycle.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("{feed}: request timed out")]
    Timeout { feed: Feed },

    #[error("{feed}: request failed: {source}")]
    Network {
        feed: Feed,
        #[source]
        source: reqwest::Error,
    },

    #[error("{feed}: server returned HTTP {status}")]
    Status { feed: Feed, status: u16 },

    #[error("{feed}: malformed body: {source}")]
    Malformed {
        feed: Feed,
        #[source]
        source: serde_json::Error,
    },
}

impl FetchError {
    pub fn feed(&self) -> Feed {
        match self {
            FetchError::Timeout { feed }
            | FetchError::Network { feed, .. }
            | FetchError::Status { feed, .. }
            | FetchError::Malformed { feed, .. } => *feed,
        }
    }
}

/// Anything that can produce feed documents (the HTTP client, or canned data in tests).
#[async_trait]
pub trait FeedSource: Send + Sync {
    /// Fetch one feed. Failures are returned, never panicked.
    async fn fetch(&self, feed: Feed) -> Result<RawFeedDocument, FetchError>;
}
