//! HTTP feed client.

use async_trait::async_trait;
use reqwest::header::{ACCEPT, USER_AGENT};
use tracing::{debug, warn};

use spacewx_core::config::FeedConfig;
use spacewx_core::{Feed, RawFeedDocument};

use crate::traits::{FeedSource, FetchError};

/// Fetches SWPC JSON feeds over HTTP.
///
/// One GET per call, bounded by the configured timeout. No retries: the next
/// polling cycle is the retry.
pub struct FeedClient {
    config: FeedConfig,
    http: reqwest::Client,
}

impl FeedClient {
    pub fn new(config: FeedConfig) -> Self {
        Self {
            config,
            http: reqwest::Client::new(),
        }
    }

    pub fn config(&self) -> &FeedConfig {
        &self.config
    }

    async fn fetch_inner(&self, feed: Feed) -> Result<RawFeedDocument, FetchError> {
        let url = self.config.url(feed);
        debug!(feed = %feed, url, "fetching feed");

        let response = self
            .http
            .get(url)
            .timeout(self.config.timeout)
            .header(USER_AGENT, self.config.user_agent.as_str())
            .header(ACCEPT, "application/json")
            .send()
            .await
            .map_err(|e| classify(feed, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                feed,
                status: status.as_u16(),
            });
        }

        let body = response.bytes().await.map_err(|e| classify(feed, e))?;
        let document = RawFeedDocument::parse(feed, &body)
            .map_err(|source| FetchError::Malformed { feed, source })?;

        debug!(feed = %feed, bytes = body.len(), "feed fetched");
        Ok(document)
    }
}

fn classify(feed: Feed, e: reqwest::Error) -> FetchError {
    if e.is_timeout() {
        FetchError::Timeout { feed }
    } else {
        FetchError::Network { feed, source: e }
    }
}

#[async_trait]
impl FeedSource for FeedClient {
    async fn fetch(&self, feed: Feed) -> Result<RawFeedDocument, FetchError> {
        let result = self.fetch_inner(feed).await;
        if let Err(ref e) = result {
            warn!(feed = %feed, url = self.config.url(feed), error = %e, "feed fetch failed");
        }
        result
    }
}
