//! Notifier trait definition and shared error types.

/// Errors that can occur during notification delivery.
#[derive(Debug, thiserror::Error)]
pub enum NotifyError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API returned {status}: {body}")]
    Api { status: u16, body: String },

    #[error("No destination channel: {0}")]
    NoDestination(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Rate limited: retry after {retry_after_secs}s")]
    RateLimited { retry_after_secs: u64 },
}

/// A rendered notification ready for delivery.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct Notification {
    /// Short title, used for logging and by channels that show one.
    pub subject: String,
    /// The full message text.
    pub body: String,
}

impl Notification {
    pub fn new(subject: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            subject: subject.into(),
            body: body.into(),
        }
    }
}

/// Trait for notification channel implementations.
#[async_trait::async_trait]
pub trait Notifier: Send + Sync {
    /// Deliver a notification through this channel.
    async fn send(&self, notification: &Notification) -> Result<(), NotifyError>;

    /// Send a clearly marked test alert through the full delivery path.
    async fn test(&self) -> Result<(), NotifyError> {
        self.send(&test_notification()).await
    }

    /// Human-readable name for this channel (e.g., "discord", "log").
    fn channel_name(&self) -> &str;
}

/// The message sent by [`Notifier::test`].
pub fn test_notification() -> Notification {
    Notification::new(
        "test",
        "⚠️ **TEST: SEVERE SPACE WEATHER ALERT** ⚠️\n\
         This is a test of the SpaceWeather Bot alert system.\n\
         Planetary K-index has reached **8.0** (TEST).\n\
         Systems may be affected. Auroras likely visible at lower latitudes.",
    )
}
