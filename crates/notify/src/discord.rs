//! Discord REST API notifier.
//!
//! Posts the notification body into one text channel. The channel is found
//! by walking the bot's guilds in order: inside a guild the channel named
//! like the preferred name wins, otherwise the first text channel by
//! position. The first guild that yields a channel is used.
//!
//! The resolved channel is cached and dropped again after any delivery
//! failure so the next send resolves afresh.

use serde::Deserialize;
use tokio::sync::Mutex;

use crate::traits::{Notification, Notifier, NotifyError};

pub const DEFAULT_API_BASE: &str = "https://discord.com/api/v10";

/// Discord channel type for guild text channels.
const GUILD_TEXT: u8 = 0;

#[derive(Debug, Clone, Deserialize)]
pub struct GuildInfo {
    pub id: String,
    #[serde(default)]
    pub name: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChannelInfo {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(rename = "type")]
    pub kind: u8,
    #[serde(default)]
    pub position: i64,
}

/// Channel a notification will be posted to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedChannel {
    pub id: String,
    pub name: String,
    pub guild: String,
}

/// Choose the destination among one guild's channels.
///
/// Only text channels qualify. An exact name match wins; otherwise the text
/// channel with the lowest position (earliest listed on ties).
pub fn pick_text_channel<'a>(channels: &'a [ChannelInfo], preferred: &str) -> Option<&'a ChannelInfo> {
    let text = move || channels.iter().filter(|c| c.kind == GUILD_TEXT);
    text()
        .find(|c| c.name == preferred)
        .or_else(|| text().min_by_key(|c| c.position))
}

/// Sends notifications as a Discord bot.
#[derive(Debug)]
pub struct DiscordNotifier {
    token: String,
    api_base: String,
    channel_name: String,
    client: reqwest::Client,
    resolved: Mutex<Option<ResolvedChannel>>,
}

impl DiscordNotifier {
    /// Returns [`NotifyError::Config`] if the token is blank.
    pub fn new(token: impl Into<String>, api_base: impl Into<String>, channel_name: impl Into<String>) -> Result<Self, NotifyError> {
        let token = token.into().trim().to_string();
        if token.is_empty() {
            return Err(NotifyError::Config("Discord bot token must not be empty".to_string()));
        }
        Ok(Self {
            token,
            api_base: api_base.into().trim_end_matches('/').to_string(),
            channel_name: channel_name.into(),
            client: reqwest::Client::new(),
            resolved: Mutex::new(None),
        })
    }

    /// The currently cached destination, if one has been resolved.
    pub async fn cached_channel(&self) -> Option<ResolvedChannel> {
        self.resolved.lock().await.clone()
    }

    /// Resolve (or reuse) the destination channel.
    pub async fn channel(&self) -> Result<ResolvedChannel, NotifyError> {
        let mut cached = self.resolved.lock().await;
        if let Some(channel) = cached.as_ref() {
            return Ok(channel.clone());
        }
        let channel = self.resolve().await?;
        *cached = Some(channel.clone());
        Ok(channel)
    }

    async fn resolve(&self) -> Result<ResolvedChannel, NotifyError> {
        let guilds: Vec<GuildInfo> = self.get_json("/users/@me/guilds").await?;
        tracing::debug!(guilds = guilds.len(), "Connected guilds listed");

        let mut last_error = None;
        for guild in &guilds {
            let channels: Vec<ChannelInfo> = match self.get_json(&format!("/guilds/{}/channels", guild.id)).await {
                Ok(channels) => channels,
                Err(e) => {
                    tracing::warn!(guild = %guild.name, error = %e, "Could not list guild channels, trying next guild");
                    last_error = Some(e);
                    continue;
                }
            };
            if let Some(channel) = pick_text_channel(&channels, &self.channel_name) {
                if channel.name != self.channel_name {
                    tracing::info!(
                        guild = %guild.name,
                        channel = %channel.name,
                        "'{}' not found, defaulting to first text channel",
                        self.channel_name
                    );
                }
                return Ok(ResolvedChannel {
                    id: channel.id.clone(),
                    name: channel.name.clone(),
                    guild: guild.name.clone(),
                });
            }
        }

        let mut reason = format!("no text channel in any of {} guild(s)", guilds.len());
        if let Some(e) = last_error {
            reason.push_str(&format!(" (last error: {e})"));
        }
        Err(NotifyError::NoDestination(reason))
    }

    async fn get_json<T: serde::de::DeserializeOwned>(&self, path: &str) -> Result<T, NotifyError> {
        let response = self
            .client
            .get(format!("{}{}", self.api_base, path))
            .header(reqwest::header::AUTHORIZATION, self.auth())
            .send()
            .await?;
        let response = check(response).await?;
        Ok(response.json().await?)
    }

    async fn post_message(&self, channel: &ResolvedChannel, content: &str) -> Result<(), NotifyError> {
        let response = self
            .client
            .post(format!("{}/channels/{}/messages", self.api_base, channel.id))
            .header(reqwest::header::AUTHORIZATION, self.auth())
            .json(&serde_json::json!({ "content": content }))
            .send()
            .await?;
        check(response).await?;
        Ok(())
    }

    fn auth(&self) -> String {
        format!("Bot {}", self.token)
    }
}

/// Map non-success responses to errors. HTTP 429 is not retried.
async fn check(response: reqwest::Response) -> Result<reqwest::Response, NotifyError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
        let retry_after = serde_json::from_str::<serde_json::Value>(&body)
            .ok()
            .and_then(|v| v.get("retry_after").and_then(|r| r.as_f64()))
            .map(|secs| secs.ceil() as u64)
            .unwrap_or(1);
        return Err(NotifyError::RateLimited {
            retry_after_secs: retry_after,
        });
    }

    Err(NotifyError::Api {
        status: status.as_u16(),
        body,
    })
}

#[async_trait::async_trait]
impl Notifier for DiscordNotifier {
    async fn send(&self, notification: &Notification) -> Result<(), NotifyError> {
        let channel = self.channel().await?;

        tracing::debug!(
            channel = %channel.name,
            guild = %channel.guild,
            subject = %notification.subject,
            "Sending Discord notification"
        );

        match self.post_message(&channel, &notification.body).await {
            Ok(()) => {
                tracing::info!(channel = %channel.name, subject = %notification.subject, "Discord notification sent");
                Ok(())
            }
            Err(e) => {
                *self.resolved.lock().await = None;
                Err(e)
            }
        }
    }

    fn channel_name(&self) -> &str {
        "discord"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn channel(id: &str, name: &str, kind: u8, position: i64) -> ChannelInfo {
        ChannelInfo {
            id: id.to_string(),
            name: name.to_string(),
            kind,
            position,
        }
    }

    #[test]
    fn prefers_named_channel() {
        let channels = vec![
            channel("1", "announcements", 0, 0),
            channel("2", "general", 0, 3),
            channel("3", "general", 2, 1),
        ];
        assert_eq!(pick_text_channel(&channels, "general").unwrap().id, "2");
    }

    #[test]
    fn falls_back_to_lowest_position_text_channel() {
        let channels = vec![
            channel("1", "Text Channels", 4, 0),
            channel("2", "random", 0, 5),
            channel("3", "voice", 2, 0),
            channel("4", "welcome", 0, 1),
        ];
        assert_eq!(pick_text_channel(&channels, "general").unwrap().id, "4");
    }

    #[test]
    fn name_match_is_exact() {
        let channels = vec![channel("1", "General", 0, 0), channel("2", "general-chat", 0, 1)];
        assert_eq!(pick_text_channel(&channels, "general").unwrap().id, "1");
    }

    #[test]
    fn no_text_channels() {
        let channels = vec![channel("1", "general", 2, 0)];
        assert!(pick_text_channel(&channels, "general").is_none());
        assert!(pick_text_channel(&[], "general").is_none());
    }

    #[test]
    fn empty_token_rejected() {
        let err = DiscordNotifier::new("  ", DEFAULT_API_BASE, "general").unwrap_err();
        assert!(err.to_string().contains("must not be empty"));
    }

    #[test]
    fn api_base_trailing_slash_trimmed() {
        let notifier = DiscordNotifier::new("abc", "http://localhost:1234/", "general").unwrap();
        assert_eq!(notifier.api_base, "http://localhost:1234");
        assert_eq!(notifier.auth(), "Bot abc");
        assert_eq!(notifier.channel_name(), "discord");
    }
}
