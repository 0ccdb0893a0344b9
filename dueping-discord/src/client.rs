//! Discord REST delivery: look the channel up, then post the digest into it.

use async_trait::async_trait;
use serde::Deserialize;

use dueping_core::{Digest, DueError, DueResult, NotificationSink};

use crate::payload::{MAX_EMBED_FIELDS, MessagePayload, messages_for};

pub const DEFAULT_API_BASE: &str = "https://discord.com/api/v10";

#[derive(Debug, Clone)]
pub struct DiscordConfig {
    pub bot_token: String,
    pub channel_id: String,
    pub api_base: String,
}

impl DiscordConfig {
    pub fn new(bot_token: impl Into<String>, channel_id: impl Into<String>) -> Self {
        Self {
            bot_token: bot_token.into(),
            channel_id: channel_id.into(),
            api_base: DEFAULT_API_BASE.to_string(),
        }
    }

    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into();
        self
    }

    fn channel_url(&self) -> String {
        format!(
            "{}/channels/{}",
            self.api_base.trim_end_matches('/'),
            self.channel_id
        )
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChannelInfo {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
}

pub struct DiscordClient {
    config: DiscordConfig,
    client: reqwest::Client,
}

impl DiscordClient {
    pub fn new(config: DiscordConfig) -> Self {
        Self {
            config,
            client: reqwest::Client::new(),
        }
    }

    fn auth(&self) -> String {
        format!("Bot {}", self.config.bot_token)
    }

    /// `GET /channels/{id}`; fails if the bot cannot see the channel.
    pub async fn fetch_channel(&self) -> DueResult<ChannelInfo> {
        let resp = self
            .client
            .get(self.config.channel_url())
            .header("Authorization", self.auth())
            .send()
            .await
            .map_err(|e| DueError::Delivery(format!("discord channel lookup: {e}")))?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(DueError::Delivery(format!(
                "discord channel {} lookup returned {status}: {body}",
                self.config.channel_id
            )));
        }

        resp.json()
            .await
            .map_err(|e| DueError::Delivery(format!("parse discord channel: {e}")))
    }

    pub async fn send_message(&self, payload: &MessagePayload) -> DueResult<()> {
        let url = format!("{}/messages", self.config.channel_url());
        let resp = self
            .client
            .post(&url)
            .header("Authorization", self.auth())
            .json(payload)
            .send()
            .await
            .map_err(|e| DueError::Delivery(format!("discord send: {e}")))?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            return Err(DueError::Delivery(format!(
                "discord send failed ({status}): {body}"
            )));
        }
        Ok(())
    }
}

/// The ping is its own message and goes out before the embeds, so a failed
/// embed send leaves the ping in the channel.
#[async_trait]
impl NotificationSink for DiscordClient {
    async fn deliver(&self, digest: &Digest) -> DueResult<()> {
        let channel = self.fetch_channel().await?;
        tracing::info!(
            channel_id = %channel.id,
            channel = channel.name.as_deref().unwrap_or("?"),
            "posting digest"
        );

        for msg in messages_for(digest) {
            for embed in msg.embeds.iter().filter(|e| e.over_field_limit()) {
                tracing::warn!(
                    section = %embed.title,
                    fields = embed.fields.len(),
                    limit = MAX_EMBED_FIELDS,
                    "section exceeds discord's embed field limit; the send will be rejected"
                );
            }
            self.send_message(&msg).await?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn channel_url_joins_base() {
        let cfg = DiscordConfig::new("t", "869951873749254228").with_api_base("http://x/api/v10/");
        assert_eq!(cfg.channel_url(), "http://x/api/v10/channels/869951873749254228");
    }
}
