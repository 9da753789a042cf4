// Discord REST client: posts alerts to the moderation channel and DMs the
// operator when the watcher hits an unexpected error.
//
// No gateway connection: sending messages only needs the bot token and the
// channel id. Button clicks are delivered through interactions, which this
// client does not listen for.

use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::Deserialize;
use tracing::{debug, warn};

use super::embed::{message_payload, Embed};
use super::traits::{AlertSink, OperatorSink};
use crate::error::ApiError;
use crate::output::truncate_chars;

/// Default Discord REST API base.
pub const DEFAULT_DISCORD_API_URL: &str = "https://discord.com/api/v10";

/// Discord rejects message content longer than this.
const MAX_CONTENT_CHARS: usize = 2000;

const SERVICE: &str = "discord";

pub struct DiscordClient {
    client: reqwest::Client,
    api_url: String,
    token: String,
    channel_id: u64,
    operator_id: Option<u64>,
}

impl DiscordClient {
    pub fn new(
        api_url: &str,
        token: &str,
        channel_id: u64,
        operator_id: Option<u64>,
        timeout: Duration,
    ) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent("DiscordBot (https://github.com/vandalwatch, 0.1)")
            .timeout(timeout)
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            client,
            api_url: api_url.trim_end_matches('/').to_string(),
            token: token.to_string(),
            channel_id,
            operator_id,
        })
    }

    /// POST a JSON body to `{api_url}/{path}`, failing on non-success statuses.
    async fn post_json(&self, path: &str, body: &serde_json::Value) -> Result<reqwest::Response> {
        let url = format!("{}/{}", self.api_url, path);
        debug!(path = path, "Discord POST request");

        let response = self
            .client
            .post(&url)
            .header("Authorization", format!("Bot {}", self.token))
            .json(body)
            .send()
            .await
            .map_err(|e| ApiError::transport(SERVICE, e))
            .with_context(|| format!("Discord request failed: {path}"))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(anyhow::Error::new(ApiError::upstream(
                SERVICE,
                status.as_u16(),
                body,
            ))
            .context(format!("Discord request failed: {path}")));
        }

        Ok(response)
    }

    async fn send_to_channel(&self, channel_id: u64, body: &serde_json::Value) -> Result<()> {
        self.post_json(&format!("channels/{channel_id}/messages"), body)
            .await?;
        Ok(())
    }

    /// Open (or reuse) the DM channel with `user_id`.
    async fn dm_channel(&self, user_id: u64) -> Result<u64> {
        let response = self
            .post_json(
                "users/@me/channels",
                &serde_json::json!({ "recipient_id": user_id.to_string() }),
            )
            .await
            .context("Failed to open DM channel")?;

        let channel: ChannelResponse = response
            .json()
            .await
            .context("Failed to parse DM channel response")?;
        channel
            .id
            .parse()
            .with_context(|| format!("Discord returned a non-numeric channel id: {}", channel.id))
    }
}

#[async_trait]
impl AlertSink for DiscordClient {
    async fn send_alert(&self, embed: &Embed) -> Result<()> {
        self.send_to_channel(self.channel_id, &message_payload(None, Some(embed)))
            .await
            .context("Failed to send alert")
    }

    async fn send_text(&self, text: &str) -> Result<()> {
        let text = truncate_chars(text, MAX_CONTENT_CHARS);
        self.send_to_channel(self.channel_id, &message_payload(Some(&text), None))
            .await
            .context("Failed to send message")
    }
}

#[async_trait]
impl OperatorSink for DiscordClient {
    async fn notify_operator(&self, message: &str) -> Result<()> {
        let Some(operator_id) = self.operator_id else {
            warn!("No operator configured, crash report not delivered");
            return Ok(());
        };

        let channel_id = self.dm_channel(operator_id).await?;
        let text = truncate_chars(message, MAX_CONTENT_CHARS);
        self.send_to_channel(channel_id, &message_payload(Some(&text), None))
            .await
            .context("Failed to message the operator")
    }
}

#[derive(Deserialize)]
struct ChannelResponse {
    id: String,
}
