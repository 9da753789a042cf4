// Output seams: where alerts and crash reports go.
//
// `DiscordClient` implements both against the Discord REST API;
// `output::terminal::TerminalSink` prints instead, for dry runs.

use anyhow::Result;
use async_trait::async_trait;

use super::embed::Embed;

#[async_trait]
pub trait AlertSink: Send + Sync {
    /// Post one rendered alert to the moderation channel.
    async fn send_alert(&self, embed: &Embed) -> Result<()>;

    /// Post a plain status line to the moderation channel.
    async fn send_text(&self, text: &str) -> Result<()>;
}

#[async_trait]
pub trait OperatorSink: Send + Sync {
    /// Tell the operator something went wrong. Best effort.
    async fn notify_operator(&self, message: &str) -> Result<()>;
}
