// Colored terminal output: the dry-run stand-in for Discord, and the status
// summary.

use anyhow::Result;
use async_trait::async_trait;
use colored::Colorize;

use crate::discord::embed::Embed;
use crate::discord::traits::{AlertSink, OperatorSink};
use crate::vandalism::cursor::Cursor;

/// Prints alerts instead of posting them.
pub struct TerminalSink;

#[async_trait]
impl AlertSink for TerminalSink {
    async fn send_alert(&self, embed: &Embed) -> Result<()> {
        display_embed(embed);
        Ok(())
    }

    async fn send_text(&self, text: &str) -> Result<()> {
        println!("{}", text.dimmed());
        Ok(())
    }
}

#[async_trait]
impl OperatorSink for TerminalSink {
    async fn notify_operator(&self, message: &str) -> Result<()> {
        eprintln!("{} {}", "Operator alert:".red().bold(), message);
        Ok(())
    }
}

/// Print one alert embed as a small block.
pub fn display_embed(embed: &Embed) {
    println!("\n{}", format!("=== {} ===", embed.title).red().bold());
    for field in embed.fields.iter().filter(|f| !f.is_spacer()) {
        println!("  {:<10} {}", format!("{}:", field.name).dimmed(), field.value);
    }
}

/// Print where the watcher currently stands in both feeds.
pub fn display_status(base_url: &str, head: Cursor, test_mode: bool, excluded: &[i64]) {
    println!("{}", "=== vandalwatch status ===".bold());
    println!("  Danbooru:           {base_url}");
    println!("  Latest post edit:   #{}", head.post_edits());
    println!("  Latest artist edit: #{}", head.artist_edits());
    let excluded: Vec<String> = excluded.iter().map(|id| id.to_string()).collect();
    println!("  Ignored users:      {}", excluded.join(", "));
    if test_mode {
        println!(
            "  {} every edit will be flagged",
            "Test mode:".yellow().bold()
        );
    }
}
