use std::sync::Arc;

use anyhow::Result;
use clap::{Parser, Subcommand};
use colored::Colorize;
use tracing::{info, warn};

use vandalwatch::config::Config;
use vandalwatch::danbooru::client::DanbooruClient;
use vandalwatch::discord::client::DiscordClient;
use vandalwatch::discord::traits::{AlertSink, OperatorSink};
use vandalwatch::logging;
use vandalwatch::output::terminal::{self, TerminalSink};
use vandalwatch::pipeline::watch::{seed_cursor, Services, WatchSettings, Watcher};
use vandalwatch::vandalism::classifier::Rules;
use vandalwatch::vandalism::cursor::Cursor;
use vandalwatch::vandalism::trust::ReportedLevel;

/// vandalwatch: watches Danbooru for vandalism and alerts moderators on Discord.
#[derive(Parser)]
#[command(name = "vandalwatch", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Watch the edit feeds until interrupted
    Run {
        /// Print alerts to the terminal instead of posting them to Discord
        #[arg(long)]
        dry_run: bool,
    },

    /// Run a single scan, starting a little behind the feed heads
    Once {
        /// Scan this many ids back from the head of each feed (default: 100)
        #[arg(long, default_value = "100")]
        lookback: i64,

        /// Start the post edit scan after this id instead
        #[arg(long)]
        post_cursor: Option<i64>,

        /// Start the artist edit scan after this id instead
        #[arg(long)]
        artist_cursor: Option<i64>,

        /// Print alerts to the terminal instead of posting them to Discord
        #[arg(long)]
        dry_run: bool,
    },

    /// Show configuration and the current feed heads
    Status,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (silently ignore if missing)
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();
    let config = Config::load()?;

    // Only the long-running watcher keeps log files.
    let log_dir = match cli.command {
        Commands::Run { .. } => config.log_dir.as_deref(),
        _ => None,
    };
    if let Some(path) = logging::init(log_dir)? {
        info!(path = %path.display(), "Logging to file");
    }

    match cli.command {
        Commands::Run { dry_run } => {
            let (services, announcer) = build_services(&config, dry_run)?;
            let watcher = Watcher::start(services, watch_settings(&config)).await?;

            info!(
                channel_id = config.channel_id,
                danbooru = config.danbooru_url.as_str(),
                test_mode = config.test_mode,
                "vandalwatch started"
            );
            if let Err(e) = announcer.send_text("vandalwatch is ready and online.").await {
                warn!(error = %e, "Failed to announce startup");
            }

            watcher.run().await?;
        }

        Commands::Once {
            lookback,
            post_cursor,
            artist_cursor,
            dry_run,
        } => {
            let (services, _) = build_services(&config, dry_run)?;
            let head = seed_cursor(services.feed.as_ref()).await?;
            let start = Cursor::new(
                post_cursor.unwrap_or((head.post_edits() - lookback).max(0)),
                artist_cursor.unwrap_or((head.artist_edits() - lookback).max(0)),
            );
            println!("Scanning {start}...");

            let mut watcher = Watcher::new(services, watch_settings(&config), start);
            match watcher.run_tick().await {
                Ok(report) => {
                    println!(
                        "\n{} {} tag alerts, {} artist alerts. Now at {}.",
                        "Scan complete:".bold(),
                        report.tag_alerts.len(),
                        report.artist_alerts.len(),
                        watcher.cursor(),
                    );
                }
                Err(e) => {
                    anyhow::bail!("Scan failed ({} error): {:#}", e.kind, e.source);
                }
            }
        }

        Commands::Status => {
            let feed = danbooru_client(&config)?;
            let head = seed_cursor(&feed).await?;
            terminal::display_status(
                &config.danbooru_url,
                head,
                config.test_mode,
                &config.excluded_users,
            );
        }
    }

    Ok(())
}

fn danbooru_client(config: &Config) -> Result<DanbooruClient> {
    DanbooruClient::new(
        &config.danbooru_url,
        config.danbooru_credentials.clone(),
        config.http_timeout,
        config.danbooru_rate,
    )
}

/// Wire up the real feed plus either Discord or the terminal as the output.
/// Also returns the sink used for the startup announcement.
fn build_services(config: &Config, dry_run: bool) -> Result<(Services, Arc<dyn AlertSink>)> {
    let feed = Arc::new(danbooru_client(config)?);

    let sink: Arc<dyn AlertSink>;
    let operator: Arc<dyn OperatorSink>;
    if dry_run {
        sink = Arc::new(TerminalSink);
        operator = Arc::new(TerminalSink);
    } else {
        config.require_discord()?;
        let discord = Arc::new(DiscordClient::new(
            &config.discord_api_url,
            &config.discord_token,
            config.channel_id,
            config.operator_id,
            config.http_timeout,
        )?);
        sink = discord.clone();
        operator = discord;
    }

    let services = Services {
        feed,
        sink: sink.clone(),
        operator,
        trust: Arc::new(ReportedLevel),
    };
    Ok((services, sink))
}

fn watch_settings(config: &Config) -> WatchSettings {
    WatchSettings {
        rules: Rules {
            test_mode: config.test_mode,
            trusted_skip_tag_edits: config.trusted_skip_tag_edits,
        },
        excluded_updaters: config.excluded_users.clone(),
        base_url: config.danbooru_url.clone(),
        interval: config.interval,
    }
}
