// The watch loop: one tick per interval, each tick scanning both feeds.
//
// Ticks never overlap: the loop awaits a tick to completion before waiting
// for the next interval, and a slow tick pushes the schedule back instead of
// queueing up extra ticks. A failed tick is classified: upstream and network
// trouble is logged and retried on the next tick from the last good cursor;
// anything else is also reported to the operator.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use tokio::time::MissedTickBehavior;
use tracing::{error, info, warn};

use crate::danbooru::traits::ModerationFeed;
use crate::discord::traits::{AlertSink, OperatorSink};
use crate::error::ErrorKind;
use crate::vandalism::alerts::Alert;
use crate::vandalism::classifier::Rules;
use crate::vandalism::cursor::Cursor;
use crate::vandalism::scanner::{scan_artist_edits, scan_tag_edits, ScanContext};
use crate::vandalism::trust::TrustLookup;

/// Scan interval in normal operation.
pub const DEFAULT_INTERVAL: Duration = Duration::from_secs(60);

/// Scan interval in test mode.
pub const TEST_MODE_INTERVAL: Duration = Duration::from_secs(10);

/// What one successful tick did.
#[derive(Debug, Default)]
pub struct TickReport {
    pub tag_alerts: Vec<Alert>,
    pub artist_alerts: Vec<Alert>,
}

impl TickReport {
    pub fn alert_count(&self) -> usize {
        self.tag_alerts.len() + self.artist_alerts.len()
    }
}

/// A failed tick and how the loop should treat it.
#[derive(Debug)]
pub struct TickError {
    pub kind: ErrorKind,
    pub source: anyhow::Error,
}

impl TickError {
    fn new(source: anyhow::Error) -> Self {
        Self {
            kind: ErrorKind::classify(&source),
            source,
        }
    }
}

impl fmt::Display for TickError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} error: {:#}", self.kind, self.source)
    }
}

impl std::error::Error for TickError {}

/// Collaborators the watcher talks to.
pub struct Services {
    pub feed: Arc<dyn ModerationFeed>,
    pub sink: Arc<dyn AlertSink>,
    pub operator: Arc<dyn OperatorSink>,
    pub trust: Arc<dyn TrustLookup>,
}

/// Knobs the watcher runs with.
#[derive(Debug, Clone)]
pub struct WatchSettings {
    pub rules: Rules,
    pub excluded_updaters: Vec<i64>,
    pub base_url: String,
    pub interval: Duration,
}

pub struct Watcher {
    services: Services,
    settings: WatchSettings,
    cursor: Cursor,
}

impl Watcher {
    /// Build a watcher at an explicit cursor position.
    pub fn new(services: Services, settings: WatchSettings, cursor: Cursor) -> Self {
        Self {
            services,
            settings,
            cursor,
        }
    }

    /// Build a watcher positioned at the current head of both feeds, so only
    /// edits made from now on are looked at.
    pub async fn start(services: Services, settings: WatchSettings) -> Result<Self> {
        let cursor = seed_cursor(services.feed.as_ref()).await?;
        info!(%cursor, "Cursors seeded from feed heads");
        Ok(Self::new(services, settings, cursor))
    }

    pub fn cursor(&self) -> Cursor {
        self.cursor
    }

    /// Scan both feeds once.
    pub async fn run_tick(&mut self) -> Result<TickReport, TickError> {
        let ctx = ScanContext {
            feed: self.services.feed.as_ref(),
            sink: self.services.sink.as_ref(),
            trust: self.services.trust.as_ref(),
            rules: &self.settings.rules,
            excluded_updaters: &self.settings.excluded_updaters,
            base_url: &self.settings.base_url,
        };

        info!("Scanning for tag vandalism...");
        let tag_alerts = scan_tag_edits(&ctx, &mut self.cursor)
            .await
            .map_err(TickError::new)?;

        info!("Scanning for artist vandalism...");
        let artist_alerts = scan_artist_edits(&ctx, &mut self.cursor)
            .await
            .map_err(TickError::new)?;

        Ok(TickReport {
            tag_alerts,
            artist_alerts,
        })
    }

    /// Run one tick and deal with its failure, if any. Returns the report on
    /// success.
    pub async fn tick_and_recover(&mut self) -> Option<TickReport> {
        match self.run_tick().await {
            Ok(report) => {
                info!(alerts = report.alert_count(), cursor = %self.cursor, "Tick done");
                Some(report)
            }
            Err(err) => {
                self.handle_tick_error(&err).await;
                None
            }
        }
    }

    async fn handle_tick_error(&self, err: &TickError) {
        if !err.kind.escalates() {
            warn!(
                error = %err,
                "Encountered an error talking to an upstream service, trying again next tick"
            );
            return;
        }

        error!(
            error = ?err.source,
            cursor = %self.cursor,
            "Unexpected error during tick, notifying operator"
        );

        let report = format!(
            "vandalwatch hit an unexpected error (cursor: {}):\n```\n{:?}\n```",
            self.cursor, err.source
        );
        if let Err(e) = self.services.operator.notify_operator(&report).await {
            error!(error = %e, "Failed to notify operator");
        }
    }

    /// Tick forever, until ctrl-c.
    pub async fn run(mut self) -> Result<()> {
        let mut interval = tokio::time::interval(self.settings.interval);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

        info!(
            interval_secs = self.settings.interval.as_secs(),
            test_mode = self.settings.rules.test_mode,
            "Watch loop started"
        );

        loop {
            tokio::select! {
                _ = interval.tick() => {}
                _ = tokio::signal::ctrl_c() => {
                    info!("Shutting down");
                    return Ok(());
                }
            }

            self.tick_and_recover().await;
        }
    }
}

/// Cursor at the newest id of each feed. An empty feed starts at zero.
pub async fn seed_cursor(feed: &dyn ModerationFeed) -> Result<Cursor> {
    let post = feed
        .latest_post_edit_id()
        .await
        .context("Failed to seed post edit cursor")?;
    let artist = feed
        .latest_artist_edit_id()
        .await
        .context("Failed to seed artist edit cursor")?;
    Ok(Cursor::new(post.unwrap_or(0), artist.unwrap_or(0)))
}
