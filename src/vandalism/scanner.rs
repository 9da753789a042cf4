// Feed scanner: one pass over each edit feed per tick.
//
// Tag edits: classify the whole batch, send one alert per (kind, author),
// then move the cursor to the batch max. If sending fails part way, the batch
// is scanned again next tick; some alerts may repeat, no edit is skipped.
//
// Artist edits: strictly in id order, alert immediately, and move the cursor
// after every record, so a failure mid-batch resumes right after the last
// record that went through.

use anyhow::{Context, Result};
use tracing::info;

use super::alerts::{aggregate_tag_alerts, artist_alert, Alert, VandalismKind};
use super::classifier::{classify_artist_edit, classify_tag_edit, Rules};
use super::cursor::Cursor;
use super::trust::TrustLookup;
use crate::danbooru::traits::ModerationFeed;
use crate::discord::render::render_alert;
use crate::discord::traits::AlertSink;

/// Maximum records fetched per feed per tick.
pub const PAGE_SIZE: u32 = 1000;

/// Everything a scan needs besides the cursor.
pub struct ScanContext<'a> {
    pub feed: &'a dyn ModerationFeed,
    pub sink: &'a dyn AlertSink,
    pub trust: &'a dyn TrustLookup,
    pub rules: &'a Rules,
    /// Bot and system accounts whose edits are never looked at.
    pub excluded_updaters: &'a [i64],
    /// Danbooru base URL used for links in rendered alerts.
    pub base_url: &'a str,
}

/// Scan post tag edits newer than the cursor. Returns the alerts sent.
pub async fn scan_tag_edits(ctx: &ScanContext<'_>, cursor: &mut Cursor) -> Result<Vec<Alert>> {
    let mut edits = ctx
        .feed
        .fetch_post_edits(cursor.post_edits(), ctx.excluded_updaters, PAGE_SIZE)
        .await?;
    edits.sort_by_key(|e| e.id);

    let Some(max_id) = edits.iter().map(|e| e.id).max() else {
        info!("No new post edits found");
        return Ok(Vec::new());
    };

    let mut flagged = Vec::new();
    for edit in &edits {
        let trust_level = ctx
            .trust
            .trust_level(&edit.updater)
            .await
            .with_context(|| format!("Failed to look up trust for user #{}", edit.updater.id))?;

        let verdict = classify_tag_edit(edit, trust_level, ctx.rules);
        if let Some(kind) = VandalismKind::from_verdict(verdict) {
            info!(
                url = %edit.url(ctx.base_url),
                user_id = edit.updater.id,
                kind = kind.as_str(),
                "Post edit detected as vandalism"
            );
            flagged.push((kind, edit));
        }
    }

    let alerts = aggregate_tag_alerts(&flagged);
    for alert in &alerts {
        info!(
            user = alert.author.name.as_str(),
            edits = alert.edit_ids.len(),
            kind = alert.kind.as_str(),
            "Sending tag vandalism alert"
        );
        ctx.sink
            .send_alert(&render_alert(alert, ctx.base_url))
            .await?;
    }

    cursor.advance_post_edits(max_id);
    info!(
        scanned = edits.len(),
        flagged = flagged.len(),
        alerts = alerts.len(),
        cursor = cursor.post_edits(),
        "Post edit scan complete"
    );

    Ok(alerts)
}

/// Scan artist edits newer than the cursor. Returns the alerts sent.
pub async fn scan_artist_edits(ctx: &ScanContext<'_>, cursor: &mut Cursor) -> Result<Vec<Alert>> {
    let mut edits = ctx
        .feed
        .fetch_artist_edits(cursor.artist_edits(), ctx.excluded_updaters, PAGE_SIZE)
        .await?;

    if edits.is_empty() {
        info!("No new artist edits found");
        return Ok(Vec::new());
    }

    // A record's verdict depends on the one before it.
    edits.sort_by_key(|e| e.id);

    let mut alerts = Vec::new();
    for edit in &edits {
        let trust_level = ctx
            .trust
            .trust_level(&edit.updater)
            .await
            .with_context(|| format!("Failed to look up trust for user #{}", edit.updater.id))?;

        let is_vandalism = classify_artist_edit(edit, trust_level, ctx.feed, ctx.rules)
            .await
            .with_context(|| format!("Failed to classify artist version #{}", edit.id))?;

        if is_vandalism {
            info!(
                edit_id = edit.id,
                artist = %edit.artist.url(ctx.base_url),
                user_id = edit.updater.id,
                "Artist edit detected as vandalism, sending"
            );
            let alert = artist_alert(edit);
            ctx.sink
                .send_alert(&render_alert(&alert, ctx.base_url))
                .await?;
            alerts.push(alert);
        }

        cursor.advance_artist_edits(edit.id);
    }

    info!(
        scanned = edits.len(),
        alerts = alerts.len(),
        cursor = cursor.artist_edits(),
        "Artist edit scan complete"
    );

    Ok(alerts)
}
