// Vandalism rules for single edits.
//
// Tag edits are judged on the edit alone. Artist edits need one lookback: the
// previous version of the same artist, to see whether the URL list was just
// wiped. Both are deterministic given their inputs.

use anyhow::Result;
use chrono::Duration;
use tracing::trace;

use super::trust::is_trusted;
use crate::danbooru::models::{ArtistEdit, PostEdit};
use crate::danbooru::traits::ModerationFeed;

/// Removing at least this many tags always counts, whatever is left.
pub const ALWAYS_FLAG_REMOVED: usize = 20;

/// Adding at least this many tags in one edit is tag spam.
pub const MASS_ADDITION_THRESHOLD: usize = 200;

/// (minimum removed, maximum remaining) pairs that flag a tag edit. Small posts
/// tolerate fewer removals before the edit looks like a wipe.
const REMOVAL_BANDS: [(usize, usize); 2] = [(5, 5), (10, 10)];

/// Artist edits this soon after the artist was created are the wiki being
/// filled in, not vandalism.
pub fn artist_grace_period() -> Duration {
    Duration::hours(1)
}

/// Switches that change how the rules behave.
#[derive(Debug, Clone, Default)]
pub struct Rules {
    /// Flag every edit, to exercise the alert path without real vandalism.
    pub test_mode: bool,
    /// Skip tag edits made by trusted editors. Off by default: trusted tag
    /// edits are only noted in the trace log.
    pub trusted_skip_tag_edits: bool,
}

/// Outcome of classifying one tag edit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TagVerdict {
    Clean,
    MassTagRemoval,
    MassTagAddition,
}

impl TagVerdict {
    pub fn is_flagged(self) -> bool {
        self != TagVerdict::Clean
    }
}

/// Judge a single tag edit. `trust_level` is the updater's level.
pub fn classify_tag_edit(edit: &PostEdit, trust_level: i32, rules: &Rules) -> TagVerdict {
    if rules.test_mode {
        return TagVerdict::MassTagRemoval;
    }

    if edit.is_post_deleted() {
        trace!(edit_id = edit.id, "Post was deleted, ignoring");
        return TagVerdict::Clean;
    }

    if is_trusted(trust_level) {
        trace!(edit_id = edit.id, trust_level, "Edit made by a builder or above");
        if rules.trusted_skip_tag_edits {
            return TagVerdict::Clean;
        }
    }

    let removed = edit.removed_tags.len();
    let remaining = edit.tag_count_after_edit();

    if is_mass_removal(removed, remaining) {
        trace!(edit_id = edit.id, removed, remaining, "Found mass tag removal");
        return TagVerdict::MassTagRemoval;
    }

    if edit.added_tags.len() >= MASS_ADDITION_THRESHOLD {
        trace!(
            edit_id = edit.id,
            added = edit.added_tags.len(),
            "Found mass tag addition"
        );
        return TagVerdict::MassTagAddition;
    }

    trace!(edit_id = edit.id, removed, remaining, "No vandalism here");
    TagVerdict::Clean
}

/// The removal half of the tag rule, on bare counts.
pub fn is_mass_removal(removed: usize, remaining: usize) -> bool {
    removed >= ALWAYS_FLAG_REMOVED
        || REMOVAL_BANDS
            .iter()
            .any(|&(min_removed, max_remaining)| removed >= min_removed && remaining <= max_remaining)
}

/// Judge a single artist edit, fetching its predecessor when the cheaper
/// checks don't already settle it.
pub async fn classify_artist_edit(
    edit: &ArtistEdit,
    trust_level: i32,
    feed: &dyn ModerationFeed,
    rules: &Rules,
) -> Result<bool> {
    if rules.test_mode {
        return Ok(true);
    }

    if edit.updated_at - edit.artist.created_at < artist_grace_period() {
        trace!(edit_id = edit.id, "Artist was just created, skipping");
        return Ok(false);
    }

    if is_trusted(trust_level) {
        trace!(edit_id = edit.id, trust_level, "Edit made by a builder or above, skipping");
        return Ok(false);
    }

    let previous = feed
        .fetch_artist_edits_before(edit.artist.id, edit.id, 1)
        .await?;

    let Some(previous) = previous.first() else {
        trace!(edit_id = edit.id, "First version of this artist, skipping");
        return Ok(false);
    };

    Ok(is_url_wipe(edit, previous))
}

/// All URLs gone in `current` where `previous` still had some.
pub fn is_url_wipe(current: &ArtistEdit, previous: &ArtistEdit) -> bool {
    current.urls.is_empty() && !previous.urls.is_empty()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_removal_bands() {
        assert!(is_mass_removal(5, 5));
        assert!(!is_mass_removal(5, 6));
        assert!(is_mass_removal(10, 10));
        assert!(!is_mass_removal(10, 11));
        assert!(!is_mass_removal(19, 11));
        assert!(is_mass_removal(20, 500));
    }

    #[test]
    fn test_four_removed_never_flags() {
        for remaining in 0..50 {
            assert!(!is_mass_removal(4, remaining));
        }
    }

    #[test]
    fn test_verdict_flagged() {
        assert!(!TagVerdict::Clean.is_flagged());
        assert!(TagVerdict::MassTagRemoval.is_flagged());
        assert!(TagVerdict::MassTagAddition.is_flagged());
    }
}
