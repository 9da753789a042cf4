// Alerts: what moderators get told about.
//
// Tag edits are bundled: one alert per (kind, author) per scan, so a user
// wiping fifty posts in a minute produces one message, not fifty. Artist
// edits are rare enough to alert on one by one.

use std::collections::HashMap;
use std::fmt;

use chrono::{DateTime, Utc};

use super::classifier::TagVerdict;
use crate::danbooru::models::{Artist, ArtistEdit, PostEdit, User};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VandalismKind {
    MassTagRemoval,
    MassTagAddition,
    MassUrlRemoval,
}

impl VandalismKind {
    /// The alert kind for a tag verdict, `None` for clean edits.
    pub fn from_verdict(verdict: TagVerdict) -> Option<Self> {
        match verdict {
            TagVerdict::Clean => None,
            TagVerdict::MassTagRemoval => Some(VandalismKind::MassTagRemoval),
            TagVerdict::MassTagAddition => Some(VandalismKind::MassTagAddition),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            VandalismKind::MassTagRemoval => "Mass Tag Removal",
            VandalismKind::MassTagAddition => "Mass Tag Addition",
            VandalismKind::MassUrlRemoval => "Mass Url Removal",
        }
    }
}

impl fmt::Display for VandalismKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One detected incident, ready to be rendered and sent.
#[derive(Debug, Clone, PartialEq)]
pub struct Alert {
    pub kind: VandalismKind,
    pub author: User,
    /// Contributing edit ids, ascending.
    pub edit_ids: Vec<i64>,
    /// Latest timestamp among the contributing edits.
    pub latest_at: DateTime<Utc>,
    /// Set for artist alerts.
    pub artist: Option<Artist>,
}

/// Bundle flagged tag edits into one alert per (kind, author), in order of
/// each group's first edit.
pub fn aggregate_tag_alerts(flagged: &[(VandalismKind, &PostEdit)]) -> Vec<Alert> {
    let mut alerts: Vec<Alert> = Vec::new();
    let mut index: HashMap<(VandalismKind, i64), usize> = HashMap::new();

    for &(kind, edit) in flagged {
        match index.get(&(kind, edit.updater.id)) {
            Some(&i) => {
                let alert = &mut alerts[i];
                alert.edit_ids.push(edit.id);
                if edit.updated_at > alert.latest_at {
                    alert.latest_at = edit.updated_at;
                }
            }
            None => {
                index.insert((kind, edit.updater.id), alerts.len());
                alerts.push(Alert {
                    kind,
                    author: edit.updater.clone(),
                    edit_ids: vec![edit.id],
                    latest_at: edit.updated_at,
                    artist: None,
                });
            }
        }
    }

    for alert in &mut alerts {
        alert.edit_ids.sort_unstable();
    }
    alerts
}

/// Alert for one artist edit that wiped the artist's URLs.
pub fn artist_alert(edit: &ArtistEdit) -> Alert {
    Alert {
        kind: VandalismKind::MassUrlRemoval,
        author: edit.updater.clone(),
        edit_ids: vec![edit.id],
        latest_at: edit.updated_at,
        artist: Some(edit.artist.clone()),
    }
}
