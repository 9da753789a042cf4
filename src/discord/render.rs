// Alert rendering: turns an `Alert` into the embed moderators see.

use crate::danbooru::models::User;
use crate::vandalism::alerts::Alert;

use super::embed::{Embed, ALERT_COLOR};

/// Bundles larger than this link to the author's whole edit history instead,
/// to keep the URL within sane lengths.
pub const MAX_LINKED_EDITS: usize = 100;

/// Render an alert against the Danbooru instance at `base_url`.
pub fn render_alert(alert: &Alert, base_url: &str) -> Embed {
    let embed = match &alert.artist {
        Some(artist) => Embed::new("Artist Vandalism", ALERT_COLOR)
            .field("Type", alert.kind.as_str(), true)
            .field(
                "Artist",
                format!("[{}]({})", artist.name, artist.url(base_url)),
                true,
            )
            .field(
                "History",
                format!("[Link]({})", artist.versions_url(base_url)),
                true,
            ),
        None => Embed::new("Tag Vandalism", ALERT_COLOR)
            .field("Type", alert.kind.as_str(), true)
            .spacer()
            .field("Posts", bundle_link(alert, base_url), true)
            .field(
                "All Edits",
                format!("[Link]({})", all_edits_url(&alert.author, base_url)),
                true,
            )
            .spacer(),
    };

    let user = &alert.author;
    embed
        .field(
            "Username",
            format!("[{}]({})", user.name, user.url(base_url)),
            true,
        )
        .field("ID", format!("#{}", user.id), true)
        .field("Role", role_label(user), true)
        .field(
            "When",
            format!("<t:{}:R>", alert.latest_at.timestamp()),
            false,
        )
}

/// Every post edit by `user`.
pub fn all_edits_url(user: &User, base_url: &str) -> String {
    format!("{base_url}/post_versions?search[updater_id]={}", user.id)
}

/// "[N posts](...)" pointing at exactly the bundled edits when that is short
/// enough, otherwise at everything the author did.
pub fn bundle_link(alert: &Alert, base_url: &str) -> String {
    let count = alert.edit_ids.len();
    let url = if count > MAX_LINKED_EDITS {
        all_edits_url(&alert.author, base_url)
    } else {
        let ids: Vec<String> = alert.edit_ids.iter().map(|id| id.to_string()).collect();
        format!("{base_url}/post_versions?search[id]={}", ids.join(","))
    };
    let noun = if count == 1 { "post" } else { "posts" };
    format!("[{count} {noun}]({url})")
}

fn role_label(user: &User) -> String {
    if user.level_string.is_empty() {
        format!("Level {}", user.level)
    } else {
        user.level_string.clone()
    }
}
