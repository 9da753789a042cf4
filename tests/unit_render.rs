// Unit tests for alert rendering.
//
// Embed layout for tag and artist alerts, the bundle link cut-over, and the
// JSON body posted to Discord.

use chrono::{TimeZone, Utc};

use vandalwatch::danbooru::models::{Artist, User};
use vandalwatch::discord::embed::{message_payload, ALERT_COLOR};
use vandalwatch::discord::render::{bundle_link, render_alert, MAX_LINKED_EDITS};
use vandalwatch::vandalism::alerts::{Alert, VandalismKind};

const BASE: &str = "https://danbooru.donmai.us";

fn author() -> User {
    User {
        id: 123,
        name: "vandal".to_string(),
        level: 20,
        level_string: "Member".to_string(),
    }
}

fn tag_alert(edit_ids: Vec<i64>) -> Alert {
    Alert {
        kind: VandalismKind::MassTagRemoval,
        author: author(),
        edit_ids,
        latest_at: Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap(),
        artist: None,
    }
}

fn artist_alert() -> Alert {
    Alert {
        kind: VandalismKind::MassUrlRemoval,
        author: author(),
        edit_ids: vec![12],
        latest_at: Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap(),
        artist: Some(Artist {
            id: 9,
            name: "some_artist".to_string(),
            created_at: Utc.with_ymd_and_hms(2020, 1, 1, 0, 0, 0).unwrap(),
        }),
    }
}

// ============================================================
// Embed layout
// ============================================================

#[test]
fn tag_alert_layout() {
    let embed = render_alert(&tag_alert(vec![501, 503]), BASE);

    assert_eq!(embed.title, "Tag Vandalism");
    assert_eq!(embed.color, ALERT_COLOR);
    let names: Vec<&str> = embed
        .fields
        .iter()
        .filter(|f| !f.is_spacer())
        .map(|f| f.name.as_str())
        .collect();
    assert_eq!(
        names,
        vec!["Type", "Posts", "All Edits", "Username", "ID", "Role", "When"]
    );
    assert_eq!(embed.field_value("Type"), Some("Mass Tag Removal"));
    assert_eq!(
        embed.field_value("Posts"),
        Some("[2 posts](https://danbooru.donmai.us/post_versions?search[id]=501,503)")
    );
    assert_eq!(
        embed.field_value("Username"),
        Some("[vandal](https://danbooru.donmai.us/users/123)")
    );
    assert_eq!(embed.field_value("ID"), Some("#123"));
    assert_eq!(embed.field_value("Role"), Some("Member"));
    assert_eq!(embed.field_value("When"), Some("<t:1714564800:R>"));
}

#[test]
fn artist_alert_layout() {
    let embed = render_alert(&artist_alert(), BASE);

    assert_eq!(embed.title, "Artist Vandalism");
    assert_eq!(embed.field_value("Type"), Some("Mass Url Removal"));
    assert_eq!(
        embed.field_value("Artist"),
        Some("[some_artist](https://danbooru.donmai.us/artists/9)")
    );
    assert_eq!(
        embed.field_value("History"),
        Some("[Link](https://danbooru.donmai.us/artist_versions?search[artist_id]=9)")
    );
    assert!(embed.field_value("Posts").is_none());
}

#[test]
fn role_falls_back_to_level() {
    let mut alert = tag_alert(vec![1]);
    alert.author.level_string.clear();
    let embed = render_alert(&alert, BASE);
    assert_eq!(embed.field_value("Role"), Some("Level 20"));
}

// ============================================================
// Bundle link
// ============================================================

#[test]
fn single_edit_uses_singular() {
    assert!(bundle_link(&tag_alert(vec![7]), BASE).starts_with("[1 post]("));
}

#[test]
fn large_bundle_links_to_author_history() {
    let at_limit = tag_alert((1..=MAX_LINKED_EDITS as i64).collect());
    assert!(bundle_link(&at_limit, BASE).contains("search[id]="));

    let over_limit = tag_alert((1..=MAX_LINKED_EDITS as i64 + 1).collect());
    assert_eq!(
        bundle_link(&over_limit, BASE),
        "[101 posts](https://danbooru.donmai.us/post_versions?search[updater_id]=123)"
    );
}

// ============================================================
// Message body
// ============================================================

#[test]
fn alert_payload_has_no_interactive_components() {
    let embed = render_alert(&tag_alert(vec![1]), BASE);
    let payload = message_payload(None, Some(&embed));

    assert_eq!(payload["embeds"][0]["title"], "Tag Vandalism");
    assert_eq!(payload["allowed_mentions"]["parse"], serde_json::json!([]));
    // Nothing in the bot answers button clicks, so none are posted.
    assert!(payload.get("components").is_none());
    assert!(payload.get("content").is_none());
}

#[test]
fn text_payload_has_no_embeds() {
    let payload = message_payload(Some("online"), None);
    assert_eq!(payload["content"], "online");
    assert!(payload.get("embeds").is_none());
}
