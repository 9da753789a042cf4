// Danbooru API payloads: the slices of post versions, artist versions and
// users that the vandalism rules look at.
//
// Field names follow the JSON the API returns, so these deserialize directly
// from `post_versions.json` / `artist_versions.json` responses requested with
// the `only=` parameter in `client.rs`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Danbooru user level at which an account counts as a builder.
/// Anything strictly above `TRUSTED_LEVEL` is considered trusted.
pub const TRUSTED_LEVEL: i32 = 30;

/// The account that made an edit, as embedded by the API.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub name: String,
    pub level: i32,
    /// Human-readable role ("Member", "Builder", ...).
    #[serde(default)]
    pub level_string: String,
}

impl User {
    pub fn url(&self, base_url: &str) -> String {
        format!("{base_url}/users/{}", self.id)
    }
}

/// The post a tag edit was made against.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PostRef {
    pub id: i64,
    #[serde(default)]
    pub is_deleted: bool,
}

/// One tag edit of a post (`post_versions.json`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostEdit {
    pub id: i64,
    pub updater: User,
    pub updated_at: DateTime<Utc>,
    #[serde(default)]
    pub added_tags: Vec<String>,
    #[serde(default)]
    pub removed_tags: Vec<String>,
    /// Space-separated tag string after the edit.
    #[serde(default)]
    pub tags: String,
    /// Missing when the post itself was purged; treated as not deleted.
    #[serde(default)]
    pub post: Option<PostRef>,
}

impl PostEdit {
    pub fn is_post_deleted(&self) -> bool {
        self.post.as_ref().is_some_and(|p| p.is_deleted)
    }

    /// Number of tags the post had once this edit was applied.
    pub fn tag_count_after_edit(&self) -> usize {
        self.tags.split_whitespace().count()
    }

    pub fn url(&self, base_url: &str) -> String {
        format!("{base_url}/post_versions?search[id]={}", self.id)
    }
}

/// The artist an artist edit belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Artist {
    pub id: i64,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

impl Artist {
    pub fn url(&self, base_url: &str) -> String {
        format!("{base_url}/artists/{}", self.id)
    }

    /// History page listing every version of this artist.
    pub fn versions_url(&self, base_url: &str) -> String {
        format!("{base_url}/artist_versions?search[artist_id]={}", self.id)
    }
}

/// One edit of an artist entry (`artist_versions.json`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArtistEdit {
    pub id: i64,
    pub updater: User,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default)]
    pub urls: Vec<String>,
    pub artist: Artist,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tag_count_ignores_extra_whitespace() {
        let edit = PostEdit {
            id: 1,
            updater: User {
                id: 2,
                name: "someone".to_string(),
                level: 20,
                level_string: "Member".to_string(),
            },
            updated_at: Utc::now(),
            added_tags: vec![],
            removed_tags: vec![],
            tags: "  1girl  solo\tlong_hair ".to_string(),
            post: None,
        };
        assert_eq!(edit.tag_count_after_edit(), 3);
        assert!(!edit.is_post_deleted());
    }

    #[test]
    fn test_empty_tag_string_counts_zero() {
        let json = r#"{
            "id": 9,
            "updater": {"id": 1, "name": "a", "level": 20},
            "updated_at": "2024-05-01T12:00:00.000-04:00"
        }"#;
        let edit: PostEdit = serde_json::from_str(json).unwrap();
        assert_eq!(edit.tag_count_after_edit(), 0);
        assert!(edit.updater.level_string.is_empty());
    }
}
