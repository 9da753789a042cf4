// Moderation feed trait: what the scanner needs from the Danbooru API.
//
// `DanbooruClient` is the real implementation. Tests drive the scanner with
// in-memory feeds, so nothing above this trait knows about HTTP.

use anyhow::Result;
use async_trait::async_trait;

use super::models::{ArtistEdit, PostEdit};

#[async_trait]
pub trait ModerationFeed: Send + Sync {
    /// Post tag edits with id strictly greater than `min_id`, not made by any
    /// of `exclude_updaters`, ascending by id. When more than `limit` are
    /// pending, these are the `limit` oldest ones, so a cursor moved to the
    /// max of the page never passes an unseen edit.
    async fn fetch_post_edits(
        &self,
        min_id: i64,
        exclude_updaters: &[i64],
        limit: u32,
    ) -> Result<Vec<PostEdit>>;

    /// Artist edits with id strictly greater than `min_id`, same filtering and
    /// ordering as `fetch_post_edits`.
    async fn fetch_artist_edits(
        &self,
        min_id: i64,
        exclude_updaters: &[i64],
        limit: u32,
    ) -> Result<Vec<ArtistEdit>>;

    /// Edits of one artist with id strictly below `max_id`, newest first.
    async fn fetch_artist_edits_before(
        &self,
        artist_id: i64,
        max_id: i64,
        limit: u32,
    ) -> Result<Vec<ArtistEdit>>;

    /// Id of the most recent post edit (cursor seed). `None` on an empty feed.
    async fn latest_post_edit_id(&self) -> Result<Option<i64>>;

    /// Id of the most recent artist edit (cursor seed).
    async fn latest_artist_edit_id(&self) -> Result<Option<i64>>;
}
