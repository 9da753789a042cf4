// Scan position in the two edit feeds.
//
// Seeded from the feed heads at startup so history from before the bot came
// online is never replayed. Only ever moves forwards.

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Cursor {
    last_seen_post_edit_id: i64,
    last_seen_artist_edit_id: i64,
}

impl Cursor {
    pub fn new(last_seen_post_edit_id: i64, last_seen_artist_edit_id: i64) -> Self {
        Self {
            last_seen_post_edit_id,
            last_seen_artist_edit_id,
        }
    }

    pub fn post_edits(&self) -> i64 {
        self.last_seen_post_edit_id
    }

    pub fn artist_edits(&self) -> i64 {
        self.last_seen_artist_edit_id
    }

    /// Move the post-edit cursor to `id` if that is further along.
    pub fn advance_post_edits(&mut self, id: i64) {
        self.last_seen_post_edit_id = self.last_seen_post_edit_id.max(id);
    }

    /// Move the artist-edit cursor to `id` if that is further along.
    pub fn advance_artist_edits(&mut self, id: i64) {
        self.last_seen_artist_edit_id = self.last_seen_artist_edit_id.max(id);
    }
}

impl fmt::Display for Cursor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "post edits > {}, artist edits > {}",
            self.last_seen_post_edit_id, self.last_seen_artist_edit_id
        )
    }
}
