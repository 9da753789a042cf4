// Trust lookup: how senior an editor is.
//
// The rules only ever ask "is this account builder or above?", so the seam is
// a single integer per user. Danbooru already embeds the updater's level in
// every version record; `ReportedLevel` just reads it back.

use anyhow::Result;
use async_trait::async_trait;

use crate::danbooru::models::{User, TRUSTED_LEVEL};

#[async_trait]
pub trait TrustLookup: Send + Sync {
    /// Trust level of `user`; compared against `TRUSTED_LEVEL`.
    async fn trust_level(&self, user: &User) -> Result<i32>;
}

/// Uses the level the feed reported alongside the edit.
pub struct ReportedLevel;

#[async_trait]
impl TrustLookup for ReportedLevel {
    async fn trust_level(&self, user: &User) -> Result<i32> {
        Ok(user.level)
    }
}

/// Builder or above.
pub fn is_trusted(level: i32) -> bool {
    level > TRUSTED_LEVEL
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trust_boundary() {
        assert!(!is_trusted(30));
        assert!(is_trusted(31));
        assert!(is_trusted(50));
        assert!(!is_trusted(0));
    }

    #[tokio::test]
    async fn test_reported_level_reads_user() {
        let user = User {
            id: 1,
            name: "builder".to_string(),
            level: 32,
            level_string: "Builder".to_string(),
        };
        assert_eq!(ReportedLevel.trust_level(&user).await.unwrap(), 32);
    }
}
