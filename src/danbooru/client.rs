// Danbooru HTTP client: JSON over the public REST API.
//
// Read endpoints work anonymously; a login + API key raises the rate limit and
// lets the bot see edits on restricted posts. Every request goes through the
// shared `RateLimiter` and the client-wide timeout.

use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::debug;

use super::models::{ArtistEdit, PostEdit};
use super::rate_limiter::RateLimiter;
use super::traits::ModerationFeed;
use crate::error::ApiError;

/// Default Danbooru instance.
pub const DEFAULT_DANBOORU_URL: &str = "https://danbooru.donmai.us";

const SERVICE: &str = "danbooru";

/// Fields requested for post versions. Keeping the payload narrow matters when
/// a batch holds up to 1000 records.
const POST_VERSION_FIELDS: &str = "id,updated_at,added_tags,removed_tags,tags,\
     post[id,is_deleted],updater[id,name,level,level_string]";

const ARTIST_VERSION_FIELDS: &str = "id,created_at,updated_at,urls,\
     artist[id,name,created_at],updater[id,name,level,level_string]";

/// Credentials for an authenticated session.
#[derive(Debug, Clone)]
pub struct Credentials {
    pub login: String,
    pub api_key: String,
}

pub struct DanbooruClient {
    client: reqwest::Client,
    base_url: String,
    credentials: Option<Credentials>,
    rate_limiter: RateLimiter,
}

impl DanbooruClient {
    pub fn new(
        base_url: &str,
        credentials: Option<Credentials>,
        timeout: Duration,
        requests_per_second: f64,
    ) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent("vandalwatch/0.1 (danbooru vandalism alerts)")
            .timeout(timeout)
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            credentials,
            rate_limiter: RateLimiter::new(requests_per_second),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// GET `{base_url}/{endpoint}` and deserialize the JSON body.
    pub async fn get_json<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        params: &[(&str, String)],
    ) -> Result<T> {
        let url = format!("{}/{}", self.base_url, endpoint);

        self.rate_limiter.acquire().await;
        debug!(endpoint = endpoint, "Danbooru GET request");

        let mut request = self.client.get(&url).query(params);
        if let Some(creds) = &self.credentials {
            request = request.basic_auth(&creds.login, Some(&creds.api_key));
        }

        let response = request
            .send()
            .await
            .map_err(|e| ApiError::transport(SERVICE, e))
            .with_context(|| format!("Danbooru request failed: {endpoint}"))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(anyhow::Error::new(ApiError::upstream(
                SERVICE,
                status.as_u16(),
                body,
            ))
            .context(format!("Danbooru request failed: {endpoint}")));
        }

        response
            .json::<T>()
            .await
            .with_context(|| format!("Failed to deserialize {endpoint} response"))
    }

    async fn latest_id(&self, endpoint: &str) -> Result<Option<i64>> {
        let rows: Vec<IdOnly> = self
            .get_json(
                endpoint,
                &[("limit", "1".to_string()), ("only", "id".to_string())],
            )
            .await?;
        Ok(rows.first().map(|r| r.id))
    }
}

/// Query parameters shared by both "newer than the cursor" feeds.
///
/// Danbooru lists newest first, so a plain `search[id]=>N` with a limit would
/// return the newest page of a backlog and the cursor would jump over the
/// rest. `page=aN` pages forward from `N` instead: the `limit` oldest records
/// with id above `N`, which the callers then sort ascending.
pub fn newer_than_params(
    min_id: i64,
    exclude_updaters: &[i64],
    limit: u32,
    fields: &str,
) -> Vec<(&'static str, String)> {
    let mut params = vec![
        ("page", format!("a{min_id}")),
        ("limit", limit.to_string()),
        ("only", fields.to_string()),
    ];
    if !exclude_updaters.is_empty() {
        let ids: Vec<String> = exclude_updaters.iter().map(|id| id.to_string()).collect();
        params.push(("search[updater_id_not]", ids.join(",")));
    }
    params
}

#[async_trait]
impl ModerationFeed for DanbooruClient {
    async fn fetch_post_edits(
        &self,
        min_id: i64,
        exclude_updaters: &[i64],
        limit: u32,
    ) -> Result<Vec<PostEdit>> {
        let mut params = newer_than_params(min_id, exclude_updaters, limit, POST_VERSION_FIELDS);
        // Uploads show up as post versions too; they are not edits.
        params.push(("search[is_new]", "false".to_string()));

        let mut edits: Vec<PostEdit> = self
            .get_json("post_versions.json", &params)
            .await
            .context("Failed to fetch post versions")?;
        edits.sort_by_key(|e| e.id);
        Ok(edits)
    }

    async fn fetch_artist_edits(
        &self,
        min_id: i64,
        exclude_updaters: &[i64],
        limit: u32,
    ) -> Result<Vec<ArtistEdit>> {
        let params = newer_than_params(min_id, exclude_updaters, limit, ARTIST_VERSION_FIELDS);

        let mut edits: Vec<ArtistEdit> = self
            .get_json("artist_versions.json", &params)
            .await
            .context("Failed to fetch artist versions")?;
        edits.sort_by_key(|e| e.id);
        Ok(edits)
    }

    async fn fetch_artist_edits_before(
        &self,
        artist_id: i64,
        max_id: i64,
        limit: u32,
    ) -> Result<Vec<ArtistEdit>> {
        let params = [
            ("search[artist_id]", artist_id.to_string()),
            ("search[id]", format!("<{max_id}")),
            ("limit", limit.to_string()),
            ("only", ARTIST_VERSION_FIELDS.to_string()),
        ];

        let mut edits: Vec<ArtistEdit> = self
            .get_json("artist_versions.json", &params)
            .await
            .with_context(|| format!("Failed to fetch previous versions of artist #{artist_id}"))?;
        edits.sort_by_key(|e| std::cmp::Reverse(e.id));
        Ok(edits)
    }

    async fn latest_post_edit_id(&self) -> Result<Option<i64>> {
        self.latest_id("post_versions.json")
            .await
            .context("Failed to fetch latest post version")
    }

    async fn latest_artist_edit_id(&self) -> Result<Option<i64>> {
        self.latest_id("artist_versions.json")
            .await
            .context("Failed to fetch latest artist version")
    }
}

#[derive(Deserialize)]
struct IdOnly {
    id: i64,
}
