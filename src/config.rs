use std::env;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};

use crate::danbooru::client::{Credentials, DEFAULT_DANBOORU_URL};
use crate::discord::client::DEFAULT_DISCORD_API_URL;
use crate::pipeline::watch::{DEFAULT_INTERVAL, TEST_MODE_INTERVAL};

/// Where `run` writes its log files unless `VANDALWATCH_LOG_DIR` says otherwise.
pub const DEFAULT_LOG_DIR: &str = "logs";

/// Accounts whose edits are never checked: DanbooruBot and this bot itself.
pub const DEFAULT_EXCLUDED_USERS: [i64; 2] = [502584, 865894];

/// Central configuration loaded from environment variables.
///
/// Secrets come from env vars only. A `.env` file is loaded automatically at
/// startup via dotenvy.
#[derive(Debug, Clone)]
pub struct Config {
    /// Bot token used for the Discord REST API.
    pub discord_token: String,
    /// Channel that receives vandalism alerts (0 when unset).
    pub channel_id: u64,
    /// Discord user who gets crash reports.
    pub operator_id: Option<u64>,
    pub discord_api_url: String,
    pub danbooru_url: String,
    /// Optional Danbooru login + API key; anonymous access when absent.
    pub danbooru_credentials: Option<Credentials>,
    /// Flag every edit and scan faster, for exercising the alert path.
    pub test_mode: bool,
    /// Updater ids never looked at.
    pub excluded_users: Vec<i64>,
    pub interval: Duration,
    /// Timeout applied to every outbound HTTP request.
    pub http_timeout: Duration,
    /// Danbooru requests per second.
    pub danbooru_rate: f64,
    /// Skip tag edits by builders and above instead of only logging them.
    pub trusted_skip_tag_edits: bool,
    /// Directory for `run` log files; `None` when set to an empty value.
    pub log_dir: Option<PathBuf>,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// Nothing is required here: `require_discord` checks what `run` needs,
    /// so `status` and dry runs work without Discord credentials.
    pub fn load() -> Result<Self> {
        let test_mode = parse_flag(env::var("VANDALWATCH_TEST_MODE").ok().as_deref());

        let interval = match env::var("VANDALWATCH_INTERVAL_SECS") {
            Ok(secs) => Duration::from_secs(
                secs.trim()
                    .parse()
                    .context("VANDALWATCH_INTERVAL_SECS must be a whole number of seconds")?,
            ),
            Err(_) if test_mode => TEST_MODE_INTERVAL,
            Err(_) => DEFAULT_INTERVAL,
        };

        let http_timeout = Duration::from_secs(
            env::var("VANDALWATCH_HTTP_TIMEOUT_SECS")
                .ok()
                .map(|s| s.trim().parse())
                .transpose()
                .context("VANDALWATCH_HTTP_TIMEOUT_SECS must be a whole number of seconds")?
                .unwrap_or(30),
        );

        let danbooru_rate = match env::var("DANBOORU_REQUESTS_PER_SECOND") {
            Ok(rate) => parse_rate(&rate).context("DANBOORU_REQUESTS_PER_SECOND")?,
            Err(_) => 5.0,
        };

        let excluded_users = match env::var("VANDALWATCH_EXCLUDED_USERS") {
            Ok(list) => parse_id_list(&list).context("VANDALWATCH_EXCLUDED_USERS")?,
            Err(_) => DEFAULT_EXCLUDED_USERS.to_vec(),
        };

        let danbooru_credentials = match (env::var("DANBOORU_LOGIN"), env::var("DANBOORU_API_KEY")) {
            (Ok(login), Ok(api_key)) if !login.is_empty() && !api_key.is_empty() => {
                Some(Credentials { login, api_key })
            }
            _ => None,
        };

        Ok(Self {
            discord_token: env::var("DISCORD_BOT_TOKEN").unwrap_or_default(),
            channel_id: parse_optional_id("DISCORD_CHANNEL_ID")?.unwrap_or(0),
            operator_id: parse_optional_id("VANDALWATCH_OPERATOR_ID")?,
            discord_api_url: env::var("DISCORD_API_URL")
                .unwrap_or_else(|_| DEFAULT_DISCORD_API_URL.to_string()),
            danbooru_url: env::var("DANBOORU_URL")
                .unwrap_or_else(|_| DEFAULT_DANBOORU_URL.to_string())
                .trim_end_matches('/')
                .to_string(),
            danbooru_credentials,
            test_mode,
            excluded_users,
            interval,
            http_timeout,
            danbooru_rate,
            trusted_skip_tag_edits: parse_flag(
                env::var("VANDALWATCH_TRUST_BYPASS_TAG_EDITS").ok().as_deref(),
            ),
            log_dir: parse_log_dir(env::var("VANDALWATCH_LOG_DIR").ok().as_deref()),
        })
    }

    /// Check that Discord is configured. Call this before posting anything.
    pub fn require_discord(&self) -> Result<()> {
        if self.discord_token.is_empty() {
            anyhow::bail!(
                "DISCORD_BOT_TOKEN not set. Add it to your .env file.\n\
                 Use --dry-run to print alerts to the terminal instead."
            );
        }
        if self.channel_id == 0 {
            anyhow::bail!("DISCORD_CHANNEL_ID not set. Add it to your .env file.");
        }
        Ok(())
    }
}

/// "1", "true", "yes", "on" (any case) are true; anything else is false.
pub fn parse_flag(value: Option<&str>) -> bool {
    matches!(
        value.map(|v| v.trim().to_ascii_lowercase()).as_deref(),
        Some("1" | "true" | "yes" | "on")
    )
}

/// Unset means the default directory; set but blank turns file logging off.
pub fn parse_log_dir(value: Option<&str>) -> Option<PathBuf> {
    match value.map(str::trim) {
        None => Some(PathBuf::from(DEFAULT_LOG_DIR)),
        Some("") => None,
        Some(dir) => Some(PathBuf::from(dir)),
    }
}

/// Requests per second: 0 turns pacing off, otherwise 0.1 to 100.
pub fn parse_rate(value: &str) -> Result<f64> {
    let rate: f64 = value
        .trim()
        .parse()
        .with_context(|| format!("'{}' is not a number", value.trim()))?;
    if rate == 0.0 || (0.1..=100.0).contains(&rate) {
        Ok(rate)
    } else {
        anyhow::bail!("{rate} is out of range (0 to disable, or 0.1 to 100)")
    }
}

/// Comma-separated ids, blanks ignored.
pub fn parse_id_list(list: &str) -> Result<Vec<i64>> {
    list.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| s.parse().with_context(|| format!("'{s}' is not a user id")))
        .collect()
}

fn parse_optional_id(var: &str) -> Result<Option<u64>> {
    match env::var(var) {
        Ok(value) if !value.trim().is_empty() => value
            .trim()
            .parse()
            .map(Some)
            .with_context(|| format!("{var} must be a numeric Discord id")),
        _ => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_flag() {
        assert!(parse_flag(Some("1")));
        assert!(parse_flag(Some(" TRUE ")));
        assert!(parse_flag(Some("on")));
        assert!(!parse_flag(Some("0")));
        assert!(!parse_flag(Some("")));
        assert!(!parse_flag(None));
    }

    #[test]
    fn test_parse_log_dir() {
        assert_eq!(parse_log_dir(None), Some(PathBuf::from("logs")));
        assert_eq!(parse_log_dir(Some("  ")), None);
        assert_eq!(
            parse_log_dir(Some("/var/log/vandalwatch")),
            Some(PathBuf::from("/var/log/vandalwatch"))
        );
    }

    #[test]
    fn test_parse_rate_bounds() {
        assert_eq!(parse_rate("5").unwrap(), 5.0);
        assert_eq!(parse_rate(" 0 ").unwrap(), 0.0);
        assert_eq!(parse_rate("0.1").unwrap(), 0.1);
        assert_eq!(parse_rate("100").unwrap(), 100.0);
        assert!(parse_rate("1e-20").is_err());
        assert!(parse_rate("-1").is_err());
        assert!(parse_rate("NaN").is_err());
        assert!(parse_rate("inf").is_err());
        assert!(parse_rate("fast").is_err());
    }

    #[test]
    fn test_parse_id_list() {
        assert_eq!(parse_id_list("502584, 865894").unwrap(), vec![502584, 865894]);
        assert_eq!(parse_id_list(" 1,,2 ,").unwrap(), vec![1, 2]);
        assert!(parse_id_list("").unwrap().is_empty());
        assert!(parse_id_list("12,abc").is_err());
    }
}
