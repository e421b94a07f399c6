//! Configuration management for sporlstats.
//!
//! Values come from environment variables, optionally seeded by a `.env` file
//! in the local data directory:
//! 1. Environment variables (highest priority)
//! 2. `.env` file in the local data directory
//! 3. Application defaults (where applicable)
//!
//! Everything a pipeline run needs is collected into [`Settings`] once, so the
//! library never reads the environment behind the caller's back.

use std::{env, path::PathBuf, str::FromStr, time::Duration};

use crate::error::PipelineError;

pub const DEFAULT_API_URL: &str = "https://api.spotify.com/v1";
pub const DEFAULT_TOKEN_URL: &str = "https://accounts.spotify.com/api/token";
pub const DEFAULT_MAX_CONCURRENCY: usize = 16;
pub const DEFAULT_RETRY_PADDING_SECS: u64 = 2;
pub const DEFAULT_MAX_RETRY_AFTER_SECS: u64 = 120;

/// Loads environment variables from `sporlstats/.env` in the local data
/// directory.
///
/// - Linux: `~/.local/share/sporlstats/.env`
/// - macOS: `~/Library/Application Support/sporlstats/.env`
/// - Windows: `%LOCALAPPDATA%/sporlstats/.env`
///
/// The directory is created if needed. A missing `.env` file is fine since
/// every value may also come from the process environment; a file that
/// exists but cannot be parsed is an error.
pub async fn load_env() -> Result<(), PipelineError> {
    let path = data_dir().join(".env");
    if let Some(parent) = path.parent() {
        async_fs::create_dir_all(parent).await?;
    }

    if path.is_file() {
        dotenv::from_path(&path).map_err(|e| {
            PipelineError::Config(format!("cannot load {}: {}", path.display(), e))
        })?;
    }
    Ok(())
}

/// Root of everything sporlstats keeps on disk.
pub fn data_dir() -> PathBuf {
    let mut path = dirs::data_local_dir().unwrap_or_else(|| PathBuf::from("."));
    path.push("sporlstats");
    path
}

pub fn spotify_client_id() -> Result<String, PipelineError> {
    required("SPOTIFY_API_AUTH_CLIENT_ID")
}

pub fn spotify_client_secret() -> Result<String, PipelineError> {
    required("SPOTIFY_API_AUTH_CLIENT_SECRET")
}

pub fn spotify_apiurl() -> String {
    optional("SPOTIFY_API_URL")
        .map(|url| url.trim_end_matches('/').to_string())
        .unwrap_or_else(|| DEFAULT_API_URL.to_string())
}

pub fn spotify_apitoken_url() -> String {
    optional("SPOTIFY_API_TOKEN_URL").unwrap_or_else(|| DEFAULT_TOKEN_URL.to_string())
}

pub fn output_dir() -> PathBuf {
    optional("SPORLSTATS_OUTPUT_DIR")
        .map(PathBuf::from)
        .unwrap_or_else(|| data_dir().join("output"))
}

pub fn max_concurrency() -> Result<usize, PipelineError> {
    let value = parsed("SPORLSTATS_MAX_CONCURRENCY", DEFAULT_MAX_CONCURRENCY)?;
    if value == 0 {
        return Err(PipelineError::Config(
            "SPORLSTATS_MAX_CONCURRENCY must be at least 1".to_string(),
        ));
    }
    Ok(value)
}

pub fn retry_padding() -> Result<Duration, PipelineError> {
    parsed("SPORLSTATS_RETRY_PADDING_SECS", DEFAULT_RETRY_PADDING_SECS).map(Duration::from_secs)
}

/// Longest `Retry-After` the retry pass is willing to honour.
pub fn max_retry_after() -> Result<Duration, PipelineError> {
    parsed("SPORLSTATS_MAX_RETRY_AFTER_SECS", DEFAULT_MAX_RETRY_AFTER_SECS).map(Duration::from_secs)
}

pub fn backoff_policy() -> Result<BackoffPolicy, PipelineError> {
    parsed("SPORLSTATS_BACKOFF_POLICY", BackoffPolicy::default())
}

/// How the retry delay is derived when several failures were rate limited.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum BackoffPolicy {
    /// The first 429 encountered decides the delay.
    #[default]
    First,
    /// The largest `Retry-After` among all 429s decides the delay.
    Max,
}

impl FromStr for BackoffPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "first" => Ok(BackoffPolicy::First),
            "max" => Ok(BackoffPolicy::Max),
            other => Err(format!(
                "invalid value '{other}'. Allowed values: first, max"
            )),
        }
    }
}

/// Everything a pipeline run needs besides the category.
#[derive(Debug, Clone)]
pub struct Settings {
    pub client_id: String,
    pub client_secret: String,
    pub api_url: String,
    pub token_url: String,
    pub output_dir: PathBuf,
    pub max_concurrency: usize,
    pub retry_padding: Duration,
    pub max_retry_after: Duration,
    pub backoff_policy: BackoffPolicy,
}

impl Settings {
    /// Reads all settings from the environment. Call [`load_env`] first to
    /// pick up the `.env` file.
    pub fn from_env() -> Result<Self, PipelineError> {
        Ok(Self {
            client_id: spotify_client_id()?,
            client_secret: spotify_client_secret()?,
            api_url: spotify_apiurl(),
            token_url: spotify_apitoken_url(),
            output_dir: output_dir(),
            max_concurrency: max_concurrency()?,
            retry_padding: retry_padding()?,
            max_retry_after: max_retry_after()?,
            backoff_policy: backoff_policy()?,
        })
    }

    /// Builds settings for explicit endpoints with default tuning.
    ///
    /// Used when the endpoints do not come from the environment, e.g. a
    /// local stand-in for the Spotify API. A trailing `/` on `api_url` is
    /// dropped so paths can be appended with `format!`.
    ///
    /// # Arguments
    ///
    /// * `client_id` / `client_secret` - Application credentials for the token exchange
    /// * `api_url` - Web API base, e.g. `https://api.spotify.com/v1`
    /// * `token_url` - Token endpoint, e.g. `https://accounts.spotify.com/api/token`
    ///
    /// # Example
    ///
    /// ```ignore
    /// let settings = Settings::new("id", "secret", DEFAULT_API_URL, DEFAULT_TOKEN_URL);
    /// assert_eq!(settings.max_concurrency, DEFAULT_MAX_CONCURRENCY);
    /// ```
    pub fn new(client_id: &str, client_secret: &str, api_url: &str, token_url: &str) -> Self {
        Self {
            client_id: client_id.to_string(),
            client_secret: client_secret.to_string(),
            api_url: api_url.trim_end_matches('/').to_string(),
            token_url: token_url.to_string(),
            output_dir: data_dir().join("output"),
            max_concurrency: DEFAULT_MAX_CONCURRENCY,
            retry_padding: Duration::from_secs(DEFAULT_RETRY_PADDING_SECS),
            max_retry_after: Duration::from_secs(DEFAULT_MAX_RETRY_AFTER_SECS),
            backoff_policy: BackoffPolicy::default(),
        }
    }
}

fn required(key: &str) -> Result<String, PipelineError> {
    optional(key).ok_or_else(|| PipelineError::Config(format!("{key} must be set")))
}

// empty values count as unset
fn optional(key: &str) -> Option<String> {
    env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn parsed<T>(key: &str, default: T) -> Result<T, PipelineError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match optional(key) {
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .map_err(|e| PipelineError::Config(format!("{key}: {e}"))),
        None => Ok(default),
    }
}
