//! Error types for the image finder
//!
//! Provider errors never leave the adapters: they are logged and turned into
//! an empty result list. Only download failures reach the caller.

use std::path::PathBuf;

/// Failure inside a single provider request
#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    #[error("HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),
}

/// Failure of one HTTP fetch for binary content
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("HTTP {0}")]
    Status(u16),

    #[error("network error: {0}")]
    Network(String),
}

impl FetchError {
    /// True when the server asked us to slow down (HTTP 429)
    pub fn is_rate_limited(&self) -> bool {
        matches!(self, FetchError::Status(429))
    }
}

impl From<reqwest::Error> for FetchError {
    fn from(err: reqwest::Error) -> Self {
        match err.status() {
            Some(status) => FetchError::Status(status.as_u16()),
            None => FetchError::Network(err.to_string()),
        }
    }
}

/// Download failed after exhausting retries, the file could not be written,
/// or the recipe names an unsafe destination
#[derive(Debug, thiserror::Error)]
pub enum DownloadError {
    #[error("download of {url} failed after {attempts} attempts: {last}")]
    Exhausted {
        url: String,
        attempts: u32,
        last: FetchError,
    },

    #[error("failed to write {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("recipe {field} {value:?} is not a valid file name")]
    UnsafeName { field: &'static str, value: String },
}

/// Configuration file could not be read or parsed
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

/// Recipe metadata could not be recovered from a model reply
#[derive(Debug, thiserror::Error)]
pub enum RecipeError {
    #[error(transparent)]
    Json(#[from] ricettario_common::ParseError),

    #[error("recipe metadata has the wrong shape: {0}")]
    Shape(#[from] serde_json::Error),
}
