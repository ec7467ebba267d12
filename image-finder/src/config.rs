//! Configuration loading for the image finder
//!
//! Configuration is loaded from:
//! 1. An explicit path (`--config`)
//! 2. Environment variable RICETTARIO_IMAGES_CONFIG
//! 3. <config dir>/ricettario/images.toml
//! 4. Default values
//!
//! Provider credentials always come from the environment
//! (PEXELS_API_KEY, UNSPLASH_ACCESS_KEY, PIXABAY_API_KEY) and override
//! anything set in the file.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::ConfigError;

pub const PEXELS_KEY_VAR: &str = "PEXELS_API_KEY";
pub const UNSPLASH_KEY_VAR: &str = "UNSPLASH_ACCESS_KEY";
pub const PIXABAY_KEY_VAR: &str = "PIXABAY_API_KEY";

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Cascade configuration
    #[serde(default)]
    pub search: SearchConfig,
    /// Provider endpoints and credentials
    #[serde(default)]
    pub providers: ProvidersConfig,
    /// Download retry configuration
    #[serde(default)]
    pub download: DownloadConfig,
    /// Batch driver configuration
    #[serde(default)]
    pub batch: BatchConfig,
}

/// Cascade thresholds and pacing
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchConfig {
    /// Results requested per provider query
    #[serde(default = "default_limit")]
    pub limit: usize,
    /// Score at which a provider stops trying further queries
    #[serde(default = "default_strong_match")]
    pub strong_match: i32,
    /// Score at which the cascade stops trying further providers
    #[serde(default = "default_acceptable")]
    pub acceptable: i32,
    /// Pause between provider queries, in milliseconds
    #[serde(default = "default_query_delay_ms")]
    pub query_delay_ms: u64,
}

/// Provider configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProvidersConfig {
    #[serde(default)]
    pub pexels_api_key: Option<String>,
    #[serde(default)]
    pub unsplash_access_key: Option<String>,
    #[serde(default)]
    pub pixabay_api_key: Option<String>,
    #[serde(default = "default_pexels_url")]
    pub pexels_url: String,
    #[serde(default = "default_unsplash_url")]
    pub unsplash_url: String,
    #[serde(default = "default_pixabay_url")]
    pub pixabay_url: String,
    #[serde(default = "default_wikimedia_url")]
    pub wikimedia_url: String,
    /// User agent sent to keyless endpoints and image hosts
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
    /// Request timeout in seconds
    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: u64,
}

/// Download retry configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DownloadConfig {
    #[serde(default = "default_attempts")]
    pub attempts: u32,
    /// Base wait after HTTP 429, multiplied by the attempt number
    #[serde(default = "default_rate_limit_backoff_ms")]
    pub rate_limit_backoff_ms: u64,
    /// Wait after any other failure
    #[serde(default = "default_retry_delay_ms")]
    pub retry_delay_ms: u64,
}

/// Batch driver configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchConfig {
    /// Pause between recipes, in milliseconds
    #[serde(default = "default_recipe_delay_ms")]
    pub recipe_delay_ms: u64,
}

// Default value functions
fn default_limit() -> usize {
    15
}

fn default_strong_match() -> i32 {
    10
}

fn default_acceptable() -> i32 {
    5
}

fn default_query_delay_ms() -> u64 {
    300
}

fn default_pexels_url() -> String {
    "https://api.pexels.com/v1".to_string()
}

fn default_unsplash_url() -> String {
    "https://api.unsplash.com".to_string()
}

fn default_pixabay_url() -> String {
    "https://pixabay.com/api".to_string()
}

fn default_wikimedia_url() -> String {
    "https://commons.wikimedia.org/w/api.php".to_string()
}

fn default_user_agent() -> String {
    "IlRicettarioBot/1.0".to_string()
}

fn default_timeout_seconds() -> u64 {
    30
}

fn default_attempts() -> u32 {
    3
}

fn default_rate_limit_backoff_ms() -> u64 {
    3000
}

fn default_retry_delay_ms() -> u64 {
    1000
}

fn default_recipe_delay_ms() -> u64 {
    2000
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            limit: default_limit(),
            strong_match: default_strong_match(),
            acceptable: default_acceptable(),
            query_delay_ms: default_query_delay_ms(),
        }
    }
}

impl Default for ProvidersConfig {
    fn default() -> Self {
        Self {
            pexels_api_key: None,
            unsplash_access_key: None,
            pixabay_api_key: None,
            pexels_url: default_pexels_url(),
            unsplash_url: default_unsplash_url(),
            pixabay_url: default_pixabay_url(),
            wikimedia_url: default_wikimedia_url(),
            user_agent: default_user_agent(),
            timeout_seconds: default_timeout_seconds(),
        }
    }
}

impl Default for DownloadConfig {
    fn default() -> Self {
        Self {
            attempts: default_attempts(),
            rate_limit_backoff_ms: default_rate_limit_backoff_ms(),
            retry_delay_ms: default_retry_delay_ms(),
        }
    }
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            recipe_delay_ms: default_recipe_delay_ms(),
        }
    }
}

impl SearchConfig {
    pub fn query_delay(&self) -> Duration {
        Duration::from_millis(self.query_delay_ms)
    }
}

impl ProvidersConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }

    /// Overlay credentials from the environment. Empty values count as unset.
    pub fn apply_env(&mut self) {
        let read = |var: &str| std::env::var(var).ok().filter(|v| !v.trim().is_empty());

        if let Some(key) = read(PEXELS_KEY_VAR) {
            self.pexels_api_key = Some(key);
        }
        if let Some(key) = read(UNSPLASH_KEY_VAR) {
            self.unsplash_access_key = Some(key);
        }
        if let Some(key) = read(PIXABAY_KEY_VAR) {
            self.pixabay_api_key = Some(key);
        }
    }
}

impl Config {
    /// Load configuration from file or use defaults, then apply environment credentials
    pub fn load(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        let config_path = explicit
            .map(Path::to_path_buf)
            .or_else(Self::find_config_path);

        let mut config = match config_path {
            Some(path) if path.exists() => {
                tracing::info!("Loading config from: {}", path.display());
                Self::from_file(&path)?
            }
            Some(path) => {
                tracing::debug!("Config file {} not found, using defaults", path.display());
                Self::default()
            }
            None => {
                tracing::debug!("No config path available, using defaults");
                Self::default()
            }
        };

        config.providers.apply_env();
        Ok(config)
    }

    /// Parse a TOML config file
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Find the configuration file path
    fn find_config_path() -> Option<PathBuf> {
        // 1. Check environment variable
        if let Ok(path) = std::env::var("RICETTARIO_IMAGES_CONFIG") {
            return Some(PathBuf::from(path));
        }

        // 2. Check the platform config dir
        dirs::config_dir().map(|dir| dir.join("ricettario").join("images.toml"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.search.limit, 15);
        assert_eq!(config.search.strong_match, 10);
        assert_eq!(config.search.acceptable, 5);
        assert_eq!(config.search.query_delay(), Duration::from_millis(300));
        assert_eq!(config.download.attempts, 3);
        assert_eq!(config.batch.recipe_delay_ms, 2000);
        assert!(config.providers.pexels_api_key.is_none());
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[search]\nstrong_match = 12\n\n[download]\nattempts = 5").unwrap();

        let config = Config::from_file(file.path()).unwrap();
        assert_eq!(config.search.strong_match, 12);
        assert_eq!(config.search.acceptable, 5);
        assert_eq!(config.download.attempts, 5);
        assert_eq!(config.download.retry_delay_ms, 1000);
        assert_eq!(config.providers.wikimedia_url, default_wikimedia_url());
    }

    #[test]
    fn test_invalid_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[search\nlimit = ").unwrap();

        let err = Config::from_file(file.path()).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }

    #[test]
    fn test_missing_explicit_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load(Some(&dir.path().join("absent.toml"))).unwrap();
        assert_eq!(config.search.limit, 15);
    }
}
