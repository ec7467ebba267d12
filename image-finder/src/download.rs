//! Image download with bounded retries
//!
//! Bytes are written to a sibling `.part` file and renamed into place, so
//! the destination path only ever holds a complete image.

use async_trait::async_trait;
use reqwest::Client;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::config::DownloadConfig;
use crate::error::{DownloadError, FetchError};

/// Trait for binary HTTP fetches, enabling mockability in tests.
#[async_trait]
pub trait FetchBytes: Send + Sync {
    /// Fetch the full body of `url`. Non-success statuses are errors.
    async fn fetch_bytes(&self, url: &str) -> Result<Vec<u8>, FetchError>;
}

/// Production fetcher backed by reqwest
pub struct ReqwestFetcher {
    client: Client,
}

impl ReqwestFetcher {
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl FetchBytes for ReqwestFetcher {
    async fn fetch_bytes(&self, url: &str) -> Result<Vec<u8>, FetchError> {
        let response = self.client.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status(status.as_u16()));
        }
        Ok(response.bytes().await?.to_vec())
    }
}

/// Retry policy for [`Downloader`]
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    pub attempts: u32,
    /// Multiplied by the attempt number after HTTP 429
    pub rate_limit_backoff: Duration,
    /// Fixed wait after any other failure
    pub retry_delay: Duration,
}

impl From<&DownloadConfig> for RetryPolicy {
    fn from(config: &DownloadConfig) -> Self {
        Self {
            attempts: config.attempts.max(1),
            rate_limit_backoff: Duration::from_millis(config.rate_limit_backoff_ms),
            retry_delay: Duration::from_millis(config.retry_delay_ms),
        }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::from(&DownloadConfig::default())
    }
}

/// Downloads images to disk
pub struct Downloader {
    fetcher: Box<dyn FetchBytes>,
    policy: RetryPolicy,
}

impl Downloader {
    pub fn new(fetcher: Box<dyn FetchBytes>, policy: RetryPolicy) -> Self {
        Self { fetcher, policy }
    }

    /// Download `url` to `dest`, creating parent directories as needed.
    ///
    /// Fetch and write failures both count as attempts. After the last one
    /// the most recent failure is returned.
    pub async fn download(&self, url: &str, dest: &Path) -> Result<PathBuf, DownloadError> {
        let attempts = self.policy.attempts;
        let mut last_failure = Failure::Fetch(FetchError::Network("no attempt made".to_string()));

        for attempt in 0..attempts {
            let is_last = attempt + 1 >= attempts;

            match self.fetcher.fetch_bytes(url).await {
                Ok(bytes) => match write_atomically(dest, &bytes).await {
                    Ok(()) => {
                        tracing::info!(
                            path = %dest.display(),
                            size_kb = bytes.len() / 1024,
                            "Image saved"
                        );
                        return Ok(dest.to_path_buf());
                    }
                    Err(e) => {
                        tracing::warn!(path = %dest.display(), attempt = attempt + 1, error = %e, "Could not write image");
                        last_failure = Failure::Write(e);
                        if !is_last {
                            tokio::time::sleep(self.policy.retry_delay).await;
                        }
                    }
                },
                Err(e) if e.is_rate_limited() => {
                    let wait = self.policy.rate_limit_backoff * (attempt + 1);
                    tracing::warn!(url, attempt = attempt + 1, wait_ms = wait.as_millis() as u64, "Rate limited, backing off");
                    last_failure = Failure::Fetch(e);
                    if !is_last {
                        tokio::time::sleep(wait).await;
                    }
                }
                Err(e) => {
                    tracing::warn!(url, attempt = attempt + 1, error = %e, "Download attempt failed");
                    last_failure = Failure::Fetch(e);
                    if !is_last {
                        tokio::time::sleep(self.policy.retry_delay).await;
                    }
                }
            }
        }

        Err(match last_failure {
            Failure::Fetch(last) => DownloadError::Exhausted {
                url: url.to_string(),
                attempts,
                last,
            },
            Failure::Write(source) => DownloadError::Io {
                path: dest.to_path_buf(),
                source,
            },
        })
    }
}

/// Why the latest attempt failed
enum Failure {
    Fetch(FetchError),
    Write(std::io::Error),
}

/// Sibling temp path: `photo.jpg` -> `photo.jpg.part`
fn part_path(dest: &Path) -> PathBuf {
    let mut name = dest
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_default();
    name.push(".part");
    dest.with_file_name(name)
}

async fn write_atomically(dest: &Path, bytes: &[u8]) -> std::io::Result<()> {
    if let Some(dir) = dest.parent() {
        tokio::fs::create_dir_all(dir).await?;
    }

    let tmp = part_path(dest);
    let result = async {
        tokio::fs::write(&tmp, bytes).await?;
        tokio::fs::rename(&tmp, dest).await
    }
    .await;

    if result.is_err() {
        // Best effort
        let _ = tokio::fs::remove_file(&tmp).await;
    }
    result
}
