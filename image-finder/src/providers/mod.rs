//! Image provider implementations
//!
//! This module provides a trait-based abstraction for stock photo backends.
//! The cascade walks [`default_providers`] in priority order:
//! Pexels, Unsplash, Pixabay, then Wikimedia Commons (no key needed).

use async_trait::async_trait;
use reqwest::Client;
use std::future::Future;

use crate::config::ProvidersConfig;
use crate::error::ProviderError;
use crate::types::{ImageCandidate, ProviderKind};

pub mod pexels;
pub mod pixabay;
pub mod unsplash;
pub mod wikimedia;

pub use pexels::PexelsProvider;
pub use pixabay::PixabayProvider;
pub use unsplash::UnsplashProvider;
pub use wikimedia::WikimediaProvider;

/// Smallest image worth putting on a recipe page
pub const MIN_WIDTH: u32 = 600;
pub const MIN_HEIGHT: u32 = 400;

/// Trait for image search backends
///
/// `search` never fails: a missing credential, a bad status code or an
/// unreadable body all yield an empty list so the cascade can move on.
#[async_trait]
pub trait ImageProvider: Send + Sync {
    /// Which backend this is
    fn kind(&self) -> ProviderKind;

    /// Check if this provider is configured and available
    fn is_available(&self) -> bool;

    /// Search for up to `limit` images matching `query`
    async fn search(&self, query: &str, limit: usize) -> Vec<ImageCandidate>;
}

/// The fixed priority-ordered provider list
pub fn default_providers(config: &ProvidersConfig) -> Vec<Box<dyn ImageProvider>> {
    let client = build_client(config);
    vec![
        Box::new(PexelsProvider::new(
            client.clone(),
            config.pexels_url.clone(),
            config.pexels_api_key.clone(),
        )),
        Box::new(UnsplashProvider::new(
            client.clone(),
            config.unsplash_url.clone(),
            config.unsplash_access_key.clone(),
        )),
        Box::new(PixabayProvider::new(
            client.clone(),
            config.pixabay_url.clone(),
            config.pixabay_api_key.clone(),
        )),
        Box::new(WikimediaProvider::new(client, config.wikimedia_url.clone())),
    ]
}

/// Shared HTTP client for all providers
pub fn build_client(config: &ProvidersConfig) -> Client {
    Client::builder()
        .user_agent(&config.user_agent)
        .timeout(config.timeout())
        .build()
        .unwrap_or_else(|e| {
            tracing::warn!(error = %e, "Falling back to default HTTP client");
            Client::new()
        })
}

/// Run a provider request, logging and swallowing any failure
async fn recover<F>(kind: ProviderKind, query: &str, request: F) -> Vec<ImageCandidate>
where
    F: Future<Output = Result<Vec<ImageCandidate>, ProviderError>>,
{
    match request.await {
        Ok(candidates) => candidates,
        Err(e) => {
            tracing::warn!(provider = %kind, query, error = %e, "Provider request failed");
            Vec::new()
        }
    }
}

/// Turn a non-success response into a [`ProviderError::Status`]
async fn check_status(response: reqwest::Response) -> Result<reqwest::Response, ProviderError> {
    if response.status().is_success() {
        return Ok(response);
    }
    let status = response.status().as_u16();
    let body = response.text().await.unwrap_or_default();
    Err(ProviderError::Status {
        status,
        body: body.chars().take(200).collect(),
    })
}

/// Use `value` unless it is missing or blank
fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_provider_order() {
        let providers = default_providers(&ProvidersConfig::default());
        let kinds: Vec<ProviderKind> = providers.iter().map(|p| p.kind()).collect();
        assert_eq!(
            kinds,
            vec![
                ProviderKind::Pexels,
                ProviderKind::Unsplash,
                ProviderKind::Pixabay,
                ProviderKind::Wikimedia,
            ]
        );
    }

    #[test]
    fn test_only_keyless_provider_available_without_credentials() {
        let providers = default_providers(&ProvidersConfig::default());
        let available: Vec<ProviderKind> = providers
            .iter()
            .filter(|p| p.is_available())
            .map(|p| p.kind())
            .collect();
        assert_eq!(available, vec![ProviderKind::Wikimedia]);
    }

    #[test]
    fn test_non_empty() {
        assert_eq!(non_empty(Some("x".into())), Some("x".into()));
        assert_eq!(non_empty(Some("  ".into())), None);
        assert_eq!(non_empty(None), None);
    }
}
