//! Pexels backend
//!
//! Best food photography of the four, 200 requests per hour.
//! See: https://www.pexels.com/api/documentation/

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;

use super::{check_status, non_empty, recover, ImageProvider};
use crate::error::ProviderError;
use crate::types::{ImageCandidate, ProviderKind};

/// Pexels backend
pub struct PexelsProvider {
    client: Client,
    base_url: String,
    api_key: Option<String>,
}

impl PexelsProvider {
    pub fn new(client: Client, base_url: String, api_key: Option<String>) -> Self {
        Self {
            client,
            base_url,
            api_key: non_empty(api_key),
        }
    }

    async fn fetch(
        &self,
        api_key: &str,
        query: &str,
        limit: usize,
    ) -> Result<Vec<ImageCandidate>, ProviderError> {
        let url = format!("{}/search", self.base_url.trim_end_matches('/'));
        let per_page = limit.to_string();

        let response = self
            .client
            .get(&url)
            .header("Authorization", api_key)
            .query(&[
                ("query", query),
                ("per_page", per_page.as_str()),
                ("orientation", "landscape"),
            ])
            .send()
            .await?;

        let body: PexelsResponse = check_status(response).await?.json().await?;

        Ok(body
            .photos
            .into_iter()
            .filter_map(|photo| photo.into_candidate(query))
            .collect())
    }
}

// Pexels API response types
#[derive(Debug, Deserialize)]
struct PexelsResponse {
    #[serde(default)]
    photos: Vec<PexelsPhoto>,
}

#[derive(Debug, Deserialize)]
struct PexelsPhoto {
    #[serde(default)]
    width: u32,
    #[serde(default)]
    height: u32,
    photographer: Option<String>,
    photographer_url: Option<String>,
    alt: Option<String>,
    src: PexelsSrc,
}

#[derive(Debug, Deserialize)]
struct PexelsSrc {
    original: Option<String>,
    large2x: Option<String>,
    large: Option<String>,
    medium: Option<String>,
}

impl PexelsPhoto {
    /// `None` when the photo has no downloadable size
    fn into_candidate(self, query: &str) -> Option<ImageCandidate> {
        let url = non_empty(self.src.large2x)
            .or_else(|| non_empty(self.src.large))
            .or_else(|| non_empty(self.src.original))?;
        let alt = non_empty(self.alt);

        Some(ImageCandidate {
            title: alt.clone().unwrap_or_else(|| query.to_string()),
            description: alt.unwrap_or_default(),
            url,
            thumb_url: self.src.medium.unwrap_or_default(),
            width: self.width,
            height: self.height,
            license: "Pexels License".to_string(),
            author: non_empty(self.photographer).unwrap_or_else(|| "Pexels".to_string()),
            author_url: self.photographer_url.unwrap_or_default(),
            provider: ProviderKind::Pexels,
            score: 0,
        })
    }
}

#[async_trait]
impl ImageProvider for PexelsProvider {
    fn kind(&self) -> ProviderKind {
        ProviderKind::Pexels
    }

    fn is_available(&self) -> bool {
        self.api_key.is_some()
    }

    async fn search(&self, query: &str, limit: usize) -> Vec<ImageCandidate> {
        let Some(api_key) = self.api_key.as_deref() else {
            return Vec::new();
        };
        recover(self.kind(), query, self.fetch(api_key, query, limit)).await
    }
}
