//! Unsplash backend
//!
//! High quality but a tight demo quota (50 requests per hour).
//! See: https://unsplash.com/documentation#search-photos

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;

use super::{check_status, non_empty, recover, ImageProvider};
use crate::error::ProviderError;
use crate::types::{ImageCandidate, ProviderKind};

/// Unsplash backend
pub struct UnsplashProvider {
    client: Client,
    base_url: String,
    access_key: Option<String>,
}

impl UnsplashProvider {
    pub fn new(client: Client, base_url: String, access_key: Option<String>) -> Self {
        Self {
            client,
            base_url,
            access_key: non_empty(access_key),
        }
    }

    async fn fetch(
        &self,
        access_key: &str,
        query: &str,
        limit: usize,
    ) -> Result<Vec<ImageCandidate>, ProviderError> {
        let url = format!("{}/search/photos", self.base_url.trim_end_matches('/'));
        let per_page = limit.to_string();

        let response = self
            .client
            .get(&url)
            .header("Authorization", format!("Client-ID {}", access_key))
            .query(&[
                ("query", query),
                ("per_page", per_page.as_str()),
                ("orientation", "landscape"),
                ("content_filter", "high"),
            ])
            .send()
            .await?;

        let body: UnsplashResponse = check_status(response).await?.json().await?;

        Ok(body
            .results
            .into_iter()
            .filter_map(|photo| photo.into_candidate(query))
            .collect())
    }
}

// Unsplash API response types
#[derive(Debug, Deserialize)]
struct UnsplashResponse {
    #[serde(default)]
    results: Vec<UnsplashPhoto>,
}

#[derive(Debug, Deserialize)]
struct UnsplashPhoto {
    #[serde(default)]
    width: u32,
    #[serde(default)]
    height: u32,
    description: Option<String>,
    alt_description: Option<String>,
    #[serde(default)]
    urls: UnsplashUrls,
    user: Option<UnsplashUser>,
}

#[derive(Debug, Default, Deserialize)]
struct UnsplashUrls {
    #[serde(default)]
    regular: String,
    #[serde(default)]
    small: String,
}

#[derive(Debug, Deserialize)]
struct UnsplashUser {
    name: Option<String>,
    links: Option<UnsplashUserLinks>,
}

#[derive(Debug, Deserialize)]
struct UnsplashUserLinks {
    html: Option<String>,
}

impl UnsplashPhoto {
    /// `None` when the photo has no downloadable size
    fn into_candidate(self, query: &str) -> Option<ImageCandidate> {
        let url = non_empty(Some(self.urls.regular))?;
        let alt = non_empty(self.alt_description);
        let title = non_empty(self.description)
            .or_else(|| alt.clone())
            .unwrap_or_else(|| query.to_string());
        let (author, author_url) = match self.user {
            Some(user) => (
                non_empty(user.name),
                user.links.and_then(|links| links.html),
            ),
            None => (None, None),
        };

        Some(ImageCandidate {
            title,
            description: alt.unwrap_or_default(),
            // "regular" is 1080px wide
            url,
            thumb_url: self.urls.small,
            width: self.width,
            height: self.height,
            license: "Unsplash License".to_string(),
            author: author.unwrap_or_else(|| "Unsplash".to_string()),
            author_url: author_url.unwrap_or_default(),
            provider: ProviderKind::Unsplash,
            score: 0,
        })
    }
}

#[async_trait]
impl ImageProvider for UnsplashProvider {
    fn kind(&self) -> ProviderKind {
        ProviderKind::Unsplash
    }

    fn is_available(&self) -> bool {
        self.access_key.is_some()
    }

    async fn search(&self, query: &str, limit: usize) -> Vec<ImageCandidate> {
        let Some(access_key) = self.access_key.as_deref() else {
            return Vec::new();
        };
        recover(self.kind(), query, self.fetch(access_key, query, limit)).await
    }
}
