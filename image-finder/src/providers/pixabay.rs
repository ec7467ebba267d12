//! Pixabay backend
//!
//! Large catalogue, generous quota (100 requests per minute). The key is
//! passed as a query parameter rather than a header.
//! See: https://pixabay.com/api/docs/

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;

use super::{check_status, non_empty, recover, ImageProvider, MIN_HEIGHT, MIN_WIDTH};
use crate::error::ProviderError;
use crate::types::{ImageCandidate, ProviderKind};

/// Pixabay backend
pub struct PixabayProvider {
    client: Client,
    base_url: String,
    api_key: Option<String>,
}

impl PixabayProvider {
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
        let url = format!("{}/", self.base_url.trim_end_matches('/'));
        let per_page = limit.to_string();
        let min_width = MIN_WIDTH.to_string();
        let min_height = MIN_HEIGHT.to_string();

        let response = self
            .client
            .get(&url)
            .query(&[
                ("key", api_key),
                ("q", query),
                ("per_page", per_page.as_str()),
                ("image_type", "photo"),
                ("orientation", "horizontal"),
                ("safesearch", "true"),
                ("min_width", min_width.as_str()),
                ("min_height", min_height.as_str()),
            ])
            .send()
            .await?;

        let body: PixabayResponse = check_status(response).await?.json().await?;

        Ok(body
            .hits
            .into_iter()
            .filter_map(|hit| hit.into_candidate(query))
            .collect())
    }
}

// Pixabay API response types
#[derive(Debug, Deserialize)]
struct PixabayResponse {
    #[serde(default)]
    hits: Vec<PixabayHit>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PixabayHit {
    tags: Option<String>,
    #[serde(rename = "largeImageURL")]
    large_image_url: Option<String>,
    #[serde(rename = "webformatURL")]
    webformat_url: Option<String>,
    #[serde(rename = "previewURL")]
    preview_url: Option<String>,
    #[serde(default)]
    image_width: u32,
    #[serde(default)]
    image_height: u32,
    user: Option<String>,
    #[serde(rename = "user_id")]
    user_id: Option<u64>,
}

impl PixabayHit {
    /// `None` when the hit has no downloadable size
    fn into_candidate(self, query: &str) -> Option<ImageCandidate> {
        let url = non_empty(self.large_image_url).or_else(|| non_empty(self.webformat_url))?;
        let tags = non_empty(self.tags);
        let author_url = self
            .user_id
            .map(|id| format!("https://pixabay.com/users/{}/", id))
            .unwrap_or_default();

        Some(ImageCandidate {
            title: tags.clone().unwrap_or_else(|| query.to_string()),
            description: tags.unwrap_or_default(),
            url,
            thumb_url: self.preview_url.unwrap_or_default(),
            width: self.image_width,
            height: self.image_height,
            license: "Pixabay License".to_string(),
            author: non_empty(self.user).unwrap_or_else(|| "Pixabay".to_string()),
            author_url,
            provider: ProviderKind::Pixabay,
            score: 0,
        })
    }
}

#[async_trait]
impl ImageProvider for PixabayProvider {
    fn kind(&self) -> ProviderKind {
        ProviderKind::Pixabay
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

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Matcher;

    #[tokio::test]
    async fn test_search_maps_hits() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/")
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("key".into(), "k".into()),
                Matcher::UrlEncoded("q".into(), "pizza".into()),
                Matcher::UrlEncoded("orientation".into(), "horizontal".into()),
                Matcher::UrlEncoded("safesearch".into(), "true".into()),
                Matcher::UrlEncoded("min_width".into(), "600".into()),
                Matcher::UrlEncoded("min_height".into(), "400".into()),
            ]))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                r#"{"total": 1, "totalHits": 1, "hits": [{
                    "id": 7,
                    "tags": "pizza, margherita, basil",
                    "previewURL": "https://cdn.pixabay.com/7_150.jpg",
                    "webformatURL": "https://pixabay.com/get/7_640.jpg",
                    "largeImageURL": "https://pixabay.com/get/7_1280.jpg",
                    "imageWidth": 5000,
                    "imageHeight": 3333,
                    "user_id": 42,
                    "user": "chef"
                }]}"#,
            )
            .create_async()
            .await;

        let provider = PixabayProvider::new(Client::new(), server.url(), Some("k".into()));
        let results = provider.search("pizza", 15).await;
        mock.assert_async().await;

        assert_eq!(results.len(), 1);
        let hit = &results[0];
        assert_eq!(hit.title, "pizza, margherita, basil");
        assert_eq!(hit.description, "pizza, margherita, basil");
        assert_eq!(hit.url, "https://pixabay.com/get/7_1280.jpg");
        assert_eq!(hit.thumb_url, "https://cdn.pixabay.com/7_150.jpg");
        assert_eq!((hit.width, hit.height), (5000, 3333));
        assert_eq!(hit.author, "chef");
        assert_eq!(hit.author_url, "https://pixabay.com/users/42/");
        assert_eq!(hit.license, "Pixabay License");
    }

    #[tokio::test]
    async fn test_hit_without_url_is_dropped() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/")
            .match_query(Matcher::Any)
            .with_status(200)
            .with_body(
                r#"{"hits": [
                    {"id": 1, "tags": "pizza margherita", "imageWidth": 5000, "imageHeight": 3333,
                     "largeImageURL": ""},
                    {"id": 2, "tags": "pizza", "imageWidth": 5000, "imageHeight": 3333,
                     "webformatURL": "https://pixabay.com/get/2_640.jpg"}
                ]}"#,
            )
            .create_async()
            .await;

        let provider = PixabayProvider::new(Client::new(), server.url(), Some("k".into()));
        let results = provider.search("pizza", 15).await;

        assert_eq!(results.len(), 1);
        assert_eq!(results[0].url, "https://pixabay.com/get/2_640.jpg");
    }

    #[tokio::test]
    async fn test_bad_request_yields_empty() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/")
            .match_query(Matcher::Any)
            .with_status(400)
            .with_body("[ERROR 400] \"key\" is invalid")
            .create_async()
            .await;

        let provider = PixabayProvider::new(Client::new(), server.url(), Some("bad".into()));
        assert!(provider.search("pizza", 15).await.is_empty());
    }
}
