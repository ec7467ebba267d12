//! Wikimedia Commons backend
//!
//! Keyless fallback. Searches the File namespace through the MediaWiki
//! `generator=search` API and asks for `imageinfo` in the same request.
//! See: https://commons.wikimedia.org/w/api.php

use async_trait::async_trait;
use regex::Regex;
use reqwest::Client;
use serde::Deserialize;
use std::collections::HashMap;
use std::sync::LazyLock;

use super::{check_status, non_empty, recover, ImageProvider, MIN_HEIGHT, MIN_WIDTH};
use crate::error::ProviderError;
use crate::types::{ImageCandidate, ProviderKind};

/// Raster formats a recipe page can show
const ALLOWED_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "webp"];

static HTML_TAG_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<[^>]*>").unwrap());

/// Wikimedia Commons backend
pub struct WikimediaProvider {
    client: Client,
    api_url: String,
}

impl WikimediaProvider {
    pub fn new(client: Client, api_url: String) -> Self {
        Self { client, api_url }
    }

    async fn fetch(&self, query: &str, limit: usize) -> Result<Vec<ImageCandidate>, ProviderError> {
        let limit = limit.to_string();

        let response = self
            .client
            .get(&self.api_url)
            .query(&[
                ("action", "query"),
                ("format", "json"),
                ("generator", "search"),
                ("gsrnamespace", "6"), // File namespace
                ("gsrsearch", query),
                ("gsrlimit", limit.as_str()),
                ("prop", "imageinfo"),
                ("iiprop", "url|size|extmetadata|mime"),
                ("iiurlwidth", "800"),
                ("origin", "*"),
            ])
            .send()
            .await?;

        let body: WikiResponse = check_status(response).await?.json().await?;

        let mut pages: Vec<WikiPage> = body
            .query
            .map(|q| q.pages.into_values().collect())
            .unwrap_or_default();
        // Keep search rank order; the pages map itself is unordered
        pages.sort_by_key(|p| (p.index.unwrap_or(u32::MAX), p.pageid));

        Ok(pages
            .into_iter()
            .filter_map(|page| page.into_candidate(query))
            .collect())
    }
}

// MediaWiki API response types
#[derive(Debug, Deserialize)]
struct WikiResponse {
    query: Option<WikiQuery>,
}

#[derive(Debug, Deserialize)]
struct WikiQuery {
    #[serde(default)]
    pages: HashMap<String, WikiPage>,
}

#[derive(Debug, Deserialize)]
struct WikiPage {
    #[serde(default)]
    pageid: u64,
    index: Option<u32>,
    title: Option<String>,
    imageinfo: Option<Vec<WikiImageInfo>>,
}

#[derive(Debug, Deserialize)]
struct WikiImageInfo {
    url: Option<String>,
    thumburl: Option<String>,
    #[serde(default)]
    width: u32,
    #[serde(default)]
    height: u32,
    extmetadata: Option<WikiExtMetadata>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct WikiExtMetadata {
    license_short_name: Option<WikiMetaValue>,
    artist: Option<WikiMetaValue>,
    image_description: Option<WikiMetaValue>,
}

#[derive(Debug, Deserialize)]
struct WikiMetaValue {
    value: Option<serde_json::Value>,
}

impl WikiMetaValue {
    /// Metadata values are usually HTML strings, occasionally numbers
    fn text(&self) -> Option<String> {
        let raw = match self.value.as_ref()? {
            serde_json::Value::String(s) => s.clone(),
            other => other.to_string(),
        };
        non_empty(Some(strip_html(&raw)))
    }
}

impl WikiPage {
    fn into_candidate(self, query: &str) -> Option<ImageCandidate> {
        let info = self.imageinfo?.into_iter().next()?;
        let url = info.url?;

        if !has_allowed_extension(&url) {
            return None;
        }
        if info.width < MIN_WIDTH || info.height < MIN_HEIGHT {
            return None;
        }

        let meta = info.extmetadata.unwrap_or_default();
        let title = self
            .title
            .map(|t| t.replacen("File:", "", 1))
            .and_then(|t| non_empty(Some(t)))
            .unwrap_or_else(|| query.to_string());

        Some(ImageCandidate {
            title,
            description: meta
                .image_description
                .as_ref()
                .and_then(WikiMetaValue::text)
                .unwrap_or_default(),
            thumb_url: info.thumburl.unwrap_or_else(|| url.clone()),
            url,
            width: info.width,
            height: info.height,
            license: meta
                .license_short_name
                .as_ref()
                .and_then(WikiMetaValue::text)
                .unwrap_or_else(|| "CC".to_string()),
            author: meta
                .artist
                .as_ref()
                .and_then(WikiMetaValue::text)
                .unwrap_or_else(|| "Wikimedia".to_string()),
            author_url: String::new(),
            provider: ProviderKind::Wikimedia,
            score: 0,
        })
    }
}

fn strip_html(text: &str) -> String {
    HTML_TAG_RE.replace_all(text, "").trim().to_string()
}

/// Check the file extension of an asset URL, ignoring query and escapes
fn has_allowed_extension(asset_url: &str) -> bool {
    let path = url::Url::parse(asset_url)
        .map(|u| u.path().to_string())
        .unwrap_or_else(|_| asset_url.split('?').next().unwrap_or_default().to_string());

    let extension = path
        .rsplit('.')
        .next()
        .unwrap_or_default()
        .split('%')
        .next()
        .unwrap_or_default()
        .to_lowercase();

    ALLOWED_EXTENSIONS.contains(&extension.as_str())
}

#[async_trait]
impl ImageProvider for WikimediaProvider {
    fn kind(&self) -> ProviderKind {
        ProviderKind::Wikimedia
    }

    fn is_available(&self) -> bool {
        !self.api_url.is_empty()
    }

    async fn search(&self, query: &str, limit: usize) -> Vec<ImageCandidate> {
        if !self.is_available() {
            return Vec::new();
        }
        recover(self.kind(), query, self.fetch(query, limit)).await
    }
}
