//! Common types for image search
//!
//! These types are shared by all providers, the scorer and the cascade so
//! results from different backends can be compared directly.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

use crate::error::RecipeError;

/// Which backend produced a candidate, in cascade priority order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ProviderKind {
    Pexels,
    Unsplash,
    Pixabay,
    Wikimedia,
}

impl ProviderKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderKind::Pexels => "Pexels",
            ProviderKind::Unsplash => "Unsplash",
            ProviderKind::Pixabay => "Pixabay",
            ProviderKind::Wikimedia => "Wikimedia",
        }
    }
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single image returned by a provider, before selection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageCandidate {
    /// Title or alt text, the main scoring input
    pub title: String,
    /// Longer description or tags
    pub description: String,
    /// Full-resolution asset URL
    pub url: String,
    /// Preview-sized asset URL
    pub thumb_url: String,
    /// Width in pixels, 0 when unknown
    pub width: u32,
    /// Height in pixels, 0 when unknown
    pub height: u32,
    pub license: String,
    pub author: String,
    pub author_url: String,
    pub provider: ProviderKind,
    /// Relevance score assigned by the cascade
    pub score: i32,
}

/// The downloaded image handed to page generation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageDescriptor {
    /// Absolute path of the saved file
    pub local_path: String,
    /// Path relative to a recipe page (`../../images/...`)
    pub relative_path: String,
    /// Path relative to the site root (`images/...`)
    pub home_relative_path: String,
    pub url: String,
    pub thumb_url: String,
    pub attribution: String,
    pub license: String,
    pub author: String,
    pub provider: ProviderKind,
    pub width: u32,
    pub height: u32,
}

/// Recipe metadata as produced by the rewriting step
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecipeMeta {
    pub title: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub slug: String,
    #[serde(default)]
    pub image_keywords: Vec<String>,
}

impl RecipeMeta {
    /// Recover recipe metadata from a raw model reply (fences, comments and
    /// trailing commas are tolerated).
    pub fn from_llm_reply(reply: &str) -> Result<Self, RecipeError> {
        let value = ricettario_common::parse_llm_json(reply)?;
        // Derived Deserialize would also accept a positional array
        if !value.is_object() {
            return Err(RecipeError::Shape(serde::de::Error::custom(
                "expected a JSON object with recipe fields",
            )));
        }
        Ok(serde_json::from_value(value)?)
    }
}

/// Asset URLs already chosen during this run
///
/// Threaded by `&mut` through every search in a batch so two recipes never
/// end up with the same photo.
#[derive(Debug, Clone, Default)]
pub struct UsedUrls {
    urls: HashSet<String>,
}

impl UsedUrls {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, url: &str) -> bool {
        self.urls.contains(url)
    }

    /// Record a chosen URL. Returns false if it was already present.
    pub fn insert(&mut self, url: impl Into<String>) -> bool {
        self.urls.insert(url.into())
    }

    pub fn len(&self) -> usize {
        self.urls.len()
    }

    pub fn is_empty(&self) -> bool {
        self.urls.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recipe_from_fenced_reply() {
        let reply = "```json\n{\n  \"title\": \"Rigatoni alla Norma\",\n  \"category\": \"Pasta\",\n  \"slug\": \"rigatoni-norma\",\n  \"imageKeywords\": [\"rigatoni pasta\", \"eggplant tomato\"],\n}\n```";
        let recipe = RecipeMeta::from_llm_reply(reply).unwrap();
        assert_eq!(recipe.title, "Rigatoni alla Norma");
        assert_eq!(recipe.slug, "rigatoni-norma");
        assert_eq!(recipe.image_keywords, vec!["rigatoni pasta", "eggplant tomato"]);
    }

    #[test]
    fn test_recipe_optional_fields_default() {
        let recipe = RecipeMeta::from_llm_reply(r#"{"title": "Pane casalingo"}"#).unwrap();
        assert!(recipe.category.is_empty());
        assert!(recipe.image_keywords.is_empty());
    }

    #[test]
    fn test_recipe_wrong_shape() {
        let err = RecipeMeta::from_llm_reply(r#"["not", "a", "recipe"]"#).unwrap_err();
        assert!(matches!(err, RecipeError::Shape(_)));

        let err = RecipeMeta::from_llm_reply("Here it is: \"just a string\"").unwrap_err();
        assert!(matches!(err, RecipeError::Json(_) | RecipeError::Shape(_)));
    }

    #[test]
    fn test_recipe_array_in_prose_is_rejected() {
        let reply = "Ecco le parole chiave: [\"pane\", \"Pane\", \"pane-casalingo\"]";
        let err = RecipeMeta::from_llm_reply(reply).unwrap_err();
        assert!(matches!(err, RecipeError::Shape(_)));
    }

    #[test]
    fn test_used_urls() {
        let mut used = UsedUrls::new();
        assert!(used.is_empty());
        assert!(used.insert("https://a"));
        assert!(!used.insert("https://a"));
        assert!(used.contains("https://a"));
        assert_eq!(used.len(), 1);
    }

    #[test]
    fn test_descriptor_serializes_camel_case() {
        let descriptor = ImageDescriptor {
            local_path: "/site/public/images/ricette/pane/x.jpg".into(),
            relative_path: "../../images/ricette/pane/x.jpg".into(),
            home_relative_path: "images/ricette/pane/x.jpg".into(),
            url: "https://img".into(),
            thumb_url: String::new(),
            attribution: String::new(),
            license: "CC".into(),
            author: String::new(),
            provider: ProviderKind::Wikimedia,
            width: 1200,
            height: 800,
        };
        let json = serde_json::to_value(&descriptor).unwrap();
        assert_eq!(json["homeRelativePath"], "images/ricette/pane/x.jpg");
        assert_eq!(json["provider"], "Wikimedia");
    }
}
