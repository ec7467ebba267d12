//! Provider cascade
//!
//! Walks providers in priority order and, inside each provider, the query
//! list in builder order. The running best candidate is kept across the
//! whole search. A strong match ends the query loop for the current
//! provider; an acceptable match ends the provider loop.

use std::time::Duration;

use crate::config::SearchConfig;
use crate::providers::ImageProvider;
use crate::queries::{build_search_queries, scoring_keywords};
use crate::scoring::score_with_used;
use crate::types::{ImageCandidate, UsedUrls};

/// Candidates at or below this score are never selected. Anything carrying
/// the duplicate penalty lands here.
pub const SELECTABLE_FLOOR: i32 = -500;

/// Tunable cascade parameters
#[derive(Debug, Clone)]
pub struct CascadeSettings {
    /// Results requested per provider query
    pub limit: usize,
    /// Stop querying the current provider once the best score reaches this
    pub strong_match: i32,
    /// Stop trying further providers once the best score reaches this
    pub acceptable: i32,
    /// Pause after each provider query
    pub query_delay: Duration,
}

impl Default for CascadeSettings {
    fn default() -> Self {
        Self::from(&SearchConfig::default())
    }
}

impl From<&SearchConfig> for CascadeSettings {
    fn from(config: &SearchConfig) -> Self {
        Self {
            limit: config.limit,
            strong_match: config.strong_match,
            acceptable: config.acceptable,
            query_delay: config.query_delay(),
        }
    }
}

/// Multi-provider image search
pub struct ImageFinder {
    providers: Vec<Box<dyn ImageProvider>>,
    settings: CascadeSettings,
}

impl ImageFinder {
    pub fn new(providers: Vec<Box<dyn ImageProvider>>, settings: CascadeSettings) -> Self {
        Self {
            providers,
            settings,
        }
    }

    pub fn settings(&self) -> &CascadeSettings {
        &self.settings
    }

    /// Find the best image for a recipe.
    ///
    /// Returns `None` when no provider produced a selectable candidate. On
    /// success the winner's URL is recorded in `used`.
    pub async fn find(
        &self,
        recipe_name: &str,
        category: &str,
        ai_keywords: &[String],
        used: &mut UsedUrls,
    ) -> Option<ImageCandidate> {
        let queries = build_search_queries(recipe_name, category, ai_keywords);
        let keywords = scoring_keywords(recipe_name, ai_keywords);

        tracing::info!(recipe = recipe_name, category, queries = queries.len(), "Searching stock images");

        let mut best: Option<ImageCandidate> = None;

        for provider in &self.providers {
            let kind = provider.kind();
            if !provider.is_available() {
                tracing::debug!(provider = %kind, "Provider not configured, skipping");
                continue;
            }

            for query in &queries {
                let mut results = provider.search(query, self.settings.limit).await;

                if results.is_empty() {
                    tracing::debug!(provider = %kind, query = %query, "No results");
                    self.pause().await;
                    continue;
                }

                for candidate in &mut results {
                    candidate.score = score_with_used(candidate, &keywords, used);
                }
                // Stable sort: among equal scores the provider's own order wins
                results.sort_by(|a, b| b.score.cmp(&a.score));

                let count = results.len();
                let top = results.swap_remove(0);
                tracing::debug!(
                    provider = %kind,
                    query = %query,
                    results = count,
                    top_score = top.score,
                    "Scored results"
                );

                if top.score > SELECTABLE_FLOOR
                    && best.as_ref().map_or(true, |b| top.score > b.score)
                {
                    best = Some(top);
                }

                if best
                    .as_ref()
                    .is_some_and(|b| b.score >= self.settings.strong_match)
                {
                    break;
                }

                self.pause().await;
            }

            if best
                .as_ref()
                .is_some_and(|b| b.score >= self.settings.acceptable)
            {
                tracing::info!(provider = %kind, "Found an acceptable image");
                break;
            }
        }

        match &best {
            Some(winner) => {
                used.insert(winner.url.clone());
                tracing::info!(
                    title = %winner.title,
                    provider = %winner.provider,
                    score = winner.score,
                    width = winner.width,
                    height = winner.height,
                    author = %winner.author,
                    license = %winner.license,
                    url = %winner.url,
                    "Selected image"
                );
            }
            None => tracing::warn!(recipe = recipe_name, "No image found on any provider"),
        }

        best
    }

    async fn pause(&self) {
        if !self.settings.query_delay.is_zero() {
            tokio::time::sleep(self.settings.query_delay).await;
        }
    }
}
