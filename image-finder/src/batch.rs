//! Batch image refresh for existing recipe pages
//!
//! Scans `<site_root>/ricette/<subdir>/*.html`, finds a new photo for each
//! page with one shared [`UsedUrls`], and points the page's hero image and
//! `og:image` at the downloaded file. One recipe failing never stops the
//! batch.

use regex::Regex;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;
use std::time::Duration;

use crate::cascade::ImageFinder;
use crate::download::Downloader;
use crate::resolve::find_and_download;
use crate::types::{RecipeMeta, UsedUrls};

static H1_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)<h1[^>]*>([^<]+)</h1>").unwrap());
static HERO_SRC_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"(?i)(class="recipe-hero__image"[^>]*src=")[^"]*(")"#).unwrap());
static OG_IMAGE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"(?i)(property="og:image"\s+content=")[^"]*(")"#).unwrap());

/// A recipe page found on disk
#[derive(Debug, Clone, PartialEq)]
pub struct RecipePage {
    pub path: PathBuf,
    pub meta: RecipeMeta,
}

/// Outcome for one recipe
#[derive(Debug, Clone)]
pub struct BatchEntry {
    pub title: String,
    pub category: String,
    /// Site-relative image path when an image was saved
    pub image: Option<String>,
}

/// Summary of a batch run
#[derive(Debug, Clone, Default)]
pub struct BatchReport {
    pub entries: Vec<BatchEntry>,
}

impl BatchReport {
    pub fn succeeded(&self) -> usize {
        self.entries.iter().filter(|e| e.image.is_some()).count()
    }

    pub fn failed(&self) -> usize {
        self.entries.len() - self.succeeded()
    }
}

/// Display category for a recipe subfolder
pub fn category_for_dir(subdir: &str) -> String {
    match subdir {
        "pane" => "Pane".to_string(),
        "pizza" => "Pizza".to_string(),
        "pasta" => "Pasta".to_string(),
        "lievitati" => "Lievitati".to_string(),
        "dolci" => "Dolci".to_string(),
        other => other.to_string(),
    }
}

/// Page title from the first `<h1>`
pub fn extract_title(html: &str) -> Option<String> {
    H1_RE
        .captures(html)
        .map(|c| c[1].trim().to_string())
        .filter(|t| !t.is_empty())
}

/// Point the hero `<img>` and `og:image` meta at `image_path`.
pub fn patch_image_paths(html: &str, image_path: &str) -> String {
    let replacement = format!("${{1}}{}${{2}}", image_path.replace('$', "$$"));
    let html = HERO_SRC_RE.replace(html, replacement.as_str());
    OG_IMAGE_RE.replace(&html, replacement.as_str()).into_owned()
}

/// List recipe pages under `<site_root>/ricette`, sorted for stable runs.
pub fn discover_recipes(site_root: &Path) -> std::io::Result<Vec<RecipePage>> {
    let ricette = site_root.join("ricette");

    let mut subdirs: Vec<PathBuf> = std::fs::read_dir(&ricette)?
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| path.is_dir())
        .collect();
    subdirs.sort();

    let mut pages = Vec::new();
    for dir in subdirs {
        let Some(subdir) = dir.file_name().and_then(|n| n.to_str()).map(str::to_string) else {
            continue;
        };

        let mut files: Vec<PathBuf> = std::fs::read_dir(&dir)?
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.path())
            .filter(|path| path.extension().is_some_and(|ext| ext == "html"))
            .collect();
        files.sort();

        for path in files {
            let slug = path
                .file_stem()
                .and_then(|s| s.to_str())
                .unwrap_or_default()
                .to_string();
            let title = match std::fs::read(&path) {
                Ok(bytes) => extract_title(&String::from_utf8_lossy(&bytes)),
                Err(e) => {
                    tracing::warn!(page = %path.display(), error = %e, "Cannot read page, using file name");
                    None
                }
            }
            .unwrap_or_else(|| slug.clone());

            pages.push(RecipePage {
                path,
                meta: RecipeMeta {
                    title,
                    category: category_for_dir(&subdir),
                    slug,
                    image_keywords: Vec::new(),
                },
            });
        }
    }

    Ok(pages)
}

/// Refresh images for every recipe page under `site_root`.
pub async fn run_batch(
    site_root: &Path,
    finder: &ImageFinder,
    downloader: &Downloader,
    recipe_delay: Duration,
) -> std::io::Result<BatchReport> {
    let pages = discover_recipes(site_root)?;
    tracing::info!(recipes = pages.len(), "Starting image batch");

    let mut used = UsedUrls::new();
    let mut report = BatchReport::default();
    let total = pages.len();

    for (i, page) in pages.iter().enumerate() {
        let meta = &page.meta;
        tracing::info!(
            "[{}/{}] {} ({})",
            i + 1,
            total,
            meta.title,
            meta.category
        );

        let image = match find_and_download(meta, site_root, finder, downloader, &mut used).await {
            Ok(Some(descriptor)) => {
                if let Err(e) = update_page(&page.path, &descriptor.relative_path) {
                    tracing::warn!(page = %page.path.display(), error = %e, "Could not update page");
                }
                Some(descriptor.home_relative_path)
            }
            Ok(None) => {
                tracing::warn!(recipe = %meta.title, "No image found, skipped");
                None
            }
            Err(e) => {
                tracing::error!(recipe = %meta.title, error = %e, "Image download failed");
                None
            }
        };

        report.entries.push(BatchEntry {
            title: meta.title.clone(),
            category: meta.category.clone(),
            image,
        });

        if i + 1 < total && !recipe_delay.is_zero() {
            tokio::time::sleep(recipe_delay).await;
        }
    }

    tracing::info!(
        succeeded = report.succeeded(),
        failed = report.failed(),
        "Image batch finished"
    );
    Ok(report)
}

fn update_page(path: &Path, image_path: &str) -> std::io::Result<()> {
    let html = std::fs::read_to_string(path)?;
    let updated = patch_image_paths(&html, image_path);
    if updated != html {
        std::fs::write(path, updated)?;
        tracing::info!(page = %path.display(), "Page updated with new image path");
    }
    Ok(())
}
