//! Recipe-level flow: search, download, describe
//!
//! Files always land at
//! `<site_root>/public/images/ricette/<category folder>/<slug>.jpg`; the
//! extension is forced to `.jpg` so existing page templates keep working.

use std::path::{Path, PathBuf};

use crate::cascade::ImageFinder;
use crate::download::Downloader;
use crate::error::DownloadError;
use crate::types::{ImageCandidate, ImageDescriptor, RecipeMeta, UsedUrls};

/// A single path component: no separators, no `.` or `..`
fn check_component(field: &'static str, value: &str) -> Result<(), DownloadError> {
    let unsafe_name = value.is_empty()
        || value == "."
        || value == ".."
        || value.contains(['/', '\\', '\0']);
    if unsafe_name {
        return Err(DownloadError::UnsafeName {
            field,
            value: value.to_string(),
        });
    }
    Ok(())
}

const IMAGE_EXTENSION: &str = "jpg";
const DEFAULT_FOLDER: &str = "pane";

/// Site subfolder for a recipe category
pub fn category_folder(category: &str) -> String {
    match category.trim() {
        "" => DEFAULT_FOLDER.to_string(),
        "Pane" | "Focaccia" => "pane".to_string(),
        "Pizza" => "pizza".to_string(),
        "Pasta" => "pasta".to_string(),
        "Lievitati" => "lievitati".to_string(),
        other => other.to_lowercase(),
    }
}

/// The recipe slug, or one derived from the title
pub fn recipe_slug(recipe: &RecipeMeta) -> String {
    let slug = recipe.slug.trim();
    if !slug.is_empty() {
        return slug.to_string();
    }
    recipe
        .title
        .to_lowercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("-")
}

/// Credit line shown under the photo
pub fn build_attribution(image: &ImageCandidate) -> String {
    let author = if image.author.trim().is_empty() {
        image.provider.as_str()
    } else {
        image.author.as_str()
    };
    format!(
        "📷 Foto: {} — {} via {}",
        author, image.license, image.provider
    )
}

/// Where an image for this recipe is stored
pub struct ImagePaths {
    pub local: PathBuf,
    /// Relative to a recipe page two levels deep
    pub relative: String,
    /// Relative to the site root
    pub home_relative: String,
}

impl ImagePaths {
    /// Fails when the category or slug would escape the image folder.
    pub fn for_recipe(site_root: &Path, recipe: &RecipeMeta) -> Result<Self, DownloadError> {
        let folder = category_folder(&recipe.category);
        let slug = recipe_slug(recipe);
        check_component("category", &folder)?;
        check_component("slug", &slug)?;

        let file = format!("{}.{}", slug, IMAGE_EXTENSION);
        let home_relative = format!("images/ricette/{}/{}", folder, file);

        Ok(Self {
            local: site_root
                .join("public")
                .join("images")
                .join("ricette")
                .join(&folder)
                .join(&file),
            relative: format!("../../{}", home_relative),
            home_relative,
        })
    }
}

/// Search for a recipe image and download the winner.
///
/// `Ok(None)` means no provider had a usable image. A download failure is
/// returned as an error; the image URL stays marked as used either way.
/// An unsafe category or slug is rejected before any search.
pub async fn find_and_download(
    recipe: &RecipeMeta,
    site_root: &Path,
    finder: &ImageFinder,
    downloader: &Downloader,
    used: &mut UsedUrls,
) -> Result<Option<ImageDescriptor>, DownloadError> {
    let paths = ImagePaths::for_recipe(site_root, recipe)?;

    let Some(image) = finder
        .find(&recipe.title, &recipe.category, &recipe.image_keywords, used)
        .await
    else {
        return Ok(None);
    };

    downloader.download(&image.url, &paths.local).await?;

    Ok(Some(ImageDescriptor {
        local_path: paths.local.display().to_string(),
        relative_path: paths.relative,
        home_relative_path: paths.home_relative,
        attribution: build_attribution(&image),
        url: image.url,
        thumb_url: image.thumb_url,
        license: image.license,
        author: image.author,
        provider: image.provider,
        width: image.width,
        height: image.height,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ProviderKind;

    fn recipe(title: &str, category: &str, slug: &str) -> RecipeMeta {
        RecipeMeta {
            title: title.to_string(),
            category: category.to_string(),
            slug: slug.to_string(),
            image_keywords: Vec::new(),
        }
    }

    #[test]
    fn test_category_folders() {
        assert_eq!(category_folder("Pane"), "pane");
        assert_eq!(category_folder("Focaccia"), "pane");
        assert_eq!(category_folder("Pizza"), "pizza");
        assert_eq!(category_folder("Pasta"), "pasta");
        assert_eq!(category_folder("Lievitati"), "lievitati");
        assert_eq!(category_folder("Dolci"), "dolci");
        assert_eq!(category_folder(""), "pane");
    }

    #[test]
    fn test_slug_fallback() {
        assert_eq!(recipe_slug(&recipe("Pane  di Altamura", "", "")), "pane-di-altamura");
        assert_eq!(recipe_slug(&recipe("Pane", "", "pane-altamura")), "pane-altamura");
    }

    #[test]
    fn test_paths() {
        let paths = ImagePaths::for_recipe(
            Path::new("/site"),
            &recipe("Rigatoni alla Norma", "Pasta", "rigatoni-norma"),
        )
        .unwrap();
        assert_eq!(
            paths.local,
            PathBuf::from("/site/public/images/ricette/pasta/rigatoni-norma.jpg")
        );
        assert_eq!(paths.home_relative, "images/ricette/pasta/rigatoni-norma.jpg");
        assert_eq!(paths.relative, "../../images/ricette/pasta/rigatoni-norma.jpg");
    }

    #[test]
    fn test_unsafe_names_rejected() {
        let root = Path::new("/site");
        for (category, slug) in [
            ("Pasta", "../../x"),
            ("Pasta", ".."),
            ("Pasta", "a\\b"),
            ("../etc", "pane"),
            ("..", "pane"),
        ] {
            let err = ImagePaths::for_recipe(root, &recipe("Pane", category, slug)).err();
            assert!(
                matches!(err, Some(DownloadError::UnsafeName { .. })),
                "{category}/{slug} should be rejected"
            );
        }

        // A title with a slash cannot sneak in through the slug fallback
        assert!(ImagePaths::for_recipe(root, &recipe("Pane 1/2 kg", "Pane", "")).is_err());
        assert!(ImagePaths::for_recipe(root, &recipe("Pane", "Pane", "pane..doppio")).is_ok());
    }

    #[test]
    fn test_attribution() {
        let mut image = ImageCandidate {
            title: String::new(),
            description: String::new(),
            url: String::new(),
            thumb_url: String::new(),
            width: 0,
            height: 0,
            license: "Pexels License".into(),
            author: "Anna Rossi".into(),
            author_url: String::new(),
            provider: ProviderKind::Pexels,
            score: 0,
        };
        assert_eq!(
            build_attribution(&image),
            "📷 Foto: Anna Rossi — Pexels License via Pexels"
        );

        image.author.clear();
        assert_eq!(
            build_attribution(&image),
            "📷 Foto: Pexels — Pexels License via Pexels"
        );
    }
}
