//! Ricettario image tool
//!
//! `find` resolves one recipe and prints its image descriptor as JSON.
//! `batch` refreshes the photo of every recipe page under the site root.
//!
//! # Configuration
//! Provider keys come from `PEXELS_API_KEY`, `UNSPLASH_ACCESS_KEY` and
//! `PIXABAY_API_KEY`. Tunables live in `~/.config/ricettario/images.toml`.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::time::Duration;

use image_finder::batch::{discover_recipes, run_batch};
use image_finder::resolve::ImagePaths;
use image_finder::{
    build_client, default_providers, find_and_download, CascadeSettings, Config, Downloader,
    ImageFinder, RecipeMeta, ReqwestFetcher, RetryPolicy, UsedUrls,
};
use ricettario_common::{init_tracing, Verbosity};

#[derive(Parser)]
#[command(name = "ricettario-images")]
#[command(about = "Find and download stock photos for Ricettario recipes")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Root of the Ricettario site
    #[arg(long, global = true, env = "RICETTARIO_PATH", default_value = "../Ricettario")]
    site_root: PathBuf,

    /// Config file (defaults to ~/.config/ricettario/images.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Only warnings and errors
    #[arg(short, long, global = true)]
    quiet: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Find and download an image for a single recipe
    Find {
        /// Recipe title
        #[arg(long, required_unless_present = "recipe")]
        title: Option<String>,
        /// Recipe category (Pane, Pizza, Pasta, ...)
        #[arg(long, default_value = "")]
        category: String,
        /// File slug, derived from the title when omitted
        #[arg(long, default_value = "")]
        slug: String,
        /// Extra search keyword (repeatable)
        #[arg(long = "keyword")]
        keywords: Vec<String>,
        /// Recipe JSON as produced by the generator, fences and all
        #[arg(long, conflicts_with = "title")]
        recipe: Option<PathBuf>,
    },
    /// Refresh images for every recipe page on the site
    Batch {
        /// List recipes and target paths without searching or downloading
        #[arg(long)]
        dry_run: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing("image_finder", Verbosity::from_flags(cli.verbose, cli.quiet))?;

    let config = Config::load(cli.config.as_deref())?;

    match cli.command {
        Commands::Find {
            title,
            category,
            slug,
            keywords,
            recipe,
        } => {
            let recipe = match recipe {
                Some(path) => read_recipe(&path)?,
                None => RecipeMeta {
                    title: title.unwrap_or_default(),
                    category,
                    slug,
                    image_keywords: keywords,
                },
            };
            run_find(&config, &cli.site_root, &recipe).await?;
        }
        Commands::Batch { dry_run: true } => {
            run_dry_batch(&cli.site_root)?;
        }
        Commands::Batch { dry_run: false } => {
            let (finder, downloader) = build_engine(&config);
            let delay = Duration::from_millis(config.batch.recipe_delay_ms);
            let report = run_batch(&cli.site_root, &finder, &downloader, delay)
                .await
                .with_context(|| format!("Cannot scan recipes in {}", cli.site_root.display()))?;

            println!();
            println!("Images saved: {}/{}", report.succeeded(), report.entries.len());
            for entry in report.entries.iter().filter(|e| e.image.is_none()) {
                println!("  missing: {} ({})", entry.title, entry.category);
            }
        }
    }

    Ok(())
}

fn build_engine(config: &Config) -> (ImageFinder, Downloader) {
    let finder = ImageFinder::new(
        default_providers(&config.providers),
        CascadeSettings::from(&config.search),
    );
    let downloader = Downloader::new(
        Box::new(ReqwestFetcher::new(build_client(&config.providers))),
        RetryPolicy::from(&config.download),
    );
    (finder, downloader)
}

fn read_recipe(path: &Path) -> Result<RecipeMeta> {
    let reply = std::fs::read_to_string(path)
        .with_context(|| format!("Cannot read recipe file {}", path.display()))?;
    RecipeMeta::from_llm_reply(&reply)
        .with_context(|| format!("Cannot parse recipe file {}", path.display()))
}

async fn run_find(config: &Config, site_root: &Path, recipe: &RecipeMeta) -> Result<()> {
    let (finder, downloader) = build_engine(config);
    let mut used = UsedUrls::new();

    match find_and_download(recipe, site_root, &finder, &downloader, &mut used).await? {
        Some(descriptor) => {
            println!("{}", serde_json::to_string_pretty(&descriptor)?);
        }
        None => {
            tracing::warn!(recipe = %recipe.title, "No image found");
        }
    }
    Ok(())
}

fn run_dry_batch(site_root: &Path) -> Result<()> {
    let pages = discover_recipes(site_root)
        .with_context(|| format!("Cannot scan recipes in {}", site_root.display()))?;

    for page in &pages {
        match ImagePaths::for_recipe(site_root, &page.meta) {
            Ok(paths) => println!(
                "{} ({}) -> {}",
                page.meta.title, page.meta.category, paths.home_relative
            ),
            Err(e) => println!("{} ({}) -> skipped: {}", page.meta.title, page.meta.category, e),
        }
    }
    println!();
    println!("{} recipes found", pages.len());
    Ok(())
}
