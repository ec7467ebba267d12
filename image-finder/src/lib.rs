//! Image Finder Library
//!
//! Finds a stock photo for a recipe page. Provider adapters (Pexels,
//! Unsplash, Pixabay, Wikimedia Commons) are queried in a fixed cascade,
//! candidates are scored for relevance, and the winner is downloaded into
//! the site's image tree.
//!
//! # Usage as Library
//!
//! ```rust,ignore
//! use image_finder::{default_providers, CascadeSettings, Config, ImageFinder, UsedUrls};
//!
//! let config = Config::load(None)?;
//! let finder = ImageFinder::new(
//!     default_providers(&config.providers),
//!     CascadeSettings::from(&config.search),
//! );
//! let mut used = UsedUrls::new();
//! let best = finder.find("Rigatoni alla Norma", "Pasta", &[], &mut used).await;
//! ```
//!
//! # Configuration
//! Set `PEXELS_API_KEY`, `UNSPLASH_ACCESS_KEY` and `PIXABAY_API_KEY`, or
//! tune behaviour in `~/.config/ricettario/images.toml`. Wikimedia Commons
//! needs no key.

pub mod batch;
pub mod cascade;
pub mod config;
pub mod download;
pub mod error;
pub mod providers;
pub mod queries;
pub mod resolve;
pub mod scoring;
pub mod types;

pub use cascade::{CascadeSettings, ImageFinder};
pub use config::Config;
pub use download::{Downloader, FetchBytes, ReqwestFetcher, RetryPolicy};
pub use error::{ConfigError, DownloadError, FetchError, ProviderError, RecipeError};
pub use providers::{build_client, default_providers, ImageProvider};
pub use resolve::find_and_download;
pub use types::{ImageCandidate, ImageDescriptor, ProviderKind, RecipeMeta, UsedUrls};
