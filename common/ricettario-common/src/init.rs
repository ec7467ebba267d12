//! Logging initialization
//!
//! Provides standardized tracing setup for the toolkit binaries.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// How chatty the CLI should be
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Verbosity {
    /// Only warnings and errors (`--quiet`)
    Quiet,
    /// Info and above
    #[default]
    Normal,
    /// Debug and above (`--verbose`)
    Verbose,
}

impl Verbosity {
    /// Build from the `--verbose` / `--quiet` flags. Verbose wins if both are set.
    pub fn from_flags(verbose: bool, quiet: bool) -> Self {
        match (verbose, quiet) {
            (true, _) => Verbosity::Verbose,
            (false, true) => Verbosity::Quiet,
            (false, false) => Verbosity::Normal,
        }
    }

    fn level(self) -> &'static str {
        match self {
            Verbosity::Quiet => "warn",
            Verbosity::Normal => "info",
            Verbosity::Verbose => "debug",
        }
    }
}

/// Initialize tracing/logging
///
/// Sets up logging to stderr (stdout is reserved for command output) with:
/// - Environment-based filtering via RUST_LOG
/// - A default level for the specified crate taken from `verbosity`
///
/// Set `LOG_FORMAT=json` for structured JSON output.
/// Default is human-readable text output.
///
/// # Example
///
/// ```rust,ignore
/// ricettario_common::init_tracing("image_finder", Verbosity::Normal)?;
/// ```
pub fn init_tracing(crate_name: &str, verbosity: Verbosity) -> anyhow::Result<()> {
    let directive = format!("{}={}", crate_name, verbosity.level());
    let filter = EnvFilter::from_default_env().add_directive(directive.parse()?);

    let use_json = std::env::var("LOG_FORMAT")
        .map(|v| v.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    let registry = tracing_subscriber::registry().with(filter);

    if use_json {
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_writer(std::io::stderr),
            )
            .init();
    } else {
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .with_writer(std::io::stderr)
                    .with_target(false),
            )
            .init();
    }

    Ok(())
}
