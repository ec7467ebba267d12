//! Ricettario Common - Shared utilities for the Ricettario toolkit
//!
//! This crate provides functionality shared by the toolkit binaries:
//!
//! - **Initialization**: [`init_tracing`] for standardized logging to stderr
//! - **LLM output**: [`parse_llm_json`] for tolerant parsing of model replies
//!
//! # Example
//!
//! ```rust,ignore
//! use ricettario_common::{init_tracing, parse_llm_json, Verbosity};
//!
//! init_tracing("image_finder", Verbosity::Normal)?;
//! let value = parse_llm_json("```json\n{\"title\": \"Pane\",}\n```")?;
//! ```

pub mod init;
pub mod llm_json;

// Re-export commonly used items at crate root
pub use init::{init_tracing, Verbosity};
pub use llm_json::{parse_llm_json, ParseError};
