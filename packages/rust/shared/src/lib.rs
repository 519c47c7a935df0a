//! Shared types, error model, and configuration for primerbook.
//!
//! This crate is the foundation depended on by all other primerbook crates.
//! It provides:
//! - [`PrimerBookError`]: the unified error type
//! - Domain types ([`Chapter`])
//! - Configuration ([`AppConfig`], [`BuildConfig`], config loading)

pub mod config;
pub mod error;
pub mod types;

// Re-export public API at crate root for ergonomic imports.
pub use config::{
    AppConfig, BookConfig, BuildConfig, OutputConfig, config_file_path, init_config, load_config,
    load_config_from,
};
pub use error::{PrimerBookError, Result};
pub use types::{Chapter, is_chapter_file};
