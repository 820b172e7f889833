//! Configuration module for pixelgrid
//!
//! Provides types and parsing for `pxg.toml` engine configuration.

pub mod loader;
pub mod schema;

pub use loader::{load_config, merge_cli_overrides, CliOverrides, ConfigError};
pub use schema::*;
