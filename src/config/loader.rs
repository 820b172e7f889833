//! Configuration loading and discovery for `pxg.toml`
//!
//! Provides functions to find, load, and merge configuration.

use super::schema::PxgConfig;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Config file name searched for in the working directory and its parents
pub const CONFIG_FILE_NAME: &str = "pxg.toml";

/// Configuration loading error
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ConfigError {
    /// File I/O error
    #[error("Failed to read config: {0}")]
    Io(#[from] std::io::Error),
    /// TOML parsing error
    #[error("Failed to parse pxg.toml: {0}")]
    Parse(#[from] toml::de::Error),
    /// Validation error
    #[error(
        "Config validation failed:\n{}",
        .0.iter().map(|e| format!("  - {}", e)).collect::<Vec<_>>().join("\n")
    )]
    Validation(Vec<String>),
}

/// CLI arguments that can override config values
#[derive(Debug, Default, Clone)]
pub struct CliOverrides {
    /// Override grid target size
    pub target_size: Option<u32>,
    /// Override sampling ("area" or "nearest")
    pub sampling: Option<crate::downsample::Sampling>,
    /// Override background color string
    pub background: Option<String>,
    /// Override paint color string
    pub paint_color: Option<String>,
    /// Override export format
    pub format: Option<crate::export::ExportFormat>,
    /// Override export scale
    pub scale: Option<u32>,
}

/// Find pxg.toml by walking up from the current working directory.
///
/// Search order:
/// 1. Walk up from current directory looking for pxg.toml
/// 2. Check XDG_CONFIG_HOME/pixelgrid/pxg.toml (or ~/.config/pixelgrid/pxg.toml)
pub fn find_config() -> Option<PathBuf> {
    if let Ok(cwd) = env::current_dir() {
        if let Some(path) = find_config_from(cwd) {
            return Some(path);
        }
    }

    find_xdg_config()
}

/// Find pxg.toml in the XDG config directory.
pub fn find_xdg_config() -> Option<PathBuf> {
    let xdg_config = env::var("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .or_else(|_| env::var("HOME").map(|h| PathBuf::from(h).join(".config")))
        .ok()?;

    let config_path = xdg_config.join("pixelgrid").join(CONFIG_FILE_NAME);
    config_path.exists().then_some(config_path)
}

/// Find pxg.toml by walking up from a specific directory.
pub fn find_config_from(start: PathBuf) -> Option<PathBuf> {
    let mut current = start;

    loop {
        let config_path = current.join(CONFIG_FILE_NAME);
        if config_path.exists() {
            return Some(config_path);
        }

        if !current.pop() {
            return None;
        }
    }
}

/// Load configuration from a pxg.toml file.
///
/// If a path is provided, loads from that file. Otherwise, uses `find_config()`
/// to locate the config file. If no config file is found, returns the default
/// configuration.
///
/// # Example
/// ```ignore
/// let config = load_config(None)?;
/// let config = load_config(Some(Path::new("art/pxg.toml")))?;
/// ```
pub fn load_config(path: Option<&Path>) -> Result<PxgConfig, ConfigError> {
    let config_path = match path {
        Some(p) => Some(p.to_path_buf()),
        None => find_config(),
    };

    match config_path {
        Some(p) => load_config_file(&p),
        None => Ok(PxgConfig::default()),
    }
}

/// Load configuration from a specific file path.
fn load_config_file(path: &Path) -> Result<PxgConfig, ConfigError> {
    let contents = fs::read_to_string(path)?;
    let config: PxgConfig = toml::from_str(&contents)?;
    check(&config)?;
    log::debug!("loaded config from {}", path.display());
    Ok(config)
}

fn check(config: &PxgConfig) -> Result<(), ConfigError> {
    let errors = config.validate();
    if !errors.is_empty() {
        return Err(ConfigError::Validation(errors.into_iter().map(|e| e.to_string()).collect()));
    }
    Ok(())
}

/// Merge CLI overrides into a configuration and re-validate it.
///
/// CLI arguments take precedence over config file values.
pub fn merge_cli_overrides(
    config: &mut PxgConfig,
    overrides: &CliOverrides,
) -> Result<(), ConfigError> {
    if let Some(size) = overrides.target_size {
        config.grid.target_size = size;
    }
    if let Some(sampling) = overrides.sampling {
        config.grid.sampling = sampling;
    }
    if let Some(ref background) = overrides.background {
        config.paint.background = Some(background.clone());
    }
    if let Some(ref color) = overrides.paint_color {
        config.paint.color = color.clone();
    }
    if let Some(format) = overrides.format {
        config.export.format = format;
    }
    if let Some(scale) = overrides.scale {
        config.export.scale = scale;
    }
    check(config)
}
