//! Configuration schema types for `pxg.toml`
//!
//! Defines the structure and validation rules for engine options. Colors are
//! stored as strings and parsed with [`crate::color::parse_color`].

use serde::{Deserialize, Serialize};

use crate::color::{parse_color, to_hex, STEEL_BLUE};
use crate::downsample::Sampling;
use crate::export::{ExportFormat, ExportOptions, MAX_EXPORT_SCALE};
use crate::filters::{DEFAULT_SATURATE_AMOUNT, DEFAULT_TINT_STRENGTH};
use crate::resize::{ResizeMode, MAX_GRID_SIZE};
use crate::session::{EngineOptions, DEFAULT_TARGET_SIZE};

/// Grid generation settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GridConfig {
    /// Cells along the longer edge
    #[serde(default = "default_target_size")]
    pub target_size: u32,
    #[serde(default)]
    pub sampling: Sampling,
    #[serde(default)]
    pub resize_mode: ResizeMode,
    /// Maximum undo depth (0 = unbounded)
    #[serde(default)]
    pub history_limit: usize,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            target_size: default_target_size(),
            sampling: Sampling::default(),
            resize_mode: ResizeMode::default(),
            history_limit: 0,
        }
    }
}

fn default_target_size() -> u32 {
    DEFAULT_TARGET_SIZE
}

/// Paint tool settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaintConfig {
    /// Brush color
    #[serde(default = "default_paint_color")]
    pub color: String,
    /// Uniform background; omitted means transparent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub background: Option<String>,
}

impl Default for PaintConfig {
    fn default() -> Self {
        Self { color: default_paint_color(), background: None }
    }
}

fn default_paint_color() -> String {
    "#000000".to_string()
}

/// Filter parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FiltersConfig {
    #[serde(default = "default_tint_color")]
    pub tint_color: String,
    #[serde(default = "default_tint_strength")]
    pub tint_strength: f64,
    #[serde(default = "default_saturate_amount")]
    pub saturate_amount: f64,
}

impl Default for FiltersConfig {
    fn default() -> Self {
        Self {
            tint_color: default_tint_color(),
            tint_strength: default_tint_strength(),
            saturate_amount: default_saturate_amount(),
        }
    }
}

fn default_tint_color() -> String {
    to_hex(STEEL_BLUE)
}

fn default_tint_strength() -> f64 {
    DEFAULT_TINT_STRENGTH
}

fn default_saturate_amount() -> f64 {
    DEFAULT_SATURATE_AMOUNT
}

/// Export settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportConfig {
    #[serde(default)]
    pub format: ExportFormat,
    #[serde(default = "default_scale")]
    pub scale: u32,
    #[serde(default = "default_jpeg_quality")]
    pub jpeg_quality: u8,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            format: ExportFormat::default(),
            scale: default_scale(),
            jpeg_quality: default_jpeg_quality(),
        }
    }
}

fn default_scale() -> u32 {
    1
}

fn default_jpeg_quality() -> u8 {
    90
}

/// Complete `pxg.toml` configuration
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct PxgConfig {
    #[serde(default)]
    pub grid: GridConfig,
    #[serde(default)]
    pub paint: PaintConfig,
    #[serde(default)]
    pub filters: FiltersConfig,
    #[serde(default)]
    pub export: ExportConfig,
}

/// Configuration validation error
#[derive(Debug, Clone)]
pub struct ConfigValidationError {
    /// Path to the invalid field (e.g., "filters.tint_strength")
    pub field: String,
    /// Error message
    pub message: String,
}

impl std::fmt::Display for ConfigValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "pxg.toml: '{}' {}", self.field, self.message)
    }
}

impl PxgConfig {
    /// Validate the configuration and return any errors
    pub fn validate(&self) -> Vec<ConfigValidationError> {
        let mut errors = Vec::new();
        let mut push = |field: &str, message: String| {
            errors.push(ConfigValidationError { field: field.to_string(), message });
        };

        if self.grid.target_size == 0 || self.grid.target_size > MAX_GRID_SIZE {
            push("grid.target_size", format!("must be between 1 and {}", MAX_GRID_SIZE));
        }

        if let Err(e) = parse_color(&self.paint.color) {
            push("paint.color", e.to_string());
        }
        if let Some(Err(e)) = self.paint.background.as_deref().map(parse_color) {
            push("paint.background", e.to_string());
        }
        if let Err(e) = parse_color(&self.filters.tint_color) {
            push("filters.tint_color", e.to_string());
        }

        if !(0.0..=1.0).contains(&self.filters.tint_strength) {
            push("filters.tint_strength", "must be between 0.0 and 1.0".to_string());
        }
        if !(0.0..=1.0).contains(&self.filters.saturate_amount) {
            push("filters.saturate_amount", "must be between 0.0 and 1.0".to_string());
        }

        if self.export.scale == 0 || self.export.scale > MAX_EXPORT_SCALE {
            push("export.scale", format!("must be between 1 and {}", MAX_EXPORT_SCALE));
        }
        if self.export.jpeg_quality == 0 || self.export.jpeg_quality > 100 {
            push("export.jpeg_quality", "must be between 1 and 100".to_string());
        }

        errors
    }

    /// Convert to engine options. Call after [`PxgConfig::validate`] passes;
    /// unparseable colors fall back to their defaults.
    pub fn engine_options(&self) -> EngineOptions {
        let defaults = EngineOptions::default();
        EngineOptions {
            target_size: self.grid.target_size,
            sampling: self.grid.sampling,
            resize_mode: self.grid.resize_mode,
            history_limit: self.grid.history_limit,
            paint_color: parse_color(&self.paint.color).unwrap_or(defaults.paint_color),
            background: self.paint.background.as_deref().and_then(|c| parse_color(c).ok()),
            tint_color: parse_color(&self.filters.tint_color).unwrap_or(defaults.tint_color),
            tint_strength: self.filters.tint_strength,
            saturate_amount: self.filters.saturate_amount,
            export: ExportOptions {
                format: self.export.format,
                scale: self.export.scale,
                jpeg_quality: self.export.jpeg_quality,
            },
        }
    }
}
