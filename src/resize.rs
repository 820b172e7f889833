//! Grid resizing
//!
//! By default a resize re-runs the downsampler on the original source image,
//! so cells edited by hand since the last resize only survive in the undo
//! entry recorded beforehand. [`ResizeMode::Grid`] instead resamples the
//! current cells and keeps the edits.

use serde::{Deserialize, Serialize};

use crate::downsample::{downsample, grid_dimensions, resample, Sampling, SourceImage};
use crate::error::{EngineError, Result};
use crate::grid::Grid;
use crate::history::History;

/// Largest accepted grid edge, in cells
pub const MAX_GRID_SIZE: u32 = 1024;

/// What a resize resamples from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ResizeMode {
    /// Re-downsample the original source image
    #[default]
    Source,
    /// Nearest-neighbor resample of the current grid
    Grid,
}

impl ResizeMode {
    pub fn from_str(s: &str) -> Option<ResizeMode> {
        match s.to_lowercase().as_str() {
            "source" => Some(ResizeMode::Source),
            "grid" => Some(ResizeMode::Grid),
            _ => None,
        }
    }
}

/// A user resize request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResizeRequest {
    /// Explicit width and height; the longer one becomes the target size
    Dimensions { width: u32, height: u32 },
    /// Length of the longer edge
    TargetSize(u32),
}

impl ResizeRequest {
    /// The longer-edge size this request resolves to, validated.
    pub fn target_size(&self) -> Result<u32> {
        let target = match *self {
            ResizeRequest::Dimensions { width, height } => {
                if width == 0 || height == 0 {
                    return Err(EngineError::invalid(format!(
                        "grid dimensions must be positive (got {}x{})",
                        width, height
                    )));
                }
                width.max(height)
            }
            ResizeRequest::TargetSize(size) => size,
        };
        check_size(target)?;
        Ok(target)
    }
}

fn check_size(size: u32) -> Result<()> {
    if size == 0 {
        return Err(EngineError::invalid("grid size must be positive"));
    }
    if size > MAX_GRID_SIZE {
        return Err(EngineError::invalid(format!(
            "grid size {} exceeds maximum of {}",
            size, MAX_GRID_SIZE
        )));
    }
    Ok(())
}

/// Parse a grid size typed into a text field.
///
/// Accepts a trimmed positive integer up to [`MAX_GRID_SIZE`].
pub fn parse_dimension(text: &str) -> Result<u32> {
    let text = text.trim();
    let value: u32 = text
        .parse()
        .map_err(|_| EngineError::invalid(format!("'{}' is not a whole number", text)))?;
    check_size(value)?;
    Ok(value)
}

/// Which edge the user just edited in a locked-aspect width/height pair
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Edge {
    Width,
    Height,
}

/// Derive the other edge from an edited one so `width / height` stays at
/// `aspect_ratio`. Never returns less than 1.
///
/// ```
/// use pixelgrid::resize::{linked_dimension, Edge};
///
/// assert_eq!(linked_dimension(64, 2.0, Edge::Width), 32);
/// assert_eq!(linked_dimension(10, 2.0, Edge::Height), 20);
/// ```
pub fn linked_dimension(value: u32, aspect_ratio: f64, edited: Edge) -> u32 {
    let value = value as f64;
    let other = match edited {
        Edge::Width => value / aspect_ratio,
        Edge::Height => value * aspect_ratio,
    };
    if other.is_finite() {
        (other.round() as u32).max(1)
    } else {
        1
    }
}

/// Resize the live grid as one undoable action.
///
/// The request is validated first; on error nothing is recorded or changed.
/// The grid's background color carries over.
pub fn resize_grid(
    grid: &mut Grid,
    history: &mut History,
    source: &SourceImage,
    request: ResizeRequest,
    mode: ResizeMode,
    sampling: Sampling,
) -> Result<()> {
    let resized = resized_grid(grid, source, request, mode, sampling)
        .inspect_err(|e| log::warn!("rejected resize {:?}: {}", request, e))?;

    history.push_undo(grid.snapshot());
    grid.replace_cells(resized);
    log::info!(
        "resized grid to {}x{} (aspect {:.3}, {:?})",
        grid.width(),
        grid.height(),
        grid.aspect_ratio(),
        mode
    );
    Ok(())
}

/// Compute the resized cells without touching the grid or history.
pub fn resized_grid(
    grid: &Grid,
    source: &SourceImage,
    request: ResizeRequest,
    mode: ResizeMode,
    sampling: Sampling,
) -> Result<Grid> {
    let target = request.target_size()?;
    match mode {
        ResizeMode::Source => downsample(source, target, sampling),
        ResizeMode::Grid => {
            let (width, height) = grid_dimensions(grid.width(), grid.height(), target)?;
            let image = resample(&grid.to_image(), width, height, Sampling::Nearest);
            Grid::from_image(&image)
        }
    }
}
