//! Source image downsampling into a pixel grid
//!
//! The longer edge of the source maps to `target_size` cells and the shorter
//! edge follows the aspect ratio, never dropping below one cell.

use image::imageops::FilterType;
use image::{Rgba, RgbaImage};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::error::{EngineError, Result};
use crate::grid::Grid;

/// A decoded source image, immutable once loaded.
#[derive(Debug, Clone, PartialEq)]
pub struct SourceImage {
    image: RgbaImage,
}

impl SourceImage {
    /// Wrap a raw RGBA8 buffer of `width * height * 4` bytes.
    pub fn from_rgba(width: u32, height: u32, rgba: Vec<u8>) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(EngineError::invalid(format!(
                "source image must not be empty (got {}x{})",
                width, height
            )));
        }
        let expected = width as usize * height as usize * 4;
        if rgba.len() != expected {
            return Err(EngineError::invalid(format!(
                "RGBA buffer has {} bytes, expected {} for {}x{}",
                rgba.len(),
                expected,
                width,
                height
            )));
        }
        let image = RgbaImage::from_raw(width, height, rgba)
            .ok_or_else(|| EngineError::invalid("RGBA buffer size mismatch"))?;
        Ok(Self { image })
    }

    /// Wrap an already decoded image.
    pub fn from_image(image: RgbaImage) -> Result<Self> {
        if image.width() == 0 || image.height() == 0 {
            return Err(EngineError::invalid("source image must not be empty"));
        }
        Ok(Self { image })
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    /// Width divided by height.
    pub fn aspect_ratio(&self) -> f64 {
        self.width() as f64 / self.height() as f64
    }

    pub fn as_image(&self) -> &RgbaImage {
        &self.image
    }
}

/// Resampling strategy used when reducing the source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Sampling {
    /// Point sample nearest the cell center
    Nearest,
    /// Alpha-weighted box average over the covered source pixels
    #[default]
    Area,
}

impl Sampling {
    /// Parse a sampling name
    pub fn from_str(s: &str) -> Option<Sampling> {
        match s.to_lowercase().as_str() {
            "nearest" | "point" => Some(Sampling::Nearest),
            "area" | "box" | "average" => Some(Sampling::Area),
            _ => None,
        }
    }
}

/// Compute grid dimensions for a `src_width x src_height` image whose longer
/// edge should span `target_size` cells.
///
/// # Examples
///
/// ```
/// use pixelgrid::downsample::grid_dimensions;
///
/// assert_eq!(grid_dimensions(100, 50, 32).unwrap(), (32, 16));
/// assert_eq!(grid_dimensions(50, 100, 32).unwrap(), (16, 32));
/// assert_eq!(grid_dimensions(10_000, 1, 8).unwrap(), (8, 1));
/// ```
pub fn grid_dimensions(src_width: u32, src_height: u32, target_size: u32) -> Result<(u32, u32)> {
    if target_size < 1 {
        return Err(EngineError::invalid("target size must be at least 1"));
    }
    if src_width == 0 || src_height == 0 {
        return Err(EngineError::invalid("source dimensions must be positive"));
    }

    let aspect = src_width as f64 / src_height as f64;
    let target = target_size as f64;
    let dims = if aspect >= 1.0 {
        (target_size, ((target / aspect).round() as u32).max(1))
    } else {
        (((target * aspect).round() as u32).max(1), target_size)
    };
    Ok(dims)
}

/// Reduce `source` to a grid whose longer edge is `target_size` cells.
///
/// The returned grid has no background color.
pub fn downsample(source: &SourceImage, target_size: u32, sampling: Sampling) -> Result<Grid> {
    let (width, height) = grid_dimensions(source.width(), source.height(), target_size)?;
    let image = resample(source.as_image(), width, height, sampling);
    log::debug!(
        "downsampled {}x{} source to {}x{} grid ({:?})",
        source.width(),
        source.height(),
        width,
        height,
        sampling
    );
    Grid::from_image(&image)
}

/// Resample an image to exactly `width x height` pixels.
pub(crate) fn resample(
    image: &RgbaImage,
    width: u32,
    height: u32,
    sampling: Sampling,
) -> RgbaImage {
    match sampling {
        Sampling::Nearest => image::imageops::resize(image, width, height, FilterType::Nearest),
        Sampling::Area => area_resample(image, width, height),
    }
}

fn area_resample(image: &RgbaImage, width: u32, height: u32) -> RgbaImage {
    let (src_w, src_h) = image.dimensions();
    let mut out = vec![0u8; width as usize * height as usize * 4];

    out.par_chunks_mut(width as usize * 4).enumerate().for_each(|(gy, row)| {
        let (y0, y1) = span(gy as u64, height as u64, src_h as u64);
        for gx in 0..width as usize {
            let (x0, x1) = span(gx as u64, width as u64, src_w as u64);
            let Rgba(px) = average(image, x0, x1, y0, y1);
            row[gx * 4..gx * 4 + 4].copy_from_slice(&px);
        }
    });

    RgbaImage::from_raw(width, height, out).unwrap_or_else(|| RgbaImage::new(width, height))
}

/// Source pixel range `[start, end)` covered by cell `index` of `cells`.
/// Always covers at least one pixel so upsampling still samples something.
fn span(index: u64, cells: u64, src_len: u64) -> (u32, u32) {
    let start = index * src_len / cells;
    let end = ((index + 1) * src_len).div_ceil(cells).clamp(start + 1, src_len);
    (start as u32, end as u32)
}

fn average(image: &RgbaImage, x0: u32, x1: u32, y0: u32, y1: u32) -> Rgba<u8> {
    let mut sum = [0u64; 3];
    let mut alpha = 0u64;
    let mut count = 0u64;

    for y in y0..y1 {
        for x in x0..x1 {
            let Rgba([r, g, b, a]) = *image.get_pixel(x, y);
            let a = a as u64;
            sum[0] += r as u64 * a;
            sum[1] += g as u64 * a;
            sum[2] += b as u64 * a;
            alpha += a;
            count += 1;
        }
    }

    if alpha == 0 || count == 0 {
        return Rgba([0, 0, 0, 0]);
    }

    let channel = |s: u64| ((s + alpha / 2) / alpha) as u8;
    Rgba([
        channel(sum[0]),
        channel(sum[1]),
        channel(sum[2]),
        ((alpha + count / 2) / count) as u8,
    ])
}
