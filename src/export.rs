//! Export compositor: grid to encoded raster bytes
//!
//! The grid is rasterized at one output pixel per cell, composited over the
//! background color when one is set, and encoded in memory. Nothing is
//! written to storage here; persisting the bytes is the caller's job.

use std::io::Cursor;

use image::imageops::FilterType;
use image::{DynamicImage, ImageOutputFormat, Rgba, RgbaImage};
use serde::{Deserialize, Serialize};

use crate::color::{unit_to_channel, Color, WHITE};
use crate::error::{EngineError, Result};
use crate::grid::Grid;

/// Largest accepted integer upscale factor
pub const MAX_EXPORT_SCALE: u32 = 64;

/// Output raster encoding
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    #[default]
    Png,
    Jpeg,
    Bmp,
}

impl ExportFormat {
    /// Parse a format name or file extension
    pub fn from_extension(ext: &str) -> Option<ExportFormat> {
        match ext.trim_start_matches('.').to_lowercase().as_str() {
            "png" => Some(ExportFormat::Png),
            "jpg" | "jpeg" => Some(ExportFormat::Jpeg),
            "bmp" => Some(ExportFormat::Bmp),
            _ => None,
        }
    }

    /// Guess the format from a path's extension
    pub fn from_path(path: &std::path::Path) -> Option<ExportFormat> {
        path.extension().and_then(|e| e.to_str()).and_then(Self::from_extension)
    }

    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Png => "png",
            ExportFormat::Jpeg => "jpg",
            ExportFormat::Bmp => "bmp",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ExportFormat::Png => "PNG",
            ExportFormat::Jpeg => "JPEG",
            ExportFormat::Bmp => "BMP",
        }
    }

    /// Whether the encoding keeps an alpha channel
    pub fn supports_alpha(&self) -> bool {
        !matches!(self, ExportFormat::Jpeg)
    }
}

/// Export settings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExportOptions {
    pub format: ExportFormat,
    /// Integer nearest-neighbor upscale applied after compositing (1-64)
    pub scale: u32,
    /// JPEG quality (1-100); ignored by other formats
    pub jpeg_quality: u8,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self { format: ExportFormat::Png, scale: 1, jpeg_quality: 90 }
    }
}

/// An encoded image ready for the file sink
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Export {
    pub bytes: Vec<u8>,
    pub format: ExportFormat,
    pub suggested_name: String,
}

/// Suggested output filename for an export of `stem`.
///
/// ```
/// use pixelgrid::export::{suggested_filename, ExportFormat};
///
/// assert_eq!(suggested_filename("cat", ExportFormat::Jpeg), "cat_pixelated.jpg");
/// ```
pub fn suggested_filename(stem: &str, format: ExportFormat) -> String {
    let stem = if stem.is_empty() { "image" } else { stem };
    format!("{}_pixelated.{}", stem, format.extension())
}

/// Source-over compositing of straight-alpha colors.
pub fn alpha_over(src: Color, dst: Color) -> Color {
    let sa = src[3] as f64 / 255.0;
    let da = dst[3] as f64 / 255.0;
    let out_a = sa + da * (1.0 - sa);
    if out_a <= 0.0 {
        return Rgba([0, 0, 0, 0]);
    }

    let channel = |i: usize| {
        let s = src[i] as f64 / 255.0;
        let d = dst[i] as f64 / 255.0;
        unit_to_channel((s * sa + d * da * (1.0 - sa)) / out_a)
    };
    Rgba([channel(0), channel(1), channel(2), unit_to_channel(out_a)])
}

/// Rasterize the grid at one pixel per cell over its background.
///
/// Without a background, transparent cells stay transparent.
pub fn composite(grid: &Grid) -> RgbaImage {
    let mut image = grid.to_image();
    // Opaque cells already cover the background
    if let Some(background) = grid.background().filter(|_| grid.has_transparency()) {
        for px in image.pixels_mut() {
            *px = alpha_over(*px, background);
        }
    }
    image
}

/// Encode an RGBA image. Formats without alpha get an opaque white matte.
pub fn encode(image: &RgbaImage, format: ExportFormat, jpeg_quality: u8) -> Result<Vec<u8>> {
    let dynamic = if format.supports_alpha() {
        DynamicImage::ImageRgba8(image.clone())
    } else {
        let mut flattened = image.clone();
        for px in flattened.pixels_mut() {
            *px = alpha_over(*px, WHITE);
        }
        DynamicImage::ImageRgb8(DynamicImage::ImageRgba8(flattened).to_rgb8())
    };

    let output_format = match format {
        ExportFormat::Png => ImageOutputFormat::Png,
        ExportFormat::Jpeg => ImageOutputFormat::Jpeg(jpeg_quality.clamp(1, 100)),
        ExportFormat::Bmp => ImageOutputFormat::Bmp,
    };

    let mut bytes = Cursor::new(Vec::new());
    dynamic
        .write_to(&mut bytes, output_format)
        .map_err(|e| EngineError::EncodingFailure(format!("{} encoder: {}", format.label(), e)))?;
    Ok(bytes.into_inner())
}

/// Scale an image by an integer factor, keeping pixel edges crisp.
pub fn scale_image(image: RgbaImage, factor: u32) -> RgbaImage {
    if factor <= 1 {
        return image;
    }
    let (w, h) = image.dimensions();
    image::imageops::resize(&image, w * factor, h * factor, FilterType::Nearest)
}

/// Composite and encode the grid for the file sink.
pub fn export_grid(grid: &Grid, options: &ExportOptions, stem: &str) -> Result<Export> {
    if options.scale == 0 || options.scale > MAX_EXPORT_SCALE {
        return Err(EngineError::invalid(format!(
            "export scale must be between 1 and {} (got {})",
            MAX_EXPORT_SCALE, options.scale
        )));
    }

    let image = scale_image(composite(grid), options.scale);
    let bytes = encode(&image, options.format, options.jpeg_quality)?;
    log::info!(
        "exported {}x{} {} ({} bytes)",
        image.width(),
        image.height(),
        options.format.label(),
        bytes.len()
    );

    Ok(Export {
        bytes,
        format: options.format,
        suggested_name: suggested_filename(stem, options.format),
    })
}
