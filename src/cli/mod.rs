//! Command-line interface implementation
//!
//! This module provides the CLI entry point and dispatches to submodules
//! for specific command implementations. The CLI stands in for the
//! interactive front end: it loads an image, builds a session, applies
//! edits, and hands the encoded export to the filesystem.

mod info;
mod pixelate;

use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use crate::downsample::SourceImage;

/// Exit codes
pub(crate) const EXIT_SUCCESS: u8 = 0;
pub(crate) const EXIT_ERROR: u8 = 1;
pub(crate) const EXIT_INVALID_ARGS: u8 = 2;

/// Pixelgrid - Turn images into editable pixel-art grids
#[derive(Parser)]
#[command(name = "pxg")]
#[command(about = "Pixelgrid - Turn images into pixel-art grids, filter, paint and export them")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Downsample an image to a pixel grid and export it
    Pixelate {
        /// Input image (PNG, JPEG, BMP, GIF)
        input: PathBuf,

        /// Output file. If omitted: {input}_pixelated.{ext} next to the input
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Cells along the longer edge (1-1024)
        #[arg(short, long)]
        size: Option<u32>,

        /// Sampling: area or nearest
        #[arg(long)]
        sampling: Option<String>,

        /// Filter to apply, in order (grayscale, sepia, invert, tint, saturate)
        #[arg(short, long = "filter")]
        filters: Vec<String>,

        /// Paint a cell: x,y=COLOR (e.g. 3,4=#FF0000). Repeatable
        #[arg(long = "paint")]
        paint: Vec<String>,

        /// Background color (any CSS color); omitted means transparent
        #[arg(long)]
        background: Option<String>,

        /// Output format: png, jpeg, bmp (default: from output extension)
        #[arg(long)]
        format: Option<String>,

        /// Scale output by integer factor (1-64)
        #[arg(long, value_parser = clap::value_parser!(u32).range(1..=64))]
        scale: Option<u32>,

        /// Path to a pxg.toml (default: search upward from the working directory)
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Show the grid dimensions an image would produce
    Info {
        /// Input image
        input: PathBuf,

        /// Cells along the longer edge
        #[arg(short, long, default_value = "32")]
        size: u32,

        /// Print as JSON
        #[arg(long)]
        json: bool,
    },
}

/// Run the CLI application
pub fn run() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Pixelate {
            input,
            output,
            size,
            sampling,
            filters,
            paint,
            background,
            format,
            scale,
            config,
        } => pixelate::run_pixelate(pixelate::PixelateArgs {
            input: &input,
            output: output.as_deref(),
            size,
            sampling: sampling.as_deref(),
            filters: &filters,
            paint: &paint,
            background: background.as_deref(),
            format: format.as_deref(),
            scale,
            config: config.as_deref(),
        }),
        Commands::Info { input, size, json } => info::run_info(&input, size, json),
    }
}

/// Decode an image file into an engine source image.
pub(crate) fn load_source(path: &Path) -> Result<SourceImage, String> {
    let image = image::open(path)
        .map_err(|e| format!("Cannot open '{}': {}", path.display(), e))?
        .to_rgba8();
    SourceImage::from_image(image).map_err(|e| e.to_string())
}

/// File stem used for default output names
pub(crate) fn input_stem(path: &Path) -> String {
    path.file_stem().unwrap_or_default().to_string_lossy().to_string()
}
