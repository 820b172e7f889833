//! Info command implementation

use std::path::Path;
use std::process::ExitCode;

use serde::Serialize;

use super::{load_source, EXIT_ERROR, EXIT_INVALID_ARGS, EXIT_SUCCESS};
use crate::downsample::grid_dimensions;

#[derive(Debug, Serialize)]
struct ImageInfo {
    source: [u32; 2],
    aspect_ratio: f64,
    target_size: u32,
    grid: [u32; 2],
    cells: u64,
}

/// Execute the info command
pub fn run_info(input: &Path, size: u32, json: bool) -> ExitCode {
    let source = match load_source(input) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("Error: {}", e);
            return ExitCode::from(EXIT_ERROR);
        }
    };

    let (w, h) = match grid_dimensions(source.width(), source.height(), size) {
        Ok(dims) => dims,
        Err(e) => {
            eprintln!("Error: {}", e);
            return ExitCode::from(EXIT_INVALID_ARGS);
        }
    };

    let info = ImageInfo {
        source: [source.width(), source.height()],
        aspect_ratio: source.aspect_ratio(),
        target_size: size,
        grid: [w, h],
        cells: w as u64 * h as u64,
    };

    if json {
        match serde_json::to_string_pretty(&info) {
            Ok(s) => println!("{}", s),
            Err(e) => {
                eprintln!("Error: {}", e);
                return ExitCode::from(EXIT_ERROR);
            }
        }
    } else {
        println!("Source: {}x{} (aspect {:.3})", info.source[0], info.source[1], info.aspect_ratio);
        println!("Grid:   {}x{} ({} cells)", w, h, info.cells);
    }

    ExitCode::from(EXIT_SUCCESS)
}
