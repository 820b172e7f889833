//! Pixelate command implementation

use std::path::Path;
use std::process::ExitCode;

use super::{input_stem, load_source, EXIT_ERROR, EXIT_INVALID_ARGS, EXIT_SUCCESS};
use crate::color::{parse_color, Color};
use crate::config::{load_config, merge_cli_overrides, CliOverrides};
use crate::downsample::Sampling;
use crate::export::ExportFormat;
use crate::session::Session;

/// Arguments of the pixelate command
pub struct PixelateArgs<'a> {
    pub input: &'a Path,
    pub output: Option<&'a Path>,
    pub size: Option<u32>,
    pub sampling: Option<&'a str>,
    pub filters: &'a [String],
    pub paint: &'a [String],
    pub background: Option<&'a str>,
    pub format: Option<&'a str>,
    pub scale: Option<u32>,
    pub config: Option<&'a Path>,
}

/// Parse a `x,y=COLOR` paint operation.
pub(crate) fn parse_paint_op(s: &str) -> Result<(u32, u32, Color), String> {
    let (coords, color) =
        s.split_once('=').ok_or_else(|| format!("paint '{}' must look like x,y=COLOR", s))?;
    let (x, y) = coords
        .split_once(',')
        .ok_or_else(|| format!("paint '{}' must look like x,y=COLOR", s))?;
    let x = x.trim().parse().map_err(|_| format!("invalid x coordinate in '{}'", s))?;
    let y = y.trim().parse().map_err(|_| format!("invalid y coordinate in '{}'", s))?;
    let color = parse_color(color).map_err(|e| format!("invalid color in '{}': {}", s, e))?;
    Ok((x, y, color))
}

/// Execute the pixelate command
pub fn run_pixelate(args: PixelateArgs<'_>) -> ExitCode {
    // Resolve the output format: flag, then output extension, then config
    let format = match args.format {
        Some(f) => match ExportFormat::from_extension(f) {
            Some(format) => Some(format),
            None => {
                eprintln!("Error: Unknown format '{}', expected png, jpeg, or bmp", f);
                return ExitCode::from(EXIT_INVALID_ARGS);
            }
        },
        None => args.output.and_then(ExportFormat::from_path),
    };

    let sampling = match args.sampling {
        Some(s) => match Sampling::from_str(s) {
            Some(sampling) => Some(sampling),
            None => {
                eprintln!("Error: Unknown sampling '{}', expected area or nearest", s);
                return ExitCode::from(EXIT_INVALID_ARGS);
            }
        },
        None => None,
    };

    let mut paint_ops = Vec::with_capacity(args.paint.len());
    for op in args.paint {
        match parse_paint_op(op) {
            Ok(parsed) => paint_ops.push(parsed),
            Err(e) => {
                eprintln!("Error: {}", e);
                return ExitCode::from(EXIT_INVALID_ARGS);
            }
        }
    }

    let mut config = match load_config(args.config) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Error: {}", e);
            return ExitCode::from(EXIT_ERROR);
        }
    };
    let overrides = CliOverrides {
        target_size: args.size,
        sampling,
        background: args.background.map(String::from),
        paint_color: None,
        format,
        scale: args.scale,
    };
    if let Err(e) = merge_cli_overrides(&mut config, &overrides) {
        eprintln!("Error: {}", e);
        return ExitCode::from(EXIT_INVALID_ARGS);
    }
    let options = config.engine_options();

    let source = match load_source(args.input) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("Error: {}", e);
            return ExitCode::from(EXIT_ERROR);
        }
    };

    let stem = input_stem(args.input);
    let mut session = match Session::new(source, stem, options) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("Error: {}", e);
            return ExitCode::from(EXIT_INVALID_ARGS);
        }
    };

    for (x, y, color) in paint_ops {
        if let Err(e) = session.paint_cell(x, y, color) {
            eprintln!("Error: {}", e);
            return ExitCode::from(EXIT_INVALID_ARGS);
        }
    }

    for name in args.filters {
        if let Err(e) = session.apply_named_filter(name) {
            eprintln!("Error: {}", e);
            return ExitCode::from(EXIT_INVALID_ARGS);
        }
    }

    let export = match session.export() {
        Ok(e) => e,
        Err(e) => {
            eprintln!("Error: {}", e);
            return ExitCode::from(EXIT_ERROR);
        }
    };

    let output_path = args.output.map(Path::to_path_buf).unwrap_or_else(|| {
        args.input.parent().unwrap_or(Path::new(".")).join(&export.suggested_name)
    });

    if let Some(parent) = output_path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            if let Err(e) = std::fs::create_dir_all(parent) {
                eprintln!("Error: Failed to create '{}': {}", parent.display(), e);
                return ExitCode::from(EXIT_ERROR);
            }
        }
    }

    if let Err(e) = std::fs::write(&output_path, &export.bytes) {
        eprintln!("Error: Failed to write '{}': {}", output_path.display(), e);
        return ExitCode::from(EXIT_ERROR);
    }

    let (w, h) = session.grid().dimensions();
    println!("Wrote: {} ({}x{} grid, {})", output_path.display(), w, h, export.format.label());
    ExitCode::from(EXIT_SUCCESS)
}
