//! Pixelgrid - Command-line tool for turning images into pixel-art grids

use std::process::ExitCode;

use pixelgrid::cli;

fn main() -> ExitCode {
    cli::run()
}
