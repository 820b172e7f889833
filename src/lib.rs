//! Pixelgrid - Pixel grid engine
//!
//! This library provides functionality to:
//! - Downsample a source image into a grid of solid-colored cells
//! - Paint the grid with strokes that undo as a single action
//! - Apply whole-grid color filters (grayscale, sepia, invert, tint, saturate)
//! - Resize the grid and export it as PNG, JPEG or BMP bytes
//!
//! # Example
//!
//! ```
//! use image::{Rgba, RgbaImage};
//! use pixelgrid::downsample::SourceImage;
//! use pixelgrid::paint::PointerEvent;
//! use pixelgrid::session::{EngineOptions, Session};
//!
//! let image = RgbaImage::from_pixel(100, 50, Rgba([0, 0, 255, 255]));
//! let source = SourceImage::from_image(image).unwrap();
//! let mut session = Session::new(source, "photo", EngineOptions::default()).unwrap();
//! assert_eq!(session.grid().dimensions(), (32, 16));
//!
//! session.set_paint_color(Rgba([255, 0, 0, 255]));
//! session.pointer(PointerEvent::Down { x: 0, y: 0 });
//! session.pointer(PointerEvent::Move { x: 1, y: 0 });
//! session.pointer(PointerEvent::Up);
//! assert_eq!(session.history().undo_len(), 1);
//!
//! let export = session.export().unwrap();
//! assert_eq!(export.suggested_name, "photo_pixelated.png");
//! ```

pub mod cli;
pub mod color;
pub mod config;
pub mod downsample;
pub mod error;
pub mod export;
pub mod filters;
pub mod grid;
pub mod history;
pub mod paint;
pub mod resize;
pub mod session;
pub mod viewport;
pub mod worker;

pub use error::{EngineError, Result};
pub use grid::Grid;
pub use session::{EngineOptions, Session};
