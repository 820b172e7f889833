//! Screen-space mapping and display rendering
//!
//! The viewport maps pointer positions under zoom and pan to cell
//! coordinates. Display rendering distinguishes real cell data from the
//! checkerboard decoration drawn where there is no pixel; decoration never
//! reaches an export.

use image::{Rgba, RgbaImage};

use crate::color::Color;
use crate::export::alpha_over;
use crate::grid::Grid;

/// Light checkerboard square
pub const CHECKER_LIGHT: Color = Rgba([204, 204, 204, 255]);
/// Dark checkerboard square
pub const CHECKER_DARK: Color = Rgba([153, 153, 153, 255]);

/// What one cell looks like on screen
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DisplayCell {
    /// A real pixel (already composited over any background)
    Data(Color),
    /// Placeholder for a transparent cell with no background
    Decoration { light: bool },
}

impl DisplayCell {
    pub fn is_data(&self) -> bool {
        matches!(self, DisplayCell::Data(_))
    }

    /// Color to paint on screen
    pub fn screen_color(&self) -> Color {
        match *self {
            DisplayCell::Data(color) => color,
            DisplayCell::Decoration { light: true } => CHECKER_LIGHT,
            DisplayCell::Decoration { light: false } => CHECKER_DARK,
        }
    }
}

/// Display state of every cell, row-major.
pub fn display_cells(grid: &Grid) -> Vec<DisplayCell> {
    let background = grid.background();
    grid.cells()
        .map(|(x, y, color)| match background {
            Some(bg) => DisplayCell::Data(alpha_over(color, bg)),
            None if color[3] == 0 => DisplayCell::Decoration { light: (x + y) % 2 == 0 },
            None => DisplayCell::Data(color),
        })
        .collect()
}

/// Render the on-screen preview at `cell_px` pixels per cell.
///
/// Translucent cells without a background are shown over the checkerboard.
pub fn render_display(grid: &Grid, cell_px: u32) -> RgbaImage {
    let cell_px = cell_px.max(1);
    let cells = display_cells(grid);
    let width = grid.width();
    RgbaImage::from_fn(width * cell_px, grid.height() * cell_px, |px, py| {
        let (x, y) = (px / cell_px, py / cell_px);
        let cell = cells[(y * width + x) as usize];
        match cell {
            DisplayCell::Data(color) if color[3] < 255 => {
                let checker = DisplayCell::Decoration { light: (x + y) % 2 == 0 };
                alpha_over(color, checker.screen_color())
            }
            other => other.screen_color(),
        }
    })
}

/// Zoom and pan state for mapping screen points to cells.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    /// Screen pixels per cell at zoom 1.0
    pub cell_size: f64,
    pub zoom: f64,
    /// Screen position of the grid's top-left corner
    pub pan: (f64, f64),
}

impl Default for Viewport {
    fn default() -> Self {
        Self { cell_size: 16.0, zoom: 1.0, pan: (0.0, 0.0) }
    }
}

impl Viewport {
    pub const MIN_ZOOM: f64 = 0.1;
    pub const MAX_ZOOM: f64 = 64.0;

    /// Screen pixels covered by one cell
    pub fn cell_extent(&self) -> f64 {
        self.cell_size * self.zoom
    }

    /// Cell under a screen point. The result may lie outside the grid.
    pub fn screen_to_cell(&self, sx: f64, sy: f64) -> (i64, i64) {
        let extent = self.cell_extent();
        (
            ((sx - self.pan.0) / extent).floor() as i64,
            ((sy - self.pan.1) / extent).floor() as i64,
        )
    }

    /// Screen position of a cell's top-left corner
    pub fn cell_to_screen(&self, x: u32, y: u32) -> (f64, f64) {
        let extent = self.cell_extent();
        (self.pan.0 + x as f64 * extent, self.pan.1 + y as f64 * extent)
    }

    /// Zoom by `factor` keeping the screen point `anchor` fixed over the
    /// same grid location.
    pub fn zoom_at(&mut self, factor: f64, anchor: (f64, f64)) {
        let new_zoom = (self.zoom * factor).clamp(Self::MIN_ZOOM, Self::MAX_ZOOM);
        let ratio = new_zoom / self.zoom;
        self.pan.0 = anchor.0 - (anchor.0 - self.pan.0) * ratio;
        self.pan.1 = anchor.1 - (anchor.1 - self.pan.1) * ratio;
        self.zoom = new_zoom;
    }

    pub fn pan_by(&mut self, dx: f64, dy: f64) {
        self.pan.0 += dx;
        self.pan.1 += dy;
    }
}
