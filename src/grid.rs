//! Dense pixel grid model
//!
//! A [`Grid`] owns a `width x height` array of cell colors stored row-major,
//! plus an optional uniform background. Every coordinate in `[0,W)x[0,H)` has
//! a cell; nothing exists outside it.

use image::{Rgba, RgbaImage};

use crate::color::Color;
use crate::error::{EngineError, Result};
use crate::history::Snapshot;

/// The editable pixel-art grid
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Grid {
    width: u32,
    height: u32,
    cells: Vec<Color>,
    background: Option<Color>,
}

impl Grid {
    /// Create a grid filled with a single color.
    pub fn new(width: u32, height: u32, fill: Color) -> Result<Self> {
        check_dimensions(width, height)?;
        Ok(Self {
            width,
            height,
            cells: vec![fill; width as usize * height as usize],
            background: None,
        })
    }

    /// Build a grid from row-major cell colors.
    pub fn from_pixels(width: u32, height: u32, cells: Vec<Color>) -> Result<Self> {
        check_dimensions(width, height)?;
        if cells.len() != width as usize * height as usize {
            return Err(EngineError::invalid(format!(
                "{} cells given for a {}x{} grid",
                cells.len(),
                width,
                height
            )));
        }
        Ok(Self { width, height, cells, background: None })
    }

    /// Build a grid with one cell per image pixel.
    pub fn from_image(image: &RgbaImage) -> Result<Self> {
        Self::from_pixels(image.width(), image.height(), image.pixels().copied().collect())
    }

    /// Raw cell colors as an image, one pixel per cell, background ignored.
    pub fn to_image(&self) -> RgbaImage {
        let mut image = RgbaImage::new(self.width, self.height);
        for (px, cell) in image.pixels_mut().zip(&self.cells) {
            *px = *cell;
        }
        image
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// `(width, height)` in cells
    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Width divided by height, derived from the current dimensions.
    pub fn aspect_ratio(&self) -> f64 {
        self.width as f64 / self.height as f64
    }

    /// Number of cells, always `width * height`
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// Grids always hold at least one cell.
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn contains(&self, x: u32, y: u32) -> bool {
        x < self.width && y < self.height
    }

    fn index(&self, x: u32, y: u32) -> Result<usize> {
        if !self.contains(x, y) {
            return Err(EngineError::OutOfBounds { x, y, width: self.width, height: self.height });
        }
        Ok(y as usize * self.width as usize + x as usize)
    }

    /// Color of the cell at `(x, y)`.
    pub fn get(&self, x: u32, y: u32) -> Result<Color> {
        self.index(x, y).map(|i| self.cells[i])
    }

    /// Overwrite the cell at `(x, y)`.
    pub fn set(&mut self, x: u32, y: u32, color: Color) -> Result<()> {
        let i = self.index(x, y)?;
        self.cells[i] = color;
        Ok(())
    }

    pub fn background(&self) -> Option<Color> {
        self.background
    }

    /// Set or clear the background. A fully transparent color clears it.
    pub fn set_background(&mut self, color: Option<Color>) {
        self.background = color.filter(|c| c[3] != 0);
    }

    /// Iterate `(x, y, color)` in row-major order.
    pub fn cells(&self) -> impl Iterator<Item = (u32, u32, Color)> + '_ {
        let width = self.width as usize;
        self.cells
            .iter()
            .enumerate()
            .map(move |(i, c)| ((i % width) as u32, (i / width) as u32, *c))
    }

    /// Row-major cell colors
    pub fn pixels(&self) -> &[Color] {
        &self.cells
    }

    pub(crate) fn pixels_mut(&mut self) -> &mut [Color] {
        &mut self.cells
    }

    /// Deep copy of the current state for history.
    pub fn snapshot(&self) -> Snapshot {
        Snapshot::capture(self)
    }

    /// Replace the whole state from a snapshot in one swap.
    pub fn restore(&mut self, snapshot: Snapshot) {
        *self = snapshot.into_grid();
    }

    /// Replace the cells with `other`'s, keeping this grid's background.
    pub(crate) fn replace_cells(&mut self, other: Grid) {
        let background = self.background;
        *self = other;
        self.background = background;
    }

    /// True when any cell is not fully opaque.
    pub fn has_transparency(&self) -> bool {
        self.cells.iter().any(|Rgba([_, _, _, a])| *a != 255)
    }
}

fn check_dimensions(width: u32, height: u32) -> Result<()> {
    if width == 0 || height == 0 {
        return Err(EngineError::invalid(format!(
            "grid dimensions must be positive (got {}x{})",
            width, height
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::TRANSPARENT;

    const RED: Color = Rgba([255, 0, 0, 255]);

    #[test]
    fn test_new_grid_is_dense() {
        let grid = Grid::new(4, 3, TRANSPARENT).unwrap();
        assert_eq!(grid.dimensions(), (4, 3));
        assert_eq!(grid.len(), 12);
        assert_eq!(grid.cells().count(), 12);
    }

    #[test]
    fn test_zero_dimensions_rejected() {
        assert!(matches!(Grid::new(0, 3, RED), Err(EngineError::InvalidArgument(_))));
        assert!(Grid::from_pixels(2, 2, vec![RED; 3]).is_err());
    }

    #[test]
    fn test_set_and_get() {
        let mut grid = Grid::new(2, 2, TRANSPARENT).unwrap();
        grid.set(1, 0, RED).unwrap();
        assert_eq!(grid.get(1, 0), Ok(RED));
        assert_eq!(grid.get(0, 1), Ok(TRANSPARENT));
        assert_eq!(grid.pixels()[1], RED);
    }

    #[test]
    fn test_out_of_bounds() {
        let mut grid = Grid::new(2, 2, TRANSPARENT).unwrap();
        assert_eq!(
            grid.set(2, 0, RED),
            Err(EngineError::OutOfBounds { x: 2, y: 0, width: 2, height: 2 })
        );
        assert!(grid.get(0, 2).is_err());
    }

    #[test]
    fn test_transparent_background_normalized() {
        let mut grid = Grid::new(1, 1, RED).unwrap();
        grid.set_background(Some(Rgba([10, 20, 30, 0])));
        assert_eq!(grid.background(), None);
        grid.set_background(Some(RED));
        assert_eq!(grid.background(), Some(RED));
    }

    #[test]
    fn test_cells_iterate_row_major() {
        let grid = Grid::from_pixels(2, 2, vec![RED, TRANSPARENT, TRANSPARENT, RED]).unwrap();
        let coords: Vec<(u32, u32)> = grid.cells().map(|(x, y, _)| (x, y)).collect();
        assert_eq!(coords, vec![(0, 0), (1, 0), (0, 1), (1, 1)]);
    }

    #[test]
    fn test_image_round_trip() {
        let grid = Grid::from_pixels(3, 1, vec![RED, TRANSPARENT, RED]).unwrap();
        assert_eq!(Grid::from_image(&grid.to_image()).unwrap(), grid);
    }

    #[test]
    fn test_has_transparency() {
        let mut grid = Grid::new(2, 1, RED).unwrap();
        assert!(!grid.has_transparency());
        grid.set(1, 0, Rgba([255, 0, 0, 254])).unwrap();
        assert!(grid.has_transparency());
    }

    #[test]
    fn test_snapshot_does_not_alias() {
        let mut grid = Grid::new(2, 2, TRANSPARENT).unwrap();
        let snapshot = grid.snapshot();
        grid.set(0, 0, RED).unwrap();
        grid.restore(snapshot);
        assert_eq!(grid.get(0, 0), Ok(TRANSPARENT));
    }
}
