//! Stroke-based painting
//!
//! The engine turns a pointer drag into cell writes. A whole stroke becomes a
//! single history entry, recorded at the first cell that actually changes
//! color, so a stroke that changes nothing leaves no trace in history.

use crate::color::{Color, TRANSPARENT};
use crate::grid::Grid;
use crate::history::History;

/// Pointer input already reduced to grid-local cell coordinates.
///
/// Coordinates may fall outside the grid; the engine filters them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerEvent {
    Down { x: i64, y: i64 },
    Move { x: i64, y: i64 },
    Up,
    /// The pointer left the grid area
    Leave,
}

/// Stroke state machine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StrokeState {
    #[default]
    Idle,
    Stroking {
        /// Last cell the pointer resolved to
        last: (u32, u32),
        /// Whether this stroke already pushed its undo entry
        recorded: bool,
        /// Cells changed so far in this stroke
        changed: usize,
    },
}

/// Converts pointer drags into grid mutations.
#[derive(Debug, Clone)]
pub struct PaintEngine {
    paint_mode: bool,
    color: Color,
    state: StrokeState,
}

impl Default for PaintEngine {
    fn default() -> Self {
        Self::new(image::Rgba([0, 0, 0, 255]))
    }
}

impl PaintEngine {
    /// Create an engine with paint mode on and the given brush color.
    pub fn new(color: Color) -> Self {
        Self { paint_mode: true, color, state: StrokeState::Idle }
    }

    pub fn paint_mode(&self) -> bool {
        self.paint_mode
    }

    /// Toggle paint mode. Turning it off ends any stroke in progress.
    pub fn set_paint_mode(&mut self, enabled: bool) {
        self.paint_mode = enabled;
        if !enabled {
            self.end_stroke();
        }
    }

    pub fn color(&self) -> Color {
        self.color
    }

    pub fn set_color(&mut self, color: Color) {
        self.color = color;
    }

    /// Switch to erasing (painting with the transparent color).
    pub fn set_eraser(&mut self) {
        self.color = TRANSPARENT;
    }

    pub fn state(&self) -> StrokeState {
        self.state
    }

    pub fn is_stroking(&self) -> bool {
        matches!(self.state, StrokeState::Stroking { .. })
    }

    /// Feed one pointer event, returning how many cells changed.
    pub fn handle(&mut self, event: PointerEvent, grid: &mut Grid, history: &mut History) -> usize {
        if !self.paint_mode {
            return 0;
        }

        match event {
            PointerEvent::Down { x, y } => {
                // A press without a release (lost pointer-up) starts a fresh stroke
                self.end_stroke();
                let Some(cell) = hit(grid, x, y) else {
                    return 0;
                };
                log::debug!("stroke begin at ({}, {})", cell.0, cell.1);
                self.state = StrokeState::Stroking { last: cell, recorded: false, changed: 0 };
                self.paint_cells(&[cell], grid, history)
            }
            PointerEvent::Move { x, y } => {
                let StrokeState::Stroking { last, .. } = self.state else {
                    return 0;
                };
                let Some(cell) = hit(grid, x, y) else {
                    self.end_stroke();
                    return 0;
                };
                if cell == last {
                    return 0;
                }
                // Fill cells a fast drag skipped over; the first is `last` itself
                let path = line_cells(last, cell);
                let changed = self.paint_cells(&path[1..], grid, history);
                if let StrokeState::Stroking { last, .. } = &mut self.state {
                    *last = cell;
                }
                changed
            }
            PointerEvent::Up | PointerEvent::Leave => {
                self.end_stroke();
                0
            }
        }
    }

    /// Drop any stroke in progress. Later moves are ignored until the next
    /// pointer-down.
    pub(crate) fn end_stroke(&mut self) {
        if let StrokeState::Stroking { changed, .. } = self.state {
            log::debug!("stroke end, {} cells changed", changed);
        }
        self.state = StrokeState::Idle;
    }

    fn paint_cells(
        &mut self,
        cells: &[(u32, u32)],
        grid: &mut Grid,
        history: &mut History,
    ) -> usize {
        let StrokeState::Stroking { recorded, changed, .. } = &mut self.state else {
            return 0;
        };

        let mut count = 0;
        for &(x, y) in cells {
            // `hit` and `line_cells` keep every coordinate in bounds
            let Ok(current) = grid.get(x, y) else {
                continue;
            };
            if current == self.color {
                continue;
            }
            if !*recorded {
                history.push_undo(grid.snapshot());
                *recorded = true;
            }
            if grid.set(x, y, self.color).is_ok() {
                count += 1;
            }
        }
        *changed += count;
        count
    }
}

/// Resolve a signed cell coordinate to a grid cell, if inside.
fn hit(grid: &Grid, x: i64, y: i64) -> Option<(u32, u32)> {
    let x = u32::try_from(x).ok()?;
    let y = u32::try_from(y).ok()?;
    grid.contains(x, y).then_some((x, y))
}

/// Cells on the line from `p0` to `p1` inclusive, in drawing order.
fn line_cells(p0: (u32, u32), p1: (u32, u32)) -> Vec<(u32, u32)> {
    let (mut x0, mut y0) = (p0.0 as i64, p0.1 as i64);
    let (x1, y1) = (p1.0 as i64, p1.1 as i64);

    let dx = (x1 - x0).abs();
    let dy = -(y1 - y0).abs();
    let sx = if x0 < x1 { 1 } else { -1 };
    let sy = if y0 < y1 { 1 } else { -1 };
    let mut err = dx + dy;

    let mut cells = Vec::with_capacity((dx - dy) as usize + 1);
    loop {
        cells.push((x0 as u32, y0 as u32));
        if x0 == x1 && y0 == y1 {
            break;
        }
        let e2 = 2 * err;
        if e2 >= dy {
            err += dy;
            x0 += sx;
        }
        if e2 <= dx {
            err += dx;
            y0 += sy;
        }
    }
    cells
}
