//! Whole-grid color filters
//!
//! Each filter is a pure per-cell color function. Fully transparent cells
//! mean "no pixel" and are never touched; alpha is always preserved.

use image::Rgba;
use rayon::prelude::*;

use crate::color::{clamp_channel, hsl_to_rgb, rgb_to_hsl, Color, STEEL_BLUE};
use crate::error::{EngineError, Result};
use crate::grid::Grid;
use crate::history::History;

/// Default blend strength for [`Filter::Tint`]
pub const DEFAULT_TINT_STRENGTH: f64 = 0.3;

/// Default amount for [`Filter::Saturate`]
pub const DEFAULT_SATURATE_AMOUNT: f64 = 0.3;

/// A per-cell color transform
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Filter {
    /// Rec. 601 luma
    Grayscale,
    Sepia,
    /// Invert RGB, keep alpha
    Invert,
    /// Blend toward `color` by `strength` in `[0,1]`
    Tint { color: Color, strength: f64 },
    /// Push HSL saturation toward 1 by `amount` in `[0,1]`
    Saturate { amount: f64 },
}

impl Filter {
    /// Names accepted by [`Filter::from_str`]
    pub const NAMES: [&'static str; 5] = ["grayscale", "sepia", "invert", "tint", "saturate"];

    /// Tint toward steel blue at the default strength.
    pub fn tint() -> Self {
        Filter::Tint { color: STEEL_BLUE, strength: DEFAULT_TINT_STRENGTH }
    }

    /// Saturate by the default amount.
    pub fn saturate() -> Self {
        Filter::Saturate { amount: DEFAULT_SATURATE_AMOUNT }
    }

    /// Parse a filter name, using default parameters.
    pub fn from_str(s: &str) -> Option<Filter> {
        match s.trim().to_lowercase().as_str() {
            "grayscale" | "greyscale" | "gray" | "grey" => Some(Filter::Grayscale),
            "sepia" => Some(Filter::Sepia),
            "invert" => Some(Filter::Invert),
            "tint" => Some(Filter::tint()),
            "saturate" => Some(Filter::saturate()),
            _ => None,
        }
    }

    /// Canonical lowercase name
    pub fn name(&self) -> &'static str {
        match self {
            Filter::Grayscale => "grayscale",
            Filter::Sepia => "sepia",
            Filter::Invert => "invert",
            Filter::Tint { .. } => "tint",
            Filter::Saturate { .. } => "saturate",
        }
    }

    /// Reject strengths and amounts outside `[0,1]` (or NaN).
    pub fn validate(&self) -> Result<()> {
        let (label, value) = match *self {
            Filter::Tint { strength, .. } => ("tint strength", strength),
            Filter::Saturate { amount } => ("saturate amount", amount),
            _ => return Ok(()),
        };
        if !(0.0..=1.0).contains(&value) {
            return Err(EngineError::invalid(format!(
                "{} must be between 0.0 and 1.0 (got {})",
                label, value
            )));
        }
        Ok(())
    }

    /// Apply the filter to one color. Transparent colors pass through.
    pub fn apply(&self, color: Color) -> Color {
        let Rgba([r, g, b, a]) = color;
        if a == 0 {
            return color;
        }
        let (rf, gf, bf) = (r as f64, g as f64, b as f64);

        match *self {
            Filter::Grayscale => {
                let gray = clamp_channel(0.299 * rf + 0.587 * gf + 0.114 * bf);
                Rgba([gray, gray, gray, a])
            }
            Filter::Sepia => Rgba([
                clamp_channel(0.393 * rf + 0.769 * gf + 0.189 * bf),
                clamp_channel(0.349 * rf + 0.686 * gf + 0.168 * bf),
                clamp_channel(0.272 * rf + 0.534 * gf + 0.131 * bf),
                a,
            ]),
            Filter::Invert => Rgba([255 - r, 255 - g, 255 - b, a]),
            Filter::Tint { color: Rgba([tr, tg, tb, _]), strength } => {
                let s = strength.clamp(0.0, 1.0);
                let blend = |c: f64, t: u8| clamp_channel(c * (1.0 - s) + t as f64 * s);
                Rgba([blend(rf, tr), blend(gf, tg), blend(bf, tb), a])
            }
            Filter::Saturate { amount } => {
                let amount = amount.clamp(0.0, 1.0);
                let (h, s, l) = rgb_to_hsl(r, g, b);
                let s = (s + amount * (1.0 - s)).min(1.0);
                let (r, g, b) = hsl_to_rgb(h, s, l);
                Rgba([r, g, b, a])
            }
        }
    }
}

impl std::fmt::Display for Filter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Apply `filter` to every cell in place, without touching history.
pub fn filter_cells(grid: &mut Grid, filter: &Filter) {
    grid.pixels_mut().par_iter_mut().for_each(|cell| *cell = filter.apply(*cell));
}

/// Apply `filter` to the whole grid as one undoable action.
///
/// Invalid parameters are rejected before anything is recorded.
pub fn apply_filter(grid: &mut Grid, history: &mut History, filter: &Filter) -> Result<()> {
    filter.validate().inspect_err(|e| log::warn!("rejected {} filter: {}", filter, e))?;
    history.push_undo(grid.snapshot());
    filter_cells(grid, filter);
    log::info!("applied {} filter to {}x{} grid", filter, grid.width(), grid.height());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::TRANSPARENT;

    const SAMPLE: [Color; 5] = [
        Rgba([255, 0, 0, 255]),
        Rgba([12, 200, 99, 128]),
        Rgba([70, 130, 180, 255]),
        Rgba([0, 0, 0, 1]),
        Rgba([250, 250, 250, 255]),
    ];

    fn all_filters() -> Vec<Filter> {
        Filter::NAMES.iter().filter_map(|n| Filter::from_str(n)).collect()
    }

    #[test]
    fn test_grayscale_equal_channels() {
        for c in SAMPLE {
            let Rgba([r, g, b, a]) = Filter::Grayscale.apply(c);
            assert!(r == g && g == b, "{:?} -> not gray", c);
            assert_eq!(a, c[3]);
        }
        assert_eq!(Filter::Grayscale.apply(Rgba([255, 0, 0, 255])), Rgba([76, 76, 76, 255]));
    }

    #[test]
    fn test_sepia_clamps() {
        assert_eq!(Filter::Sepia.apply(Rgba([255, 255, 255, 255])), Rgba([255, 255, 239, 255]));
    }

    #[test]
    fn test_invert_involution() {
        for c in SAMPLE {
            assert_eq!(Filter::Invert.apply(Filter::Invert.apply(c)), c);
        }
    }

    #[test]
    fn test_transparent_untouched_by_every_filter() {
        let ghost = Rgba([10, 20, 30, 0]);
        for filter in all_filters() {
            assert_eq!(filter.apply(ghost), ghost, "{} changed a transparent cell", filter);
            assert_eq!(filter.apply(TRANSPARENT), TRANSPARENT);
        }
    }

    #[test]
    fn test_tint_blend() {
        let f = Filter::Tint { color: Rgba([0, 0, 0, 255]), strength: 0.5 };
        assert_eq!(f.apply(Rgba([200, 100, 50, 255])), Rgba([100, 50, 25, 255]));
        let none = Filter::Tint { color: STEEL_BLUE, strength: 0.0 };
        assert_eq!(none.apply(Rgba([1, 2, 3, 4])), Rgba([1, 2, 3, 4]));
    }

    #[test]
    fn test_saturate_gray_stays_gray() {
        let gray = Rgba([128, 128, 128, 255]);
        assert_eq!(Filter::saturate().apply(gray), gray);
    }

    #[test]
    fn test_saturate_full_amount() {
        // S=1 keeps hue and lightness, so a muted red becomes pure red-ish
        let f = Filter::Saturate { amount: 1.0 };
        assert_eq!(f.apply(Rgba([191, 64, 64, 255])), Rgba([255, 0, 0, 255]));
    }

    #[test]
    fn test_from_str() {
        assert_eq!(Filter::from_str("Greyscale"), Some(Filter::Grayscale));
        assert_eq!(Filter::from_str("tint"), Some(Filter::tint()));
        assert_eq!(Filter::from_str("blur"), None);
        assert_eq!(all_filters().len(), 5);
    }

    #[test]
    fn test_validate_range() {
        assert!(Filter::Saturate { amount: 1.5 }.validate().is_err());
        assert!(Filter::Tint { color: STEEL_BLUE, strength: f64::NAN }.validate().is_err());
        assert!(Filter::tint().validate().is_ok());
    }

    #[test]
    fn test_apply_filter_single_entry_keeps_shape() {
        let mut grid = Grid::from_pixels(5, 1, SAMPLE.to_vec()).unwrap();
        grid.set_background(Some(Rgba([1, 1, 1, 255])));
        let mut history = History::new();

        apply_filter(&mut grid, &mut history, &Filter::Sepia).unwrap();
        assert_eq!(history.undo_len(), 1);
        assert_eq!(grid.dimensions(), (5, 1));
        assert_eq!(grid.background(), Some(Rgba([1, 1, 1, 255])));
    }

    #[test]
    fn test_apply_filter_rejects_without_recording() {
        let mut grid = Grid::new(1, 1, Rgba([9, 9, 9, 255])).unwrap();
        let mut history = History::new();
        let bad = Filter::Saturate { amount: -0.1 };
        assert!(apply_filter(&mut grid, &mut history, &bad).is_err());
        assert_eq!(history.undo_len(), 0);
    }
}
