//! Editing session
//!
//! A [`Session`] is the single edit context: it owns the source image, the
//! live grid, its history and the paint engine, and funnels every mutation
//! through the record-then-mutate discipline.

use std::sync::Arc;

use crate::color::{Color, STEEL_BLUE};
use crate::downsample::{downsample, Sampling, SourceImage};
use crate::error::{EngineError, Result};
use crate::export::{export_grid, Export, ExportOptions};
use crate::filters::{apply_filter, Filter, DEFAULT_SATURATE_AMOUNT, DEFAULT_TINT_STRENGTH};
use crate::grid::Grid;
use crate::history::History;
use crate::paint::{PaintEngine, PointerEvent};
use crate::resize::{resize_grid, ResizeMode, ResizeRequest};
use crate::worker::{CompletedEdit, EditOutcome};

/// Default longer-edge size of a freshly generated grid
pub const DEFAULT_TARGET_SIZE: u32 = 32;

/// Recognized engine options
#[derive(Debug, Clone, PartialEq)]
pub struct EngineOptions {
    pub target_size: u32,
    pub sampling: Sampling,
    pub resize_mode: ResizeMode,
    /// Maximum undo depth; 0 is unbounded
    pub history_limit: usize,
    pub paint_color: Color,
    pub background: Option<Color>,
    pub tint_color: Color,
    pub tint_strength: f64,
    pub saturate_amount: f64,
    pub export: ExportOptions,
}

impl Default for EngineOptions {
    fn default() -> Self {
        Self {
            target_size: DEFAULT_TARGET_SIZE,
            sampling: Sampling::default(),
            resize_mode: ResizeMode::default(),
            history_limit: 0,
            paint_color: image::Rgba([0, 0, 0, 255]),
            background: None,
            tint_color: STEEL_BLUE,
            tint_strength: DEFAULT_TINT_STRENGTH,
            saturate_amount: DEFAULT_SATURATE_AMOUNT,
            export: ExportOptions::default(),
        }
    }
}

impl EngineOptions {
    /// Resolve a filter name using the configured tint and saturate settings.
    pub fn filter(&self, name: &str) -> Result<Filter> {
        let filter = match Filter::from_str(name) {
            Some(Filter::Tint { .. }) => {
                Filter::Tint { color: self.tint_color, strength: self.tint_strength }
            }
            Some(Filter::Saturate { .. }) => Filter::Saturate { amount: self.saturate_amount },
            Some(other) => other,
            None => {
                return Err(EngineError::invalid(format!(
                    "unknown filter '{}', expected one of: {}",
                    name,
                    Filter::NAMES.join(", ")
                )))
            }
        };
        filter.validate()?;
        Ok(filter)
    }
}

/// One loaded image and its editable grid.
#[derive(Debug)]
pub struct Session {
    source: Arc<SourceImage>,
    name: String,
    grid: Grid,
    history: History,
    paint: PaintEngine,
    options: EngineOptions,
    /// Bumped on every grid mutation; lets offloaded edits detect staleness
    revision: u64,
}

impl Session {
    /// Downsample `source` into a new grid.
    ///
    /// `name` is the stem used to suggest export filenames.
    pub fn new(
        source: SourceImage,
        name: impl Into<String>,
        mut options: EngineOptions,
    ) -> Result<Self> {
        let mut grid = downsample(&source, options.target_size, options.sampling)?;
        grid.set_background(options.background);
        options.background = grid.background();
        log::info!(
            "loaded {}x{} source as {}x{} grid",
            source.width(),
            source.height(),
            grid.width(),
            grid.height()
        );

        Ok(Self {
            source: Arc::new(source),
            name: name.into(),
            grid,
            history: History::with_limit(options.history_limit),
            paint: PaintEngine::new(options.paint_color),
            options,
            revision: 0,
        })
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    pub fn source(&self) -> &SourceImage {
        &self.source
    }

    pub(crate) fn shared_source(&self) -> Arc<SourceImage> {
        Arc::clone(&self.source)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn options(&self) -> &EngineOptions {
        &self.options
    }

    pub fn paint_engine(&self) -> &PaintEngine {
        &self.paint
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn set_paint_color(&mut self, color: Color) {
        self.options.paint_color = color;
        self.paint.set_color(color);
    }

    pub fn set_paint_mode(&mut self, enabled: bool) {
        self.paint.set_paint_mode(enabled);
    }

    /// Feed a pointer event to the paint engine.
    pub fn pointer(&mut self, event: PointerEvent) -> usize {
        let changed = self.paint.handle(event, &mut self.grid, &mut self.history);
        if changed > 0 {
            self.revision += 1;
        }
        changed
    }

    /// Paint one cell as a complete stroke.
    pub fn paint_cell(&mut self, x: u32, y: u32, color: Color) -> Result<bool> {
        if !self.grid.contains(x, y) {
            return Err(EngineError::OutOfBounds {
                x,
                y,
                width: self.grid.width(),
                height: self.grid.height(),
            });
        }
        let previous = self.paint.color();
        self.paint.set_color(color);
        let changed = self.pointer(PointerEvent::Down { x: x as i64, y: y as i64 });
        self.pointer(PointerEvent::Up);
        self.paint.set_color(previous);
        Ok(changed > 0)
    }

    /// Change the background as one undoable action. Setting the current
    /// value again records nothing.
    pub fn set_background(&mut self, color: Option<Color>) {
        let normalized = color.filter(|c| c[3] != 0);
        if normalized == self.grid.background() {
            return;
        }
        self.history.push_undo(self.grid.snapshot());
        self.grid.set_background(normalized);
        self.grid_changed();
    }

    /// Apply a filter to the whole grid.
    pub fn apply_filter(&mut self, filter: &Filter) -> Result<()> {
        apply_filter(&mut self.grid, &mut self.history, filter)?;
        self.grid_changed();
        Ok(())
    }

    /// Apply a filter by name with the configured parameters.
    pub fn apply_named_filter(&mut self, name: &str) -> Result<()> {
        let filter = self.options.filter(name)?;
        self.apply_filter(&filter)
    }

    /// Resize using the configured mode and sampling.
    pub fn resize(&mut self, request: ResizeRequest) -> Result<()> {
        resize_grid(
            &mut self.grid,
            &mut self.history,
            &self.source,
            request,
            self.options.resize_mode,
            self.options.sampling,
        )?;
        self.grid_changed();
        Ok(())
    }

    /// Step back one action. Returns false when there is nothing to undo.
    pub fn undo(&mut self) -> bool {
        let Some(previous) = self.history.undo(self.grid.snapshot()) else {
            return false;
        };
        self.grid.restore(previous);
        self.grid_changed();
        true
    }

    /// Step forward one undone action.
    pub fn redo(&mut self) -> bool {
        let Some(next) = self.history.redo(self.grid.snapshot()) else {
            return false;
        };
        self.grid.restore(next);
        self.grid_changed();
        true
    }

    /// Run after every edit that does not come from the paint engine. Ends
    /// the active stroke and re-derives size and background from the grid.
    fn grid_changed(&mut self) {
        self.paint.end_stroke();
        self.options.target_size = self.grid.width().max(self.grid.height());
        self.options.background = self.grid.background();
        self.revision += 1;
    }

    /// Encode the grid with the configured export options.
    pub fn export(&self) -> Result<Export> {
        self.export_with(&self.options.export)
    }

    pub fn export_with(&self, options: &ExportOptions) -> Result<Export> {
        export_grid(&self.grid, options, &self.name)
    }

    /// Apply the result of an offloaded edit.
    ///
    /// Grid results are recorded in history like any other edit; export
    /// results are handed back untouched.
    pub fn commit(&mut self, edit: CompletedEdit) -> Result<Option<Export>> {
        if edit.base_revision() != self.revision {
            return Err(EngineError::StaleEdit);
        }
        match edit.into_outcome() {
            EditOutcome::Grid { label, grid } => {
                self.history.push_undo(self.grid.snapshot());
                self.grid.replace_cells(grid);
                self.grid_changed();
                log::info!("committed offloaded {}", label);
                Ok(None)
            }
            EditOutcome::Export(export) => Ok(Some(export)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgba, RgbaImage};

    const RED: Color = Rgba([255, 0, 0, 255]);

    fn session() -> Session {
        let source = SourceImage::from_image(RgbaImage::from_pixel(100, 50, Rgba([0, 0, 255, 255])))
            .unwrap();
        Session::new(source, "test", EngineOptions::default()).unwrap()
    }

    #[test]
    fn test_new_session_dimensions() {
        assert_eq!(session().grid().dimensions(), (32, 16));
    }

    #[test]
    fn test_background_change_is_undoable() {
        let mut s = session();
        s.set_background(Some(RED));
        s.set_background(Some(RED));
        assert_eq!(s.history().undo_len(), 1);
        assert!(s.undo());
        assert_eq!(s.grid().background(), None);
        assert!(s.redo());
        assert_eq!(s.grid().background(), Some(RED));
    }

    #[test]
    fn test_paint_cell_single_entry() {
        let mut s = session();
        assert_eq!(s.paint_cell(3, 3, RED), Ok(true));
        assert_eq!(s.paint_cell(3, 3, RED), Ok(false));
        assert_eq!(s.history().undo_len(), 1);
        assert!(s.paint_cell(99, 0, RED).is_err());
    }

    #[test]
    fn test_named_filter_uses_options() {
        let mut options = EngineOptions::default();
        options.tint_strength = 1.0;
        options.tint_color = RED;
        assert_eq!(options.filter("tint"), Ok(Filter::Tint { color: RED, strength: 1.0 }));
        assert!(options.filter("emboss").is_err());
        options.saturate_amount = 2.0;
        assert!(options.filter("saturate").is_err());
    }

    #[test]
    fn test_undo_on_fresh_session() {
        let mut s = session();
        assert!(!s.undo());
        assert!(!s.redo());
        assert_eq!(s.revision(), 0);
    }

    #[test]
    fn test_resize_updates_target() {
        let mut s = session();
        s.resize(ResizeRequest::TargetSize(10)).unwrap();
        assert_eq!(s.grid().dimensions(), (10, 5));
        assert_eq!(s.options().target_size, 10);
    }

    #[test]
    fn test_undo_resize_restores_target() {
        let mut s = session();
        s.resize(ResizeRequest::TargetSize(10)).unwrap();
        assert!(s.undo());
        assert_eq!(s.grid().dimensions(), (32, 16));
        assert_eq!(s.options().target_size, 32);
        assert!(s.redo());
        assert_eq!(s.options().target_size, 10);
    }

    #[test]
    fn test_undo_background_restores_option() {
        let mut s = session();
        s.set_background(Some(RED));
        assert_eq!(s.options().background, Some(RED));
        assert!(s.undo());
        assert_eq!(s.options().background, None);
    }

    #[test]
    fn test_transparent_background_option_normalized() {
        let options =
            EngineOptions { background: Some(Rgba([1, 2, 3, 0])), ..EngineOptions::default() };
        let source = SourceImage::from_image(RgbaImage::from_pixel(4, 4, RED)).unwrap();
        let s = Session::new(source, "t", options).unwrap();
        assert_eq!(s.options().background, None);
    }

    #[test]
    fn test_undo_mid_stroke_ends_stroke() {
        let mut s = session();
        s.set_paint_color(RED);
        s.pointer(PointerEvent::Down { x: 0, y: 0 });
        assert!(s.undo());
        assert!(!s.paint_engine().is_stroking());

        assert_eq!(s.pointer(PointerEvent::Move { x: 1, y: 0 }), 0);
        s.pointer(PointerEvent::Up);
        assert_eq!(s.grid().get(1, 0), Ok(Rgba([0, 0, 255, 255])));
        assert_eq!(s.history().undo_len(), 0);
        assert_eq!(s.history().redo_len(), 1);

        assert!(s.redo());
        assert_eq!(s.grid().get(0, 0), Ok(RED));
    }

    #[test]
    fn test_filter_mid_stroke_next_stroke_records_again() {
        let mut s = session();
        s.set_paint_color(RED);
        s.pointer(PointerEvent::Down { x: 0, y: 0 });
        s.apply_filter(&Filter::Invert).unwrap();
        assert_eq!(s.pointer(PointerEvent::Move { x: 1, y: 0 }), 0);
        s.pointer(PointerEvent::Up);
        assert_eq!(s.history().undo_len(), 2);

        s.pointer(PointerEvent::Down { x: 5, y: 5 });
        s.pointer(PointerEvent::Up);
        assert_eq!(s.history().undo_len(), 3);
    }
}
