//! Offloaded edits
//!
//! Resize, filter and export work can run on the rayon pool so the thread
//! consuming input events stays responsive. Jobs operate on a copy of the
//! grid; the result is marshalled back and applied with
//! [`Session::commit`](crate::session::Session::commit). Only one offloaded
//! edit may be in flight per worker.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::sync::Arc;

use crate::downsample::Sampling;
use crate::error::{EngineError, Result};
use crate::export::{export_grid, Export, ExportOptions};
use crate::filters::{filter_cells, Filter};
use crate::resize::{resized_grid, ResizeMode, ResizeRequest};
use crate::session::Session;

/// Work that can be offloaded
#[derive(Debug, Clone, PartialEq)]
pub enum EditJob {
    Filter(Filter),
    Resize(ResizeRequest),
    Export(ExportOptions),
}

/// Result of an offloaded job
#[derive(Debug, Clone, PartialEq)]
pub enum EditOutcome {
    /// Replacement cells for the live grid
    Grid { label: &'static str, grid: crate::grid::Grid },
    Export(Export),
}

/// Clears the in-flight flag when dropped.
#[derive(Debug)]
struct InFlightGuard(Arc<AtomicBool>);

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// A finished job waiting to be committed. Holds the in-flight slot until
/// committed or dropped.
#[derive(Debug)]
pub struct CompletedEdit {
    outcome: EditOutcome,
    base_revision: u64,
    _guard: InFlightGuard,
}

impl CompletedEdit {
    pub fn outcome(&self) -> &EditOutcome {
        &self.outcome
    }

    /// Session revision the job was computed from
    pub fn base_revision(&self) -> u64 {
        self.base_revision
    }

    pub(crate) fn into_outcome(self) -> EditOutcome {
        self.outcome
    }
}

/// Handle to a running job. Dropping it discards the result without side
/// effects and frees the in-flight slot.
#[derive(Debug)]
pub struct PendingEdit {
    receiver: Receiver<Result<EditOutcome>>,
    base_revision: u64,
    guard: InFlightGuard,
}

impl PendingEdit {
    /// Block until the job finishes.
    pub fn wait(self) -> Result<CompletedEdit> {
        let outcome = self
            .receiver
            .recv()
            .map_err(|_| EngineError::invalid("worker exited without a result"))??;
        Ok(CompletedEdit { outcome, base_revision: self.base_revision, _guard: self.guard })
    }

    /// Poll for completion without blocking.
    pub fn try_wait(self) -> std::result::Result<Result<CompletedEdit>, PendingEdit> {
        match self.receiver.try_recv() {
            Ok(Ok(outcome)) => Ok(Ok(CompletedEdit {
                outcome,
                base_revision: self.base_revision,
                _guard: self.guard,
            })),
            Ok(Err(e)) => Ok(Err(e)),
            Err(TryRecvError::Empty) => Err(self),
            Err(TryRecvError::Disconnected) => {
                Ok(Err(EngineError::invalid("worker exited without a result")))
            }
        }
    }
}

/// Runs edit jobs off the event thread, one at a time.
#[derive(Debug, Default)]
pub struct EditWorker {
    in_flight: Arc<AtomicBool>,
}

impl EditWorker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_busy(&self) -> bool {
        self.in_flight.load(Ordering::Acquire)
    }

    /// Start `job` against a copy of the session's current grid.
    ///
    /// Fails with [`EngineError::EditInFlight`] while a previous job has not
    /// been committed or dropped.
    pub fn submit(&self, session: &Session, job: EditJob) -> Result<PendingEdit> {
        if self
            .in_flight
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            log::warn!("rejected {:?}: another edit is in flight", job);
            return Err(EngineError::EditInFlight);
        }
        let guard = InFlightGuard(Arc::clone(&self.in_flight));

        let grid = session.grid().clone();
        let source = session.shared_source();
        let name = session.name().to_string();
        let mode: ResizeMode = session.options().resize_mode;
        let sampling: Sampling = session.options().sampling;
        let (sender, receiver) = mpsc::channel();

        rayon::spawn(move || {
            let result = match job {
                EditJob::Filter(filter) => filter.validate().map(|()| {
                    let mut grid = grid;
                    filter_cells(&mut grid, &filter);
                    EditOutcome::Grid { label: filter.name(), grid }
                }),
                EditJob::Resize(request) => resized_grid(&grid, &source, request, mode, sampling)
                    .map(|grid| EditOutcome::Grid { label: "resize", grid }),
                EditJob::Export(options) => {
                    export_grid(&grid, &options, &name).map(EditOutcome::Export)
                }
            };
            // The receiver is gone when the caller discarded the job
            let _ = sender.send(result);
        });

        Ok(PendingEdit { receiver, base_revision: session.revision(), guard })
    }
}
