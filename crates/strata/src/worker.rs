//! # Background Runs
//!
//! Runs a pipeline on its own thread while the caller keeps going.
//!
//! ```text
//!   caller                         worker thread
//!   ──────                         ─────────────
//!   spawn(pipeline, world) ──────► lock SharedWorld (whole run)
//!   events().recv()       ◄──────  StageStarted / StageFinished
//!   events().recv()       ◄──────  Finished(report)
//!   join()                ◄──────  unlock, hand back report
//! ```
//!
//! There is no cancellation. The world stays locked until the last stage
//! returns, so `SharedWorld::try_lock` tells a caller whether a run is still
//! in flight.

use std::thread::{self, JoinHandle};

use crossbeam_channel::{unbounded, Receiver};
use strata_core::SharedWorld;

use crate::context::GenerationContext;
use crate::error::{GenError, GenResult};
use crate::pipeline::{Pipeline, PipelineEvent, PipelineReport};

/// Handle to a pipeline running on a background thread.
#[derive(Debug)]
pub struct PipelineWorker {
    handle: JoinHandle<(Pipeline, PipelineReport)>,
    events: Receiver<PipelineEvent>,
}

impl PipelineWorker {
    /// Starts `pipeline` over `world` on a new thread.
    ///
    /// # Errors
    ///
    /// Returns `Worker` if the thread cannot be spawned.
    pub fn spawn(
        mut pipeline: Pipeline,
        world: SharedWorld,
        mut ctx: GenerationContext,
    ) -> GenResult<Self> {
        let (sender, events) = unbounded();

        let handle = thread::Builder::new()
            .name("strata-pipeline".to_string())
            .spawn(move || {
                let mut guard = world.lock();
                let report = pipeline.run_observed(&mut guard, &mut ctx, |event| {
                    // A caller that dropped the receiver only loses progress.
                    let _ = sender.send(event.clone());
                });
                (pipeline, report)
            })
            .map_err(|e| GenError::Worker(e.to_string()))?;

        Ok(Self { handle, events })
    }

    /// Progress events. `Finished` is always the last one.
    #[must_use]
    pub const fn events(&self) -> &Receiver<PipelineEvent> {
        &self.events
    }

    /// Returns true once the run is over.
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }

    /// Waits for the run and returns its report.
    ///
    /// # Errors
    ///
    /// Returns `Worker` if a stage panicked.
    pub fn join(self) -> GenResult<PipelineReport> {
        self.join_pipeline().map(|(_, report)| report)
    }

    /// Waits for the run and returns the pipeline for reuse with its report.
    ///
    /// # Errors
    ///
    /// Returns `Worker` if a stage panicked.
    pub fn join_pipeline(self) -> GenResult<(Pipeline, PipelineReport)> {
        self.handle
            .join()
            .map_err(|_| GenError::Worker("pipeline thread panicked".to_string()))
    }
}
