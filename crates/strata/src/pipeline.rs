//! # Pipeline Runner
//!
//! Runs stages in order over one world, failing fast.
//!
//! ```text
//!   Idle ──run()──► Running ──every stage Ok(true)──► Succeeded
//!                      │
//!                      └──Ok(false) or Err──► Failed (stage index + name)
//! ```
//!
//! ## Per Run
//!
//! 1. Reset the world: blank grid, cleared overlay, no chests
//! 2. Restart the stream from the context seed, empty the bus, reset levels
//! 3. Run each stage; the first failure stops the run
//!
//! A failed run keeps whatever the stages before the failure wrote. Nothing
//! is rolled back; running again starts from step 1.

use std::time::{Duration, Instant};

use strata_core::World;

use crate::context::GenerationContext;
use crate::error::GenError;
use crate::stage::Stage;

/// Where a pipeline is in its lifecycle.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum PipelineState {
    /// Never run.
    #[default]
    Idle,
    /// A run is in progress.
    Running,
    /// The last run completed every stage.
    Succeeded,
    /// The last run stopped at a stage.
    Failed,
}

/// How a stage failed.
#[derive(Clone, Debug, PartialEq)]
pub enum FailureKind {
    /// The stage returned `Ok(false)`.
    Reported,
    /// The stage returned an error.
    Error(GenError),
}

/// The stage a run stopped at.
#[derive(Clone, Debug, PartialEq)]
pub struct StageFailure {
    /// Position in the stage list.
    pub index: usize,
    /// Stage name.
    pub name: String,
    /// Reported failure or error.
    pub kind: FailureKind,
}

/// Wall time of one completed stage.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StageTiming {
    /// Stage name.
    pub name: String,
    /// Time spent in `run`.
    pub elapsed: Duration,
}

/// Outcome of a run.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PipelineReport {
    /// True only if every stage returned `Ok(true)`.
    pub success: bool,
    /// The stage the run stopped at.
    pub failed_stage: Option<StageFailure>,
    /// Stages that completed, in order.
    pub completed: Vec<StageTiming>,
    /// Total wall time including the reset.
    pub elapsed: Duration,
}

impl PipelineReport {
    /// Name of the failing stage, if any.
    #[must_use]
    pub fn failed_stage_name(&self) -> Option<&str> {
        self.failed_stage.as_ref().map(|f| f.name.as_str())
    }
}

/// Progress of a run, in the order it happens.
#[derive(Clone, Debug, PartialEq)]
pub enum PipelineEvent {
    /// A stage is about to run.
    StageStarted {
        /// Position in the stage list.
        index: usize,
        /// Stage name.
        name: String,
    },
    /// A stage returned.
    StageFinished {
        /// Position in the stage list.
        index: usize,
        /// Stage name.
        name: String,
        /// True for `Ok(true)`.
        success: bool,
        /// Time spent in `run`.
        elapsed: Duration,
    },
    /// The run is over.
    Finished(PipelineReport),
}

/// An ordered list of stages.
#[derive(Default)]
pub struct Pipeline {
    stages: Vec<Box<dyn Stage>>,
    state: PipelineState,
}

impl Pipeline {
    /// Creates an empty pipeline.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a stage.
    #[must_use]
    pub fn with_stage(mut self, stage: impl Stage + 'static) -> Self {
        self.stages.push(Box::new(stage));
        self
    }

    /// Appends a boxed stage.
    pub fn push(&mut self, stage: Box<dyn Stage>) {
        self.stages.push(stage);
    }

    /// Number of stages.
    #[must_use]
    pub fn len(&self) -> usize {
        self.stages.len()
    }

    /// Returns true if there are no stages.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }

    /// Stage names in run order.
    pub fn stage_names(&self) -> impl Iterator<Item = &str> {
        self.stages.iter().map(|s| s.name())
    }

    /// Lifecycle state after the last call to [`run`](Self::run).
    #[must_use]
    pub const fn state(&self) -> PipelineState {
        self.state
    }

    /// Resets `world` and `ctx`, then runs every stage.
    pub fn run(&mut self, world: &mut World, ctx: &mut GenerationContext) -> PipelineReport {
        self.run_observed(world, ctx, |_| {})
    }

    /// As [`run`](Self::run), reporting progress to `observer`.
    pub fn run_observed(
        &mut self,
        world: &mut World,
        ctx: &mut GenerationContext,
        observer: impl FnMut(&PipelineEvent),
    ) -> PipelineReport {
        self.state = PipelineState::Running;
        let report = execute(&self.stages, world, ctx, observer);
        self.state = if report.success {
            PipelineState::Succeeded
        } else {
            PipelineState::Failed
        };
        report
    }
}

impl std::fmt::Debug for Pipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Pipeline")
            .field("stages", &self.stage_names().collect::<Vec<_>>())
            .field("state", &self.state)
            .finish()
    }
}

/// Runs `stages` over `world` with a fresh context for `seed`.
pub fn run_pipeline(stages: &[Box<dyn Stage>], world: &mut World, seed: u64) -> PipelineReport {
    let mut ctx = GenerationContext::new(seed);
    execute(stages, world, &mut ctx, |_| {})
}

fn execute(
    stages: &[Box<dyn Stage>],
    world: &mut World,
    ctx: &mut GenerationContext,
    mut observer: impl FnMut(&PipelineEvent),
) -> PipelineReport {
    let run_start = Instant::now();
    world.reset();
    ctx.reset_for_run(world.height());

    tracing::info!(
        seed = ctx.seed().value(),
        width = world.width(),
        height = world.height(),
        stages = stages.len(),
        "generation started"
    );

    let mut report = PipelineReport::default();

    for (index, stage) in stages.iter().enumerate() {
        let name = stage.name().to_string();
        observer(&PipelineEvent::StageStarted {
            index,
            name: name.clone(),
        });
        tracing::info!(index, stage = %name, "stage started");

        let stage_start = Instant::now();
        let outcome = stage.run(world, ctx);
        let elapsed = stage_start.elapsed();

        observer(&PipelineEvent::StageFinished {
            index,
            name: name.clone(),
            success: matches!(outcome, Ok(true)),
            elapsed,
        });

        let kind = match outcome {
            Ok(true) => {
                tracing::info!(
                    index,
                    stage = %name,
                    elapsed_ms = elapsed.as_secs_f64() * 1000.0,
                    "stage finished"
                );
                report.completed.push(StageTiming { name, elapsed });
                continue;
            }
            Ok(false) => {
                tracing::warn!(index, stage = %name, "stage reported failure");
                FailureKind::Reported
            }
            Err(error) => {
                tracing::warn!(index, stage = %name, %error, "stage failed");
                FailureKind::Error(error)
            }
        };

        report.failed_stage = Some(StageFailure { index, name, kind });
        report.elapsed = run_start.elapsed();
        observer(&PipelineEvent::Finished(report.clone()));
        return report;
    }

    report.success = true;
    report.elapsed = run_start.elapsed();
    tracing::info!(
        elapsed_ms = report.elapsed.as_secs_f64() * 1000.0,
        "generation finished"
    );
    observer(&PipelineEvent::Finished(report.clone()));
    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stage::FnStage;
    use strata_core::{ids, TilePos};

    fn marker(name: &'static str, x: i32, result: bool) -> Box<dyn Stage> {
        Box::new(FnStage::new(
            name,
            move |world: &mut World, _ctx: &mut GenerationContext| {
                world.set_block(TilePos::new(x, 0), true, ids::STONE)?;
                Ok(result)
            },
        ))
    }

    #[test]
    fn test_state_transitions() {
        let mut world = World::new(8, 8);
        let mut ctx = GenerationContext::new(1);

        let mut ok = Pipeline::new();
        ok.push(marker("a", 0, true));
        assert_eq!(ok.state(), PipelineState::Idle);
        assert!(ok.run(&mut world, &mut ctx).success);
        assert_eq!(ok.state(), PipelineState::Succeeded);

        let mut failing = Pipeline::new();
        failing.push(marker("b", 0, false));
        assert!(!failing.run(&mut world, &mut ctx).success);
        assert_eq!(failing.state(), PipelineState::Failed);
    }

    #[test]
    fn test_empty_pipeline_succeeds() {
        let mut world = World::new(4, 4);
        let report = run_pipeline(&[], &mut world, 7);
        assert!(report.success);
        assert!(report.completed.is_empty());
    }

    #[test]
    fn test_error_is_recorded_as_error() {
        let mut world = World::new(4, 4);
        let stages: Vec<Box<dyn Stage>> = vec![
            marker("first", 0, true),
            marker("off_grid", 10, true),
        ];

        let report = run_pipeline(&stages, &mut world, 1);

        let failure = report.failed_stage.unwrap();
        assert_eq!(failure.index, 1);
        assert_eq!(failure.name, "off_grid");
        assert!(matches!(failure.kind, FailureKind::Error(GenError::Core(_))));
        assert_eq!(report.completed.len(), 1);
    }

    #[test]
    fn test_run_resets_world_first() {
        let mut world = World::new(4, 4);
        world
            .set_block(TilePos::new(3, 3), true, ids::DIRT)
            .unwrap();

        run_pipeline(&[], &mut world, 1);
        assert_eq!(world.grid().count(strata_core::Tile::is_active), 0);
    }

    #[test]
    fn test_observer_sees_events_in_order() {
        let mut world = World::new(4, 4);
        let mut ctx = GenerationContext::new(1);
        let mut pipeline = Pipeline::new();
        pipeline.push(marker("a", 0, true));
        pipeline.push(marker("b", 1, true));

        let mut seen = Vec::new();
        pipeline.run_observed(&mut world, &mut ctx, |event| seen.push(event.clone()));

        assert_eq!(seen.len(), 5);
        assert!(matches!(&seen[0], PipelineEvent::StageStarted { index: 0, name } if name == "a"));
        assert!(matches!(&seen[3], PipelineEvent::StageFinished { index: 1, success: true, .. }));
        assert!(matches!(&seen[4], PipelineEvent::Finished(r) if r.success));
    }
}
