//! # STRATA
//!
//! Seeded, staged generation of 2D tile worlds.
//!
//! ```text
//!   PipelineConfig (TOML) ──build_pipeline()──► Pipeline [stage, stage, ...]
//!                                                   │
//!   World ◄──── reset ──── run(world, ctx) ─────────┤
//!   GenerationContext ◄── reseed, clear bus ────────┘
//!        │
//!        ├─ rng: one stream, shared by every stage in call order
//!        └─ bus: SurfaceHeight, CavernTop, CavernBottom, RoomCount, ...
//! ```
//!
//! ## Architecture Rules
//!
//! 1. **Same seed, same stages, same world** - byte for byte
//! 2. **Fail fast** - the first stage that fails stops the run, nothing is rolled back
//! 3. **No hidden state** - stages get the world and the context as parameters
//!
//! ## Example
//!
//! ```rust,ignore
//! use strata::{run_pipeline, stages::FillStage, Stage};
//! use strata_core::World;
//!
//! let stages: Vec<Box<dyn Stage>> = vec![Box::new(FillStage::new(Default::default()))];
//! let mut world = World::new(100, 50);
//! let report = run_pipeline(&stages, &mut world, 42);
//! assert!(report.success);
//! ```

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::perf)]

pub mod config;
pub mod context;
pub mod error;
pub mod pipeline;
pub mod stage;
pub mod stages;
pub mod worker;

pub use config::{PipelineConfig, StageConfig};
pub use context::{keys, BusValue, GenerationContext, DEFAULT_SURFACE_FRACTION};
pub use error::{ConfigError, ConfigResult, ContextError, ContextResult, GenError, GenResult};
pub use pipeline::{
    run_pipeline, FailureKind, Pipeline, PipelineEvent, PipelineReport, PipelineState,
    StageFailure, StageTiming,
};
pub use stage::{FnStage, Stage};
pub use worker::PipelineWorker;
