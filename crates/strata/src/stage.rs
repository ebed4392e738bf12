//! # Stage
//!
//! One step of a generation pipeline.
//!
//! A stage gets the world and the context as parameters and reports success
//! as `Ok(true)`. `Ok(false)` means the stage could not do its job with the
//! current geometry; `Err` means it was misconfigured or hit a lookup
//! failure. Either one stops the run.

use strata_core::World;

use crate::context::GenerationContext;
use crate::error::GenResult;

/// A generation step.
pub trait Stage: Send + Sync {
    /// Name used in logs and failure reports.
    fn name(&self) -> &str;

    /// Runs the stage.
    ///
    /// # Errors
    ///
    /// Any error aborts the pipeline run.
    fn run(&self, world: &mut World, ctx: &mut GenerationContext) -> GenResult<bool>;
}

/// A stage backed by a closure.
///
/// ```rust,ignore
/// let marker = FnStage::new("marker", |world, _ctx| {
///     world.set_block(TilePos::new(0, 0), true, ids::STONE)?;
///     Ok(true)
/// });
/// ```
pub struct FnStage<F> {
    name: String,
    body: F,
}

impl<F> FnStage<F>
where
    F: Fn(&mut World, &mut GenerationContext) -> GenResult<bool> + Send + Sync,
{
    /// Wraps a closure.
    pub fn new(name: impl Into<String>, body: F) -> Self {
        Self {
            name: name.into(),
            body,
        }
    }
}

impl<F> Stage for FnStage<F>
where
    F: Fn(&mut World, &mut GenerationContext) -> GenResult<bool> + Send + Sync,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn run(&self, world: &mut World, ctx: &mut GenerationContext) -> GenResult<bool> {
        (self.body)(world, ctx)
    }
}

impl<F> std::fmt::Debug for FnStage<F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FnStage").field("name", &self.name).finish()
    }
}
