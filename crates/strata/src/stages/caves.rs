//! Brush-carved pockets scattered through the cavern layer (or anywhere).

use serde::{Deserialize, Serialize};
use strata_core::World;
use strata_procedural::{scatter_points, Brush, BrushMode, BrushSettings, PointSettings};

use crate::context::GenerationContext;
use crate::error::GenResult;
use crate::stage::Stage;
use crate::stages::Area;

/// Settings for [`CaveStage`].
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CaveSettings {
    /// Pockets requested.
    pub count: usize,
    /// Minimum distance between pocket origins.
    pub min_spacing: f64,
    /// Proposals per pocket.
    pub max_retries: u32,
    /// Pocket brush.
    pub brush: BrushSettings,
    /// Keep origins between the cavern curves.
    pub inside_cavern: bool,
}

impl Default for CaveSettings {
    fn default() -> Self {
        Self {
            count: 12,
            min_spacing: 12.0,
            max_retries: 64,
            brush: BrushSettings::default(),
            inside_cavern: true,
        }
    }
}

/// Carves pockets with a random-walk brush.
#[derive(Clone, Debug, PartialEq)]
pub struct CaveStage {
    settings: CaveSettings,
}

impl CaveStage {
    /// Stage name.
    pub const NAME: &'static str = "caves";

    /// Creates the stage.
    #[must_use]
    pub const fn new(settings: CaveSettings) -> Self {
        Self { settings }
    }
}

impl Stage for CaveStage {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn run(&self, world: &mut World, ctx: &mut GenerationContext) -> GenResult<bool> {
        let s = &self.settings;
        let brush = Brush::new(s.brush, BrushMode::Carve)?;
        let area = Area::load(s.inside_cavern, ctx)?;
        let Some(region) = area.region(world) else {
            tracing::debug!("no room for cave pockets");
            return Ok(true);
        };

        let points = scatter_points(
            &PointSettings {
                count: s.count,
                region,
                min_spacing: s.min_spacing,
                max_retries: s.max_retries,
            },
            ctx.rng(),
            |pos| area.contains(pos),
        )?;

        let mut cells = 0;
        for &origin in &points {
            cells += brush.paint(world, origin, ctx.rng())?.cells_written;
        }
        tracing::debug!(pockets = points.len(), cells, "cave pockets carved");
        Ok(true)
    }
}
