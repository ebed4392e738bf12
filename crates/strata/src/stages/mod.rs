//! # Built-in Stages
//!
//! The stages a pipeline file can name, in the order a typical world uses
//! them:
//!
//! | Kind | Reads | Writes |
//! |------|-------|--------|
//! | `fill` | | rectangle of one material |
//! | `terrain` | surface level | dirt and stone below a noise profile, `SurfaceHeight` |
//! | `cavern` | | stone band with a shaped void, `CavernTop` / `CavernBottom` |
//! | `caves` | cavern curves | brush-carved pockets |
//! | `tunnels` | `SurfaceHeight`, `CavernTop` | shafts from the surface down to the cavern |
//! | `rooms` | cavern curves | brick rooms, protected shells, `RoomCount` |
//! | `pools` | cavern curves | water, lava and honey pools on cave floors |
//! | `chests` | cavern curves | chests with resolved loot |
//!
//! Settings are validated when the stage runs. Invalid settings are errors;
//! a shape that does not fit is a reported failure.

pub mod caves;
pub mod cavern;
pub mod chests;
pub mod fill;
pub mod pools;
pub mod rooms;
pub mod terrain;
pub mod tunnels;

pub use caves::{CaveSettings, CaveStage};
pub use cavern::{CavernSettings, CavernStage};
pub use chests::{ChestSettings, ChestStage, TemplateWeight};
pub use fill::{FillSettings, FillStage};
pub use pools::{PoolSettings, PoolStage};
pub use rooms::{RoomStage, RoomStageSettings};
pub use terrain::{TerrainSettings, TerrainStage};
pub use tunnels::{TunnelSettings, TunnelStage};

use strata_core::{TilePos, TileRect, World};
use strata_procedural::Boundary;

use crate::context::{keys, GenerationContext};
use crate::error::{GenError, GenResult};

/// Builds an `InvalidSetting` error.
pub(crate) fn invalid(stage: &str, reason: impl Into<String>) -> GenError {
    GenError::InvalidSetting {
        stage: stage.to_string(),
        reason: reason.into(),
    }
}

/// Checks that a weight is finite and not negative.
pub(crate) fn check_weight(stage: &str, what: &str, value: f64) -> GenResult<()> {
    if !value.is_finite() || value < 0.0 {
        return Err(invalid(stage, format!("{what} weight must be >= 0, got {value}")));
    }
    Ok(())
}

/// Reads the cavern curves a `cavern` stage published.
pub(crate) fn cavern_from_bus(ctx: &GenerationContext) -> GenResult<Boundary> {
    let top = ctx.float_array(keys::CAVERN_TOP)?.to_vec();
    let bottom = ctx.float_array(keys::CAVERN_BOTTOM)?.to_vec();
    let anchor = top
        .iter()
        .zip(&bottom)
        .map(|(t, b)| b - t)
        .enumerate()
        .fold((0, f64::INFINITY), |best, (i, gap)| if gap < best.1 { (i, gap) } else { best })
        .0;
    Ok(Boundary { top, bottom, anchor })
}

/// Rows spanned by a boundary, clipped to the world.
pub(crate) fn boundary_region(world: &World, boundary: &Boundary) -> Option<TileRect> {
    let top = boundary.top.iter().copied().fold(f64::INFINITY, f64::min);
    let bottom = boundary.bottom.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    if !top.is_finite() || !bottom.is_finite() {
        return None;
    }
    let columns = boundary.width().min(world.width()) as i32;
    TileRect {
        min_x: 0,
        min_y: top.ceil() as i32,
        max_x: columns - 1,
        max_y: bottom.floor() as i32,
    }
    .clipped(world.width(), world.height())
}

/// Where a placing stage looks: inside the cavern or anywhere.
pub(crate) enum Area {
    Cavern(Boundary),
    Anywhere,
}

impl Area {
    /// Resolves the area for a stage.
    pub(crate) fn load(inside_cavern: bool, ctx: &GenerationContext) -> GenResult<Self> {
        if inside_cavern {
            Ok(Self::Cavern(cavern_from_bus(ctx)?))
        } else {
            Ok(Self::Anywhere)
        }
    }

    /// Bounding rectangle, `None` if the area is empty.
    pub(crate) fn region(&self, world: &World) -> Option<TileRect> {
        match self {
            Self::Cavern(boundary) => boundary_region(world, boundary),
            Self::Anywhere => world.grid().bounds().clipped(world.width(), world.height()),
        }
    }

    /// Returns true if the position is inside.
    pub(crate) fn contains(&self, pos: TilePos) -> bool {
        match self {
            Self::Cavern(boundary) => boundary.contains(pos),
            Self::Anywhere => true,
        }
    }
}
