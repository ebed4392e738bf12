//! Fills a rectangle (or the whole grid) with one material.

use serde::{Deserialize, Serialize};
use strata_core::{ids, walls, Tile, TileRect, World};

use crate::context::GenerationContext;
use crate::error::GenResult;
use crate::stage::Stage;

/// Settings for [`FillStage`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FillSettings {
    /// Inclusive rectangle; the whole grid when absent.
    pub rect: Option<TileRect>,
    /// Material.
    pub tile_type: u16,
    /// Background wall, 0 for none.
    pub wall: u16,
}

impl Default for FillSettings {
    fn default() -> Self {
        Self {
            rect: None,
            tile_type: ids::STONE,
            wall: walls::NONE,
        }
    }
}

/// Writes one solid tile to every cell of a rectangle.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FillStage {
    settings: FillSettings,
}

impl FillStage {
    /// Stage name.
    pub const NAME: &'static str = "fill";

    /// Creates the stage.
    #[must_use]
    pub const fn new(settings: FillSettings) -> Self {
        Self { settings }
    }

    /// The settings.
    #[must_use]
    pub const fn settings(&self) -> &FillSettings {
        &self.settings
    }
}

impl Stage for FillStage {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn run(&self, world: &mut World, _ctx: &mut GenerationContext) -> GenResult<bool> {
        if world.width() == 0 || world.height() == 0 {
            return Ok(true);
        }
        let rect = self.settings.rect.unwrap_or_else(|| world.grid().bounds());
        let tile = Tile::solid(self.settings.tile_type).with_wall(self.settings.wall);
        world.fill_rect(rect, tile)?;
        Ok(true)
    }
}
