//! # Terrain
//!
//! Lays the ground below a noise surface profile.
//!
//! ```text
//!   air
//!   ~~~~~~~~~~~~~~~~~~  surface (grass on top)
//!   dirt               dirt_depth rows, dirt wall behind
//!   stone              everything below
//! ```
//!
//! Publishes the profile as `SurfaceHeight` and moves the context levels:
//! `surface_level` to the deepest surface row, `respawn_level` to the row
//! above the middle column.

use serde::{Deserialize, Serialize};
use strata_core::{ids, walls, Tile, TilePos, World};
use strata_procedural::{surface_curve, OctaveSettings, SurfaceSettings};

use crate::context::{keys, GenerationContext};
use crate::error::GenResult;
use crate::stage::Stage;
use crate::stages::invalid;

/// Settings for [`TerrainStage`].
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TerrainSettings {
    /// Mean surface row; the context's surface level when absent.
    pub base_level: Option<f64>,
    /// Profile noise.
    pub noise: OctaveSettings,
    /// Rows of dirt under the surface.
    pub dirt_depth: u32,
    /// Top soil material.
    pub dirt: u16,
    /// Deep material.
    pub stone: u16,
    /// Wall behind the dirt layer.
    pub dirt_wall: u16,
    /// Turn the top dirt cell of each column into grass.
    pub grass: bool,
}

impl Default for TerrainSettings {
    fn default() -> Self {
        Self {
            base_level: None,
            noise: OctaveSettings::new(120, 24.0, 5),
            dirt_depth: 10,
            dirt: ids::DIRT,
            stone: ids::STONE,
            dirt_wall: walls::DIRT,
            grass: true,
        }
    }
}

/// Builds the ground under a surface profile.
#[derive(Clone, Debug, PartialEq)]
pub struct TerrainStage {
    settings: TerrainSettings,
}

impl TerrainStage {
    /// Stage name.
    pub const NAME: &'static str = "terrain";

    /// Creates the stage.
    #[must_use]
    pub const fn new(settings: TerrainSettings) -> Self {
        Self { settings }
    }

    fn column_tile(&self, depth: u32) -> Tile {
        let s = &self.settings;
        if depth == 0 && s.grass {
            Tile::solid(ids::GRASS)
        } else if depth < s.dirt_depth {
            let tile = Tile::solid(s.dirt);
            if depth == 0 {
                tile
            } else {
                tile.with_wall(s.dirt_wall)
            }
        } else {
            Tile::solid(s.stone)
        }
    }
}

impl Stage for TerrainStage {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn run(&self, world: &mut World, ctx: &mut GenerationContext) -> GenResult<bool> {
        let s = &self.settings;
        let base_level = s.base_level.unwrap_or(ctx.surface_level);
        if !base_level.is_finite() {
            return Err(invalid(Self::NAME, format!("base level {base_level}")));
        }
        s.noise
            .validate()
            .map_err(|e| invalid(Self::NAME, e.to_string()))?;

        let surface = SurfaceSettings {
            base_level,
            noise: s.noise,
        };
        let curve = surface_curve(&surface, world.width(), ctx.rng());

        let height = world.height() as i32;
        for (x, &level) in curve.iter().enumerate() {
            let top = (level.round() as i32).clamp(0, height);
            for y in top..height {
                let tile = self.column_tile((y - top) as u32);
                world.place_tile(TilePos::new(x as i32, y), tile)?;
            }
        }

        if !curve.is_empty() {
            ctx.surface_level = curve.iter().copied().fold(f64::NEG_INFINITY, f64::max);
            ctx.respawn_level = (curve[curve.len() / 2].round() - 1.0).max(0.0);
        }
        tracing::debug!(
            surface_level = ctx.surface_level,
            respawn_level = ctx.respawn_level,
            "terrain laid"
        );
        ctx.publish(keys::SURFACE_HEIGHT, curve);
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::GenError;

    fn run(settings: TerrainSettings, world: &mut World, ctx: &mut GenerationContext) -> bool {
        ctx.reset_for_run(world.height());
        TerrainStage::new(settings).run(world, ctx).unwrap()
    }

    #[test]
    fn test_columns_follow_profile() {
        let mut world = World::new(200, 120);
        let mut ctx = GenerationContext::new(11);
        assert!(run(TerrainSettings::default(), &mut world, &mut ctx));

        let surface = ctx.float_array(keys::SURFACE_HEIGHT).unwrap().to_vec();
        assert_eq!(surface.len(), 200);
        for (x, level) in surface.iter().enumerate() {
            let top = level.round() as i32;
            let x = x as i32;
            assert!(!world.tile(TilePos::new(x, top - 1)).unwrap().is_active());
            assert_eq!(world.tile(TilePos::new(x, top)).unwrap().tile_type, ids::GRASS);
            assert_eq!(world.tile(TilePos::new(x, top + 3)).unwrap().wall, walls::DIRT);
            assert_eq!(world.tile(TilePos::new(x, top + 10)).unwrap().tile_type, ids::STONE);
        }
    }

    #[test]
    fn test_levels_move_with_terrain() {
        let mut world = World::new(100, 200);
        let mut ctx = GenerationContext::new(3);
        let settings = TerrainSettings {
            base_level: Some(80.0),
            noise: OctaveSettings::new(40, 10.0, 2),
            ..TerrainSettings::default()
        };
        run(settings, &mut world, &mut ctx);

        assert!((72.5..87.5).contains(&ctx.surface_level));
        assert!(ctx.respawn_level < ctx.surface_level);
    }

    #[test]
    fn test_bad_divisor_is_an_error() {
        let mut world = World::new(10, 10);
        let mut ctx = GenerationContext::new(3);
        let mut settings = TerrainSettings::default();
        settings.noise.divisor = 0.0;
        assert!(TerrainStage::new(settings).run(&mut world, &mut ctx).is_err());
    }

    #[test]
    fn test_bad_amplitude_is_an_error() {
        let mut world = World::new(10, 10);
        let mut ctx = GenerationContext::new(3);
        for amplitude in [-24.0, f64::NAN] {
            let mut settings = TerrainSettings::default();
            settings.noise.amplitude = amplitude;
            assert!(matches!(
                TerrainStage::new(settings).run(&mut world, &mut ctx),
                Err(GenError::InvalidSetting { .. })
            ));
        }
    }
}
