//! # Cavern
//!
//! Shapes a cavern layer between two noise curves. Rows of the band above
//! the ceiling and below the floor become solid; rows between them are
//! carved open (walls stay).
//!
//! A band too short for `ceiling_range + min_height` is a reported failure,
//! not an error.

use serde::{Deserialize, Serialize};
use strata_core::{ids, walls, Tile, TilePos, World};
use strata_procedural::{BoundaryShaper, BoundarySettings, OctaveSettings};

use crate::context::{keys, GenerationContext};
use crate::error::GenResult;
use crate::stage::Stage;

/// Settings for [`CavernStage`].
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CavernSettings {
    /// The band and its curve noise.
    pub band: BoundarySettings,
    /// Material above the ceiling and below the floor.
    pub material: u16,
    /// Wall behind the whole band.
    pub wall: u16,
    /// Open the space between the curves.
    pub carve: bool,
}

impl Default for CavernSettings {
    fn default() -> Self {
        Self {
            band: BoundarySettings {
                top_y: 60,
                bottom_y: 159,
                ceiling: OctaveSettings::new(80, 1.0, 4),
                floor: OctaveSettings::new(60, 1.0, 4),
                ceiling_range: 20.0,
                min_height: 20.0,
            },
            material: ids::STONE,
            wall: walls::STONE,
            carve: true,
        }
    }
}

/// Shapes the cavern layer and publishes its curves.
#[derive(Clone, Debug, PartialEq)]
pub struct CavernStage {
    settings: CavernSettings,
}

impl CavernStage {
    /// Stage name.
    pub const NAME: &'static str = "cavern";

    /// Creates the stage.
    #[must_use]
    pub const fn new(settings: CavernSettings) -> Self {
        Self { settings }
    }
}

impl Stage for CavernStage {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn run(&self, world: &mut World, ctx: &mut GenerationContext) -> GenResult<bool> {
        let s = &self.settings;
        let shaper = BoundaryShaper::new(s.band)?;
        let boundary = match shaper.shape(world.width(), ctx.rng()) {
            Ok(boundary) => boundary,
            Err(e) if e.is_infeasible() => {
                tracing::warn!(
                    top_y = s.band.top_y,
                    bottom_y = s.band.bottom_y,
                    error = %e,
                    "cavern band cannot hold its shape"
                );
                return Ok(false);
            }
            Err(e) => return Err(e.into()),
        };

        let solid = Tile::solid(s.material).with_wall(s.wall);
        let filled = boundary.fill_outside(world, s.band.top_y, s.band.bottom_y, solid)?;

        let mut carved = 0_usize;
        if s.carve {
            let last_row = s.band.bottom_y.min(world.height() as i32 - 1);
            for x in 0..boundary.width().min(world.width()) {
                let first = (boundary.top[x].ceil() as i32).max(s.band.top_y).max(0);
                let last = (boundary.bottom[x].floor() as i32).min(last_row);
                for y in first..=last {
                    let pos = TilePos::new(x as i32, y);
                    let mut open = world.tile(pos).unwrap_or_default();
                    open.active = 0;
                    open.wall = s.wall;
                    world.place_tile(pos, open)?;
                    carved += 1;
                }
            }
        }

        tracing::debug!(anchor = boundary.anchor, filled, carved, "cavern shaped");
        ctx.publish(keys::CAVERN_TOP, boundary.top);
        ctx.publish(keys::CAVERN_BOTTOM, boundary.bottom);
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::GenError;

    fn settings(top_y: i32, bottom_y: i32) -> CavernSettings {
        let mut settings = CavernSettings::default();
        settings.band.top_y = top_y;
        settings.band.bottom_y = bottom_y;
        settings
    }

    #[test]
    fn test_cavern_opens_between_curves() {
        let mut world = World::new(120, 100);
        let mut ctx = GenerationContext::new(8);
        let stage = CavernStage::new(settings(20, 89));

        assert!(stage.run(&mut world, &mut ctx).unwrap());

        let top = ctx.float_array(keys::CAVERN_TOP).unwrap().to_vec();
        let bottom = ctx.float_array(keys::CAVERN_BOTTOM).unwrap().to_vec();
        for x in 0..120 {
            let mid = ((top[x] + bottom[x]) * 0.5) as i32;
            let open = world.tile(TilePos::new(x as i32, mid)).unwrap();
            assert!(!open.is_active());
            assert_eq!(open.wall, walls::STONE);
            assert!(world.is_solid_at(TilePos::new(x as i32, 89)) || bottom[x] >= 89.0);
            assert!(world.is_solid_at(TilePos::new(x as i32, 20)) || top[x] <= 20.0);
        }
    }

    #[test]
    fn test_short_band_reports_failure() {
        let mut world = World::new(50, 100);
        let mut ctx = GenerationContext::new(8);
        let stage = CavernStage::new(settings(10, 40));

        assert!(!stage.run(&mut world, &mut ctx).unwrap());
        assert!(!ctx.contains(keys::CAVERN_TOP));
        assert_eq!(world.grid().count(Tile::is_active), 0);
    }

    #[test]
    fn test_inverted_band_is_an_error() {
        let mut world = World::new(50, 100);
        let mut ctx = GenerationContext::new(8);
        let stage = CavernStage::new(settings(60, 10));
        assert!(matches!(
            stage.run(&mut world, &mut ctx),
            Err(GenError::Placement(_))
        ));
    }

    #[test]
    fn test_band_past_world_edges_runs() {
        let mut world = World::new(40, 30);
        let mut ctx = GenerationContext::new(8);
        let stage = CavernStage::new(settings(-10, i32::MAX));

        assert!(stage.run(&mut world, &mut ctx).unwrap());
        assert_eq!(ctx.float_array(keys::CAVERN_TOP).unwrap().len(), 40);
    }

    #[test]
    fn test_negative_noise_amplitude_is_an_error() {
        let mut world = World::new(50, 100);
        let mut ctx = GenerationContext::new(8);
        let mut bad = settings(20, 89);
        bad.band.ceiling.amplitude = -2.0;
        assert!(matches!(
            CavernStage::new(bad).run(&mut world, &mut ctx),
            Err(GenError::Placement(_))
        ));
    }
}
