//! # Tunnels
//!
//! Shafts from the surface down into the cavern layer. Each tunnel starts on
//! the surface profile at a random column and chains brush strokes until it
//! crosses the cavern ceiling or runs out of segments.

use rand::Rng;
use serde::{Deserialize, Serialize};
use strata_core::{TilePos, World};
use strata_procedural::{carve_tunnel, Brush, BrushMode, BrushSettings};

use crate::context::{keys, GenerationContext};
use crate::error::GenResult;
use crate::stage::Stage;
use crate::stages::invalid;

/// Settings for [`TunnelStage`].
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TunnelSettings {
    /// Tunnels requested.
    pub count: usize,
    /// Stroke shape; vertical velocity should be positive to head down.
    pub brush: BrushSettings,
    /// Strokes per tunnel before giving up on reaching the cavern.
    pub max_segments: u32,
    /// Columns kept clear at both world edges.
    pub margin: i32,
}

impl Default for TunnelSettings {
    fn default() -> Self {
        Self {
            count: 3,
            brush: BrushSettings {
                base_diameter: 4.0,
                diameter_jitter: 1.0,
                min_steps: 20,
                max_steps: 40,
                velocity_jitter: 0.3,
                min_velocity_x: -0.6,
                max_velocity_x: 0.6,
                min_velocity_y: 0.4,
                max_velocity_y: 1.0,
                min_repeats: 1,
                max_repeats: 1,
            },
            max_segments: 16,
            margin: 10,
        }
    }
}

/// Connects the surface to the cavern.
#[derive(Clone, Debug, PartialEq)]
pub struct TunnelStage {
    settings: TunnelSettings,
}

impl TunnelStage {
    /// Stage name.
    pub const NAME: &'static str = "tunnels";

    /// Creates the stage.
    #[must_use]
    pub const fn new(settings: TunnelSettings) -> Self {
        Self { settings }
    }
}

impl Stage for TunnelStage {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn run(&self, world: &mut World, ctx: &mut GenerationContext) -> GenResult<bool> {
        let s = &self.settings;
        let brush = Brush::new(s.brush, BrushMode::Carve)?;
        let surface = ctx.float_array(keys::SURFACE_HEIGHT)?.to_vec();
        let target = ctx.float_array(keys::CAVERN_TOP)?.to_vec();

        let columns = surface.len().min(world.width()) as i32;
        let (first, last) = (s.margin.max(0), columns - 1 - s.margin.max(0));
        if s.count > 0 && first > last {
            return Err(invalid(
                Self::NAME,
                format!("margin {} leaves no columns in a {columns} wide world", s.margin),
            ));
        }

        let max_y = world.height().saturating_sub(1) as f64;
        let mut reached = 0;
        for _ in 0..s.count {
            let x = ctx.rng().gen_range(first..=last);
            let y = surface[x as usize].round().clamp(0.0, max_y) as i32;
            let outcome = carve_tunnel(
                world,
                TilePos::new(x, y),
                &target,
                &brush,
                s.max_segments,
                ctx.rng(),
            )?;
            if outcome.reached {
                reached += 1;
            }
        }

        tracing::debug!(requested = s.count, reached, "tunnels carved");
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::GenError;
    use strata_core::{ids, Tile};

    fn solid_world(width: usize, height: usize) -> World {
        let mut world = World::new(width, height);
        world
            .fill_rect(world.grid().bounds(), Tile::solid(ids::STONE))
            .unwrap();
        world
    }

    #[test]
    fn test_tunnels_reach_cavern() {
        let mut world = solid_world(200, 120);
        let mut ctx = GenerationContext::new(21);
        ctx.publish(keys::SURFACE_HEIGHT, vec![10.0; 200]);
        ctx.publish(keys::CAVERN_TOP, vec![60.0; 200]);

        let settings = TunnelSettings {
            count: 2,
            max_segments: 64,
            margin: 80,
            ..TunnelSettings::default()
        };
        assert!(TunnelStage::new(settings).run(&mut world, &mut ctx).unwrap());

        let open_below_target = (0..200)
            .flat_map(|x| (60..120).map(move |y| TilePos::new(x, y)))
            .any(|pos| !world.tile(pos).unwrap().is_active());
        assert!(open_below_target);
    }

    #[test]
    fn test_margin_wider_than_world_is_an_error() {
        let mut world = solid_world(10, 10);
        let mut ctx = GenerationContext::new(1);
        ctx.publish(keys::SURFACE_HEIGHT, vec![2.0; 10]);
        ctx.publish(keys::CAVERN_TOP, vec![6.0; 10]);

        let err = TunnelStage::new(TunnelSettings::default())
            .run(&mut world, &mut ctx)
            .unwrap_err();
        assert!(matches!(err, GenError::InvalidSetting { .. }));
    }

    #[test]
    fn test_tunnels_need_surface() {
        let mut world = solid_world(10, 10);
        let mut ctx = GenerationContext::new(1);
        ctx.publish(keys::CAVERN_TOP, vec![6.0; 10]);
        let err = TunnelStage::new(TunnelSettings::default())
            .run(&mut world, &mut ctx)
            .unwrap_err();
        assert!(matches!(err, GenError::Context(_)));
    }
}
