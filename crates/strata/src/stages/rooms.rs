//! # Rooms
//!
//! Brick rooms placed without overlap, each entirely inside the cavern
//! (every corner between the curves) unless configured otherwise.
//!
//! ```text
//!   ##########   shell: brick + wall, protected SOLID | WALL
//!   #........#   inside: open, brick wall, protected WALL
//!   #........#
//!   ##########   the floor row is what chests stand on
//! ```
//!
//! Later carving stages cannot break a shell; chests can still go inside.

use serde::{Deserialize, Serialize};
use strata_core::{ids, walls, ProtectionFlags, Tile, TilePos, TileRect, World};
use strata_procedural::{RoomPlacer, RoomSettings};

use crate::context::{keys, GenerationContext};
use crate::error::GenResult;
use crate::stage::Stage;
use crate::stages::Area;

/// Settings for [`RoomStage`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RoomStageSettings {
    /// Rooms requested.
    pub count: usize,
    /// Smallest outer width.
    pub min_width: i32,
    /// Largest outer width.
    pub max_width: i32,
    /// Smallest outer height.
    pub min_height: i32,
    /// Largest outer height.
    pub max_height: i32,
    /// Cells kept free between rooms.
    pub spacing: i32,
    /// Proposals per room.
    pub max_retries: u32,
    /// Shell material.
    pub brick: u16,
    /// Wall behind the whole room.
    pub wall: u16,
    /// Keep rooms between the cavern curves.
    pub inside_cavern: bool,
}

impl Default for RoomStageSettings {
    fn default() -> Self {
        Self {
            count: 6,
            min_width: 8,
            max_width: 16,
            min_height: 6,
            max_height: 10,
            spacing: 4,
            max_retries: 64,
            brick: ids::GRAY_BRICK,
            wall: walls::GRAY_BRICK,
            inside_cavern: true,
        }
    }
}

/// Builds protected brick rooms and publishes `RoomCount`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RoomStage {
    settings: RoomStageSettings,
}

impl RoomStage {
    /// Stage name.
    pub const NAME: &'static str = "rooms";

    /// Creates the stage.
    #[must_use]
    pub const fn new(settings: RoomStageSettings) -> Self {
        Self { settings }
    }

    fn build(&self, world: &mut World, room: TileRect) -> GenResult<()> {
        let shell = Tile::solid(self.settings.brick).with_wall(self.settings.wall);
        let inside = Tile::EMPTY.with_wall(self.settings.wall);
        let shell_mask = ProtectionFlags::SOLID | ProtectionFlags::WALL;

        for pos in room.positions() {
            let edge = pos.x == room.min_x
                || pos.x == room.max_x
                || pos.y == room.min_y
                || pos.y == room.max_y;
            if edge {
                world.place_tile(pos, shell)?;
                world.protect(pos, shell_mask);
            } else {
                world.place_tile(pos, inside)?;
                world.protect(pos, ProtectionFlags::WALL);
            }
        }
        Ok(())
    }
}

fn corners(room: &TileRect) -> [TilePos; 4] {
    [
        TilePos::new(room.min_x, room.min_y),
        TilePos::new(room.max_x, room.min_y),
        TilePos::new(room.min_x, room.max_y),
        TilePos::new(room.max_x, room.max_y),
    ]
}

impl Stage for RoomStage {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn run(&self, world: &mut World, ctx: &mut GenerationContext) -> GenResult<bool> {
        let s = &self.settings;
        let area = Area::load(s.inside_cavern, ctx)?;
        let Some(bounds) = area.region(world) else {
            ctx.publish(keys::ROOM_COUNT, 0_i64);
            return Ok(true);
        };

        let mut placer = RoomPlacer::new(RoomSettings {
            min_width: s.min_width,
            max_width: s.max_width,
            min_height: s.min_height,
            max_height: s.max_height,
            spacing: s.spacing,
            max_retries: s.max_retries,
            bounds,
        })?;
        let placed = placer.place_many(s.count, ctx.rng(), |room| {
            corners(room).iter().all(|&corner| area.contains(corner))
        });

        for &room in placer.rooms() {
            self.build(world, room)?;
        }

        tracing::debug!(requested = s.count, placed, "rooms built");
        ctx.publish(keys::ROOM_COUNT, placed as i64);
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::GenError;

    fn open_world() -> (World, GenerationContext) {
        let world = World::new(160, 80);
        let mut ctx = GenerationContext::new(6);
        ctx.publish(keys::CAVERN_TOP, vec![5.0; 160]);
        ctx.publish(keys::CAVERN_BOTTOM, vec![75.0; 160]);
        (world, ctx)
    }

    #[test]
    fn test_rooms_are_built_and_counted() {
        let (mut world, mut ctx) = open_world();
        assert!(RoomStage::new(RoomStageSettings::default())
            .run(&mut world, &mut ctx)
            .unwrap());

        let count = ctx.int(keys::ROOM_COUNT).unwrap();
        assert!(count > 0);
        let bricks = world.grid().count(|t| t.is_active() && t.tile_type == ids::GRAY_BRICK);
        assert!(bricks >= count as usize * 24);
    }

    #[test]
    fn test_shells_resist_carving() {
        let (mut world, mut ctx) = open_world();
        RoomStage::new(RoomStageSettings::default())
            .run(&mut world, &mut ctx)
            .unwrap();
        let bricks_before = world.grid().count(Tile::is_active);

        for pos in world.grid().bounds().positions() {
            world.set_block(pos, false, 0).unwrap();
        }
        assert_eq!(world.grid().count(Tile::is_active), bricks_before);
    }

    #[test]
    fn test_rooms_stay_inside_cavern() {
        let (mut world, mut ctx) = open_world();
        RoomStage::new(RoomStageSettings::default())
            .run(&mut world, &mut ctx)
            .unwrap();
        for y in (0..5).chain(76..80) {
            for x in 0..160 {
                assert!(!world.tile(TilePos::new(x, y)).unwrap().is_active());
            }
        }
    }

    #[test]
    fn test_inverted_sizes_are_an_error() {
        let (mut world, mut ctx) = open_world();
        let settings = RoomStageSettings {
            min_width: 20,
            max_width: 10,
            ..RoomStageSettings::default()
        };
        assert!(matches!(
            RoomStage::new(settings).run(&mut world, &mut ctx),
            Err(GenError::Placement(_))
        ));
    }
}
