//! # Protection Composition Tests
//!
//! Verifies that stages layered through the overlay compose the way a
//! generation pipeline relies on: protected structures survive later
//! carving, and unprotected cells take whatever is written last.

use strata_core::{
    ids, walls, CoreError, LiquidKind, MaskBlock, ProtectionFlags, Tile, TileGrid, TilePos,
    TileRect, Wiring, World,
};

/// Test: An unprotected write adopts every attribute of the incoming tile.
#[test]
fn test_empty_mask_adopts_incoming() {
    let mut world = World::new(10, 10);
    let pos = TilePos::new(4, 4);
    world
        .place_tile(pos, Tile::solid(ids::MUD).with_wall(walls::STONE).with_paint(3))
        .unwrap();

    let incoming = Tile::EMPTY
        .with_liquid(255, LiquidKind::Lava)
        .with_wiring(Wiring::YELLOW);
    let result = world.place_tile(pos, incoming).unwrap();

    assert_eq!(result, incoming);
    assert_eq!(world.tile(pos), Some(incoming));
}

/// Test: A TILE_TYPE mask keeps identity while the rest updates.
#[test]
fn test_tile_type_mask_rejects_identity_only() {
    let mut world = World::new(10, 10);
    let pos = TilePos::new(0, 9);
    world.place_tile(pos, Tile::solid(ids::CLAY).with_frame(36, 18)).unwrap();
    world.protect(pos, ProtectionFlags::TILE_TYPE);

    let incoming = Tile::solid(ids::SAND)
        .with_frame(0, 0)
        .with_wall(walls::GRAY_BRICK)
        .with_wall_paint(7)
        .with_liquid(40, LiquidKind::Water)
        .with_wiring(Wiring::BLUE);
    let result = world.place_tile(pos, incoming).unwrap();

    assert_eq!(result.tile_type, ids::CLAY);
    assert_eq!((result.frame_x, result.frame_y), (36, 18));
    assert_eq!(result.wall, walls::GRAY_BRICK);
    assert_eq!(result.wall_color, 7);
    assert_eq!(result.liquid, 40);
    assert!(result.wiring().has(Wiring::BLUE));
}

/// Test: An inverted rectangle is rejected and leaves the overlay untouched.
#[test]
fn test_inverted_protection_mutates_nothing() {
    let mut world = World::new(10, 10);
    world
        .set_protection(TileRect::from_size(0, 0, 2, 2), ProtectionFlags::WALL)
        .unwrap();
    let before = world.overlay().clone();

    let err = world
        .set_protection(
            TileRect {
                min_x: 0,
                min_y: 8,
                max_x: 9,
                max_y: 2,
            },
            ProtectionFlags::ALL,
        )
        .unwrap_err();

    assert!(matches!(err, CoreError::InvertedRect { .. }));
    assert_eq!(world.overlay(), &before);
}

/// Test: A protected room survives a full-grid carve.
#[test]
fn test_room_survives_later_carving() {
    let mut world = World::new(40, 20);
    let bounds = world.grid().bounds();
    world.fill_rect(bounds, Tile::solid(ids::STONE)).unwrap();

    let mut room = TileGrid::new(8, 6);
    room.fill(Tile::solid(ids::GRAY_BRICK).with_wall(walls::GRAY_BRICK));
    let mut masks = MaskBlock::new(8, 6);
    for y in 0..6 {
        for x in 0..8 {
            masks.set(x, y, ProtectionFlags::SOLID | ProtectionFlags::WALL);
        }
    }
    world.place_tiles(&room, &masks, TilePos::new(10, 5)).unwrap();

    for pos in bounds.positions() {
        world.set_block(pos, false, 0).unwrap();
    }

    assert_eq!(world.grid().count(Tile::is_active), 48);
    let inside = world.tile(TilePos::new(12, 7)).unwrap();
    assert_eq!(inside.tile_type, ids::GRAY_BRICK);
    assert_eq!(inside.wall, walls::GRAY_BRICK);
}
