//! # Pools
//!
//! Shallow liquid pools resting on cave floors.
//!
//! A pool origin is an open cell. From there the stage drops straight down
//! to the first solid cell, then fills up to `depth` rows upward, spreading
//! sideways while the cells stay open and something holds the liquid up.
//! The liquid kind is drawn per pool from the configured weights.

use serde::{Deserialize, Serialize};
use strata_core::{LiquidKind, TilePos, World};
use strata_procedural::{scatter_points, PointSettings, WeightedTable};

use crate::context::GenerationContext;
use crate::error::GenResult;
use crate::stage::Stage;
use crate::stages::{check_weight, invalid, Area};

/// Settings for [`PoolStage`].
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PoolSettings {
    /// Pools requested.
    pub count: usize,
    /// Minimum distance between pool origins.
    pub min_spacing: f64,
    /// Proposals per pool.
    pub max_retries: u32,
    /// Widest pool row.
    pub max_width: i32,
    /// Rows filled above the floor.
    pub depth: i32,
    /// Relative chance of water.
    pub water: f64,
    /// Relative chance of lava.
    pub lava: f64,
    /// Relative chance of honey.
    pub honey: f64,
    /// Keep origins between the cavern curves.
    pub inside_cavern: bool,
}

impl Default for PoolSettings {
    fn default() -> Self {
        Self {
            count: 8,
            min_spacing: 10.0,
            max_retries: 64,
            max_width: 12,
            depth: 3,
            water: 0.8,
            lava: 0.15,
            honey: 0.05,
            inside_cavern: true,
        }
    }
}

/// Fills cave floors with liquid.
#[derive(Clone, Debug, PartialEq)]
pub struct PoolStage {
    settings: PoolSettings,
}

impl PoolStage {
    /// Stage name.
    pub const NAME: &'static str = "pools";

    /// Creates the stage.
    #[must_use]
    pub const fn new(settings: PoolSettings) -> Self {
        Self { settings }
    }

    fn validate(&self) -> GenResult<WeightedTable<LiquidKind>> {
        let s = &self.settings;
        if s.max_width < 1 || s.depth < 1 {
            return Err(invalid(Self::NAME, "pool width and depth must be at least 1"));
        }
        check_weight(Self::NAME, "water", s.water)?;
        check_weight(Self::NAME, "lava", s.lava)?;
        check_weight(Self::NAME, "honey", s.honey)?;
        Ok(WeightedTable::new()
            .with(LiquidKind::Water, s.water)
            .with(LiquidKind::Lava, s.lava)
            .with(LiquidKind::Honey, s.honey))
    }

    /// Fills one pool and returns the cells it covers.
    fn fill(&self, world: &mut World, origin: TilePos, kind: LiquidKind) -> GenResult<usize> {
        let Some(floor) = drop_to_floor(world, origin) else {
            return Ok(0);
        };
        let reach = self.settings.max_width / 2;
        let mut cells = 0;

        for row in 1..=self.settings.depth {
            let y = floor - row;
            if !is_open(world, TilePos::new(origin.x, y)) {
                break;
            }
            let mut row_cells = Vec::new();
            for direction in [-1, 1] {
                let mut dx = if direction < 0 { 0 } else { 1 };
                while dx <= reach {
                    let pos = TilePos::new(origin.x + direction * dx, y);
                    if !is_open(world, pos) || !holds_liquid(world, pos.offset(0, 1)) {
                        break;
                    }
                    row_cells.push(pos);
                    dx += 1;
                }
            }
            for pos in row_cells {
                let Some(mut tile) = world.tile(pos) else {
                    continue;
                };
                tile.liquid = u8::MAX;
                tile.liquid_kind = kind as u8;
                world.place_tile(pos, tile)?;
                cells += 1;
            }
        }
        Ok(cells)
    }
}

/// Cell free of solid tiles.
fn is_open(world: &World, pos: TilePos) -> bool {
    world.tile(pos).is_some() && !world.is_solid_at(pos)
}

/// Cell that can carry liquid resting on it.
fn holds_liquid(world: &World, pos: TilePos) -> bool {
    world.is_solid_at(pos) || world.tile(pos).is_some_and(|t| t.has_liquid())
}

/// Row of the first solid cell at or below `origin`.
fn drop_to_floor(world: &World, origin: TilePos) -> Option<i32> {
    (origin.y..world.height() as i32).find(|&y| world.is_solid_at(TilePos::new(origin.x, y)))
}

impl Stage for PoolStage {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn run(&self, world: &mut World, ctx: &mut GenerationContext) -> GenResult<bool> {
        let s = &self.settings;
        let liquids = self.validate()?;
        if s.count > 0 && liquids.total_weight() <= 0.0 {
            tracing::warn!("every liquid weight is zero");
            return Ok(false);
        }

        let area = Area::load(s.inside_cavern, ctx)?;
        let Some(region) = area.region(world) else {
            return Ok(true);
        };
        let points = {
            let world = &*world;
            scatter_points(
                &PointSettings {
                    count: s.count,
                    region,
                    min_spacing: s.min_spacing,
                    max_retries: s.max_retries,
                },
                ctx.rng(),
                |pos| area.contains(pos) && is_open(world, pos),
            )?
        };

        let mut cells = 0;
        for origin in points {
            let Some(&kind) = liquids.choose(ctx.rng()) else {
                return Ok(false);
            };
            cells += self.fill(world, origin, kind)?;
        }
        tracing::debug!(cells, "pools filled");
        Ok(true)
    }
}
