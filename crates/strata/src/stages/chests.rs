//! # Chests
//!
//! Places 2x2 chests on solid floors and fills each from a loot template.
//!
//! ## Siting
//!
//! ```text
//!   proposal (x, y) ──drop──► first row whose two cells below support a top
//!        │
//!        ├─ all four chest cells open and free of identity protection
//!        ├─ inside the area (cavern or anywhere)
//!        └─ at least `min_spacing` from every chest placed so far
//! ```
//!
//! The template is drawn per chest from the weighted list before siting.
//! Once placed, the chest cells are fully protected.

use std::sync::Arc;

use rand::Rng;
use serde::{Deserialize, Serialize};
use strata_core::{Chest, ProtectionFlags, TilePos, World};
use strata_loot::{ChestTemplate, LootRegistry, LootResolver};
use strata_procedural::{attempt, WeightedTable};

use crate::context::GenerationContext;
use crate::error::GenResult;
use crate::stage::Stage;
use crate::stages::{check_weight, invalid, Area};

/// Frame step between the tiles of a chest.
const FRAME_STEP: i16 = 18;

/// One weighted template choice.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TemplateWeight {
    /// Chest template name in the loot registry.
    pub template: String,
    /// Relative chance.
    #[serde(default = "default_weight")]
    pub weight: f64,
}

const fn default_weight() -> f64 {
    1.0
}

impl TemplateWeight {
    /// A template with weight 1.
    pub fn new(template: impl Into<String>) -> Self {
        Self {
            template: template.into(),
            weight: default_weight(),
        }
    }

    /// Sets the weight.
    #[must_use]
    pub fn weighted(mut self, weight: f64) -> Self {
        self.weight = weight;
        self
    }
}

/// Settings for [`ChestStage`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChestSettings {
    /// Chests requested.
    pub count: usize,
    /// Templates to draw from.
    pub templates: Vec<TemplateWeight>,
    /// Minimum distance between chests.
    pub min_spacing: f64,
    /// Proposals per chest.
    pub max_retries: u32,
    /// Keep chests between the cavern curves.
    pub inside_cavern: bool,
}

impl Default for ChestSettings {
    fn default() -> Self {
        Self {
            count: 10,
            templates: Vec::new(),
            min_spacing: 8.0,
            max_retries: 200,
            inside_cavern: true,
        }
    }
}

/// Places and fills chests.
#[derive(Clone, Debug, PartialEq)]
pub struct ChestStage {
    settings: ChestSettings,
    registry: Arc<LootRegistry>,
}

impl ChestStage {
    /// Stage name.
    pub const NAME: &'static str = "chests";

    /// Creates the stage over a shared registry.
    #[must_use]
    pub fn new(settings: ChestSettings, registry: Arc<LootRegistry>) -> Self {
        Self { settings, registry }
    }

    /// The settings.
    #[must_use]
    pub const fn settings(&self) -> &ChestSettings {
        &self.settings
    }

    fn templates(&self) -> GenResult<WeightedTable<&str>> {
        let mut table = WeightedTable::new();
        for choice in &self.settings.templates {
            self.registry.chest(&choice.template)?;
            check_weight(Self::NAME, &choice.template, choice.weight)?;
            table.push(choice.template.as_str(), choice.weight);
        }
        Ok(table)
    }

    /// Writes the four chest tiles and protects them.
    fn place(world: &mut World, top_left: TilePos, template: &ChestTemplate) -> GenResult<()> {
        for dy in 0..2_i16 {
            for dx in 0..2_i16 {
                let pos = top_left.offset(i32::from(dx), i32::from(dy));
                let mut tile = world.tile(pos).unwrap_or_default();
                tile.set_type(true, template.tile_type);
                tile.frame_x = template.frame_x() + dx * FRAME_STEP;
                tile.frame_y = dy * FRAME_STEP;
                tile.half_brick = 0;
                tile.slope = 0;
                tile.tile_color = template.paint;
                world.place_tile(pos, tile)?;
                world.protect(pos, ProtectionFlags::ALL);
            }
        }
        Ok(())
    }
}

/// Protection that would reject a chest write.
const BLOCKING: ProtectionFlags = ProtectionFlags::SOLID
    .with(ProtectionFlags::SAME_TILE_ITEM)
    .with(ProtectionFlags::TILE_SHAPE);

/// Returns true if a chest tile can go here.
fn is_free(world: &World, pos: TilePos) -> bool {
    world.tile(pos).is_some_and(|t| !t.is_active())
        && !world.protection(pos).intersects(BLOCKING)
}

/// Returns true if a chest can stand on this cell.
fn supports(world: &World, pos: TilePos) -> bool {
    world
        .tile(pos)
        .is_some_and(|t| t.is_active() && world.catalog().supports_top(t.tile_type))
}

/// Drops a proposal to the floor and returns the chest's top-left cell.
fn site(world: &World, x: i32, y: i32) -> Option<TilePos> {
    let mut bottom = y;
    loop {
        if !is_free(world, TilePos::new(x, bottom)) || !is_free(world, TilePos::new(x + 1, bottom))
        {
            return None;
        }
        if supports(world, TilePos::new(x, bottom + 1))
            && supports(world, TilePos::new(x + 1, bottom + 1))
        {
            break;
        }
        bottom += 1;
    }
    let top_left = TilePos::new(x, bottom - 1);
    (is_free(world, top_left) && is_free(world, top_left.offset(1, 0))).then_some(top_left)
}

impl Stage for ChestStage {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn run(&self, world: &mut World, ctx: &mut GenerationContext) -> GenResult<bool> {
        let s = &self.settings;
        if !s.min_spacing.is_finite() || s.min_spacing < 0.0 {
            return Err(invalid(
                Self::NAME,
                format!("min_spacing must be >= 0, got {}", s.min_spacing),
            ));
        }
        let templates = self.templates()?;
        if s.count > 0 && templates.total_weight() <= 0.0 {
            tracing::warn!("no chest template has any weight");
            return Ok(false);
        }

        let area = Area::load(s.inside_cavern, ctx)?;
        let Some(region) = area.region(world) else {
            return Ok(true);
        };
        if region.width() < 2 {
            return Ok(true);
        }

        let resolver = LootResolver::new(&self.registry);
        let spacing_sq = s.min_spacing * s.min_spacing;
        let mut placed: Vec<TilePos> = Vec::new();

        for _ in 0..s.count {
            if world.chests().is_full() {
                tracing::debug!(placed = placed.len(), "chest store is full");
                break;
            }
            let Some(&name) = templates.choose(ctx.rng()) else {
                return Ok(false);
            };

            let rng = ctx.rng();
            let found = attempt(s.max_retries, || {
                let x = rng.gen_range(region.min_x..region.max_x);
                let y = rng.gen_range(region.min_y..=region.max_y);
                let top_left = site(world, x, y)?;
                let crowded = placed
                    .iter()
                    .any(|p| (p.distance_squared(top_left) as f64) < spacing_sq);
                let inside = area.contains(top_left) && area.contains(top_left.offset(1, 1));
                (inside && !crowded).then_some(top_left)
            });
            let Some(top_left) = found else {
                tracing::debug!(
                    placed = placed.len(),
                    requested = s.count,
                    "chest placement exhausted retries"
                );
                continue;
            };

            let template = self.registry.chest(name)?;
            Self::place(world, top_left, template)?;
            let handle = world.add_chest(Chest::new(top_left))?;
            let stored = resolver.fill_chest(world.chest_mut(handle)?, name, ctx.rng())?;
            tracing::debug!(
                x = top_left.x,
                y = top_left.y,
                template = name,
                stored,
                "chest placed"
            );
            placed.push(top_left);
        }
        Ok(true)
    }
}
