//! # Random-Walk Brush
//!
//! A disc stamped along a jittered random walk. Used for cave pockets
//! (`Carve`), ore and sand veins (`Fill`) and, chained end to end, tunnels.
//!
//! ## Stroke
//!
//! ```text
//!   origin ●──► velocity v0 (uniform within bounds)
//!          │
//!          ├─ step: stamp disc (diameter = base ± jitter, at least 1)
//!          │        v += uniform(±velocity_jitter) per axis, clamped
//!          │        position += v
//!          └─ repeat steps (min_steps..=max_steps)
//! ```
//!
//! The whole stroke is repeated `min_repeats..=max_repeats` times from the
//! same origin. Only activity and type are rewritten, and every write goes
//! through the protection overlay.

use rand::Rng;
use serde::{Deserialize, Serialize};
use strata_core::{TilePos, World};

use crate::error::{check_non_negative, check_range, PlacementError, PlacementResult};

/// What the brush does to the cells it touches.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BrushMode {
    /// Deactivate cells, leaving walls and liquids alone.
    #[default]
    Carve,
    /// Activate cells with the given tile type.
    Fill(u16),
}

/// Shape of a brush stroke.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BrushSettings {
    /// Disc diameter before jitter.
    pub base_diameter: f64,
    /// Diameter varies by up to this much either way at each step.
    pub diameter_jitter: f64,
    /// Fewest steps per stroke.
    pub min_steps: u32,
    /// Most steps per stroke.
    pub max_steps: u32,
    /// Per-step velocity change, per axis.
    pub velocity_jitter: f64,
    /// Lower bound of horizontal velocity.
    pub min_velocity_x: f64,
    /// Upper bound of horizontal velocity.
    pub max_velocity_x: f64,
    /// Lower bound of vertical velocity (positive is downward).
    pub min_velocity_y: f64,
    /// Upper bound of vertical velocity.
    pub max_velocity_y: f64,
    /// Fewest strokes from the origin.
    pub min_repeats: u32,
    /// Most strokes from the origin.
    pub max_repeats: u32,
}

impl Default for BrushSettings {
    fn default() -> Self {
        Self {
            base_diameter: 6.0,
            diameter_jitter: 2.0,
            min_steps: 10,
            max_steps: 30,
            velocity_jitter: 0.5,
            min_velocity_x: -1.0,
            max_velocity_x: 1.0,
            min_velocity_y: -1.0,
            max_velocity_y: 1.0,
            min_repeats: 1,
            max_repeats: 1,
        }
    }
}

impl BrushSettings {
    /// Checks every range and magnitude.
    ///
    /// # Errors
    ///
    /// Returns `InvalidRange` for min > max and `InvalidValue` for negative
    /// or non-finite magnitudes.
    pub fn validate(&self) -> PlacementResult<()> {
        if !self.base_diameter.is_finite() || self.base_diameter <= 0.0 {
            return Err(PlacementError::InvalidValue {
                what: "brush diameter",
                value: self.base_diameter,
            });
        }
        check_non_negative("diameter jitter", self.diameter_jitter)?;
        check_non_negative("velocity jitter", self.velocity_jitter)?;
        check_range("brush steps", self.min_steps, self.max_steps)?;
        check_range("brush repeats", self.min_repeats, self.max_repeats)?;
        for (what, min, max) in [
            ("horizontal velocity", self.min_velocity_x, self.max_velocity_x),
            ("vertical velocity", self.min_velocity_y, self.max_velocity_y),
        ] {
            if !min.is_finite() || !max.is_finite() {
                return Err(PlacementError::InvalidValue {
                    what,
                    value: if min.is_finite() { max } else { min },
                });
            }
            check_range(what, min, max)?;
        }
        Ok(())
    }
}

/// Result of one brush application.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Stroke {
    /// Where the last stroke ended, clamped to the grid.
    pub end: TilePos,
    /// In-bounds cells stamped, counting repeats.
    pub cells_written: usize,
}

/// A validated brush.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Brush {
    settings: BrushSettings,
    mode: BrushMode,
}

impl Brush {
    /// Creates a brush.
    ///
    /// # Errors
    ///
    /// Returns the validation error of `settings`.
    pub fn new(settings: BrushSettings, mode: BrushMode) -> PlacementResult<Self> {
        settings.validate()?;
        Ok(Self { settings, mode })
    }

    /// The brush shape.
    #[must_use]
    pub const fn settings(&self) -> &BrushSettings {
        &self.settings
    }

    /// The brush mode.
    #[must_use]
    pub const fn mode(&self) -> BrushMode {
        self.mode
    }

    /// Paints strokes from `origin`.
    ///
    /// # Errors
    ///
    /// Propagates grid write failures.
    pub fn paint<R: Rng + ?Sized>(
        &self,
        world: &mut World,
        origin: TilePos,
        rng: &mut R,
    ) -> PlacementResult<Stroke> {
        let s = &self.settings;
        let repeats = rng.gen_range(s.min_repeats..=s.max_repeats);
        let mut stroke = Stroke {
            end: origin,
            cells_written: 0,
        };

        for _ in 0..repeats {
            let mut x = f64::from(origin.x);
            let mut y = f64::from(origin.y);
            let mut vx = rng.gen_range(s.min_velocity_x..=s.max_velocity_x);
            let mut vy = rng.gen_range(s.min_velocity_y..=s.max_velocity_y);
            let steps = rng.gen_range(s.min_steps..=s.max_steps);

            for _ in 0..steps {
                let jitter = rng.gen_range(-s.diameter_jitter..=s.diameter_jitter);
                let diameter = (s.base_diameter + jitter).max(1.0);
                stroke.cells_written += self.stamp(world, x, y, diameter)?;

                vx = (vx + rng.gen_range(-s.velocity_jitter..=s.velocity_jitter))
                    .clamp(s.min_velocity_x, s.max_velocity_x);
                vy = (vy + rng.gen_range(-s.velocity_jitter..=s.velocity_jitter))
                    .clamp(s.min_velocity_y, s.max_velocity_y);
                x += vx;
                y += vy;
            }

            stroke.end = clamp_to_world(world, x, y);
        }
        Ok(stroke)
    }

    /// Stamps one disc centered on the cell containing `(x, y)`.
    fn stamp(&self, world: &mut World, x: f64, y: f64, diameter: f64) -> PlacementResult<usize> {
        let cx = x.floor() as i32;
        let cy = y.floor() as i32;
        let radius = diameter * 0.5;
        let reach = radius.floor() as i32;
        let radius_sq = radius * radius;

        let mut written = 0;
        for dy in -reach..=reach {
            for dx in -reach..=reach {
                if f64::from(dx * dx + dy * dy) > radius_sq {
                    continue;
                }
                let pos = TilePos::new(cx + dx, cy + dy);
                let Some(existing) = world.tile(pos) else {
                    continue;
                };
                let mut incoming = existing;
                match self.mode {
                    BrushMode::Carve => incoming.active = 0,
                    BrushMode::Fill(tile_type) => incoming.set_type(true, tile_type),
                }
                world.place_tile(pos, incoming)?;
                written += 1;
            }
        }
        Ok(written)
    }
}

fn clamp_to_world(world: &World, x: f64, y: f64) -> TilePos {
    let max_x = world.width().saturating_sub(1) as f64;
    let max_y = world.height().saturating_sub(1) as f64;
    TilePos::new(x.round().clamp(0.0, max_x) as i32, y.round().clamp(0.0, max_y) as i32)
}

/// Outcome of [`carve_tunnel`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TunnelOutcome {
    /// True if the walk crossed the target curve.
    pub reached: bool,
    /// Final end point.
    pub end: TilePos,
    /// Strokes painted.
    pub segments: u32,
    /// Cells stamped over all strokes.
    pub cells_written: usize,
}

/// Returns true once `pos` is at or below the curve in its column.
fn crossed(curve: &[f64], pos: TilePos) -> bool {
    let column = (pos.x.max(0) as usize).min(curve.len() - 1);
    f64::from(pos.y) >= curve[column]
}

/// Chains brush strokes from `start` until the walk crosses `target_curve`.
///
/// Stops after `max_segments` strokes even if the curve was not reached;
/// that is reported through `reached`, not as an error.
///
/// # Errors
///
/// Returns `EmptyCurve` for an empty curve and propagates grid write failures.
pub fn carve_tunnel<R: Rng + ?Sized>(
    world: &mut World,
    start: TilePos,
    target_curve: &[f64],
    brush: &Brush,
    max_segments: u32,
    rng: &mut R,
) -> PlacementResult<TunnelOutcome> {
    if target_curve.is_empty() {
        return Err(PlacementError::EmptyCurve);
    }

    let mut outcome = TunnelOutcome {
        reached: crossed(target_curve, start),
        end: start,
        segments: 0,
        cells_written: 0,
    };

    while !outcome.reached && outcome.segments < max_segments {
        let stroke = brush.paint(world, outcome.end, rng)?;
        outcome.end = stroke.end;
        outcome.cells_written += stroke.cells_written;
        outcome.segments += 1;
        outcome.reached = crossed(target_curve, outcome.end);
    }

    if !outcome.reached {
        tracing::debug!(
            start_x = start.x,
            start_y = start.y,
            segments = outcome.segments,
            "tunnel stalled before reaching its target"
        );
    }
    Ok(outcome)
}
