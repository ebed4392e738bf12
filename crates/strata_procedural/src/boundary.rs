//! # Boundary Curves
//!
//! Ceiling and floor curves for a horizontal band of the world (a cavern
//! layer, a surface profile).
//!
//! ## Shaping
//!
//! ```text
//!   top_y ─────────────────────────────────────
//!          ╲__╱‾‾╲___   ceiling: top_y + n_c·ceiling_range
//!                     ╲___╱‾‾‾‾╲__
//!            ↕ min_height at the anchor column
//!          __╱‾╲____╱‾╲___  floor: ceiling + min_height + share·room
//!   bottom ─────────────────────────────────────
//! ```
//!
//! Two independent octave curves are normalized to `[0, 1)`. Their
//! difference is smallest at the anchor column; there the gap is exactly
//! `min_height`. Everywhere else the floor drops by that column's share of
//! the remaining `room = height - ceiling_range - min_height`. A negative
//! `room` means the band cannot hold the shape at all.

use rand::RngCore;
use serde::{Deserialize, Serialize};
use strata_core::{Tile, TilePos, World};

use crate::error::{check_non_negative, check_range, PlacementError, PlacementResult};
use crate::noise::{generate_octave_1d, OctaveSettings};

/// Settings for [`BoundaryShaper`].
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BoundarySettings {
    /// First row of the band.
    pub top_y: i32,
    /// Last row of the band (inclusive).
    pub bottom_y: i32,
    /// Noise for the ceiling curve.
    pub ceiling: OctaveSettings,
    /// Noise for the floor curve.
    pub floor: OctaveSettings,
    /// Rows the ceiling may sag below `top_y`.
    pub ceiling_range: f64,
    /// Smallest gap between ceiling and floor.
    pub min_height: f64,
}

impl Default for BoundarySettings {
    fn default() -> Self {
        Self {
            top_y: 0,
            bottom_y: 99,
            ceiling: OctaveSettings::new(80, 1.0, 4),
            floor: OctaveSettings::new(80, 1.0, 4),
            ceiling_range: 20.0,
            min_height: 20.0,
        }
    }
}

impl BoundarySettings {
    /// Band height in rows.
    #[must_use]
    pub fn height(&self) -> f64 {
        f64::from(self.bottom_y) - f64::from(self.top_y) + 1.0
    }

    /// Vertical room left for the floor to wander.
    #[must_use]
    pub fn room(&self) -> f64 {
        self.height() - self.ceiling_range - self.min_height
    }
}

/// A shaped pair of curves, one value per column.
#[derive(Clone, Debug, PartialEq)]
pub struct Boundary {
    /// Ceiling row per column.
    pub top: Vec<f64>,
    /// Floor row per column.
    pub bottom: Vec<f64>,
    /// Column where the gap is smallest.
    pub anchor: usize,
}

impl Boundary {
    /// Number of columns.
    #[must_use]
    pub fn width(&self) -> usize {
        self.top.len()
    }

    /// Returns true if `pos` lies strictly between the curves.
    #[must_use]
    pub fn contains(&self, pos: TilePos) -> bool {
        if pos.x < 0 {
            return false;
        }
        let x = pos.x as usize;
        match (self.top.get(x), self.bottom.get(x)) {
            (Some(&top), Some(&bottom)) => {
                let y = f64::from(pos.y);
                y >= top && y <= bottom
            }
            _ => false,
        }
    }

    /// Writes `tile` above the ceiling and below the floor, between rows
    /// `top_y..=bottom_y`. Returns the number of cells written.
    ///
    /// # Errors
    ///
    /// Propagates grid write failures.
    pub fn fill_outside(
        &self,
        world: &mut World,
        top_y: i32,
        bottom_y: i32,
        tile: Tile,
    ) -> PlacementResult<usize> {
        let first = top_y.max(0);
        let last = bottom_y.min(world.height() as i32 - 1);
        let columns = self.width().min(world.width());

        let mut written = 0;
        for x in 0..columns {
            for y in first..=last {
                let row = f64::from(y);
                if row < self.top[x] || row > self.bottom[x] {
                    world.place_tile(TilePos::new(x as i32, y), tile)?;
                    written += 1;
                }
            }
        }
        Ok(written)
    }
}

/// Normalizes a curve by its octave bound.
fn normalized(curve: Vec<f64>, settings: &OctaveSettings) -> Vec<f64> {
    let max = settings.max_amplitude();
    if max > 0.0 {
        curve.into_iter().map(|v| v / max).collect()
    } else {
        vec![0.0; curve.len()]
    }
}

/// Derives ceiling and floor curves for a band.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BoundaryShaper {
    settings: BoundarySettings,
}

impl BoundaryShaper {
    /// Creates a shaper.
    ///
    /// # Errors
    ///
    /// Returns `InvalidRange` for an inverted band and `InvalidValue` for a
    /// negative ceiling range or minimum height, or for bad noise settings.
    pub fn new(settings: BoundarySettings) -> PlacementResult<Self> {
        check_range("band rows", settings.top_y, settings.bottom_y)?;
        settings.ceiling.validate()?;
        settings.floor.validate()?;
        check_non_negative("ceiling range", settings.ceiling_range)?;
        check_non_negative("minimum height", settings.min_height)?;
        Ok(Self { settings })
    }

    /// The band settings.
    #[must_use]
    pub const fn settings(&self) -> &BoundarySettings {
        &self.settings
    }

    /// Shapes the curves for `width` columns.
    ///
    /// Both noise curves are drawn before feasibility is checked, so the
    /// stream advances the same way whether or not the band fits.
    ///
    /// # Errors
    ///
    /// Returns `Infeasible` when the band is too short for
    /// `ceiling_range + min_height`.
    pub fn shape<R: RngCore + ?Sized>(&self, width: usize, rng: &mut R) -> PlacementResult<Boundary> {
        let s = &self.settings;
        let ceiling = normalized(generate_octave_1d(&s.ceiling, width, rng), &s.ceiling);
        let floor = normalized(generate_octave_1d(&s.floor, width, rng), &s.floor);

        let room = s.room();
        if room < 0.0 {
            return Err(PlacementError::Infeasible { room });
        }

        let diffs: Vec<f64> = floor.iter().zip(&ceiling).map(|(f, c)| f - c).collect();
        let (anchor, min_diff) = diffs
            .iter()
            .copied()
            .enumerate()
            .fold((0, f64::INFINITY), |best, (i, d)| if d < best.1 { (i, d) } else { best });
        let max_diff = diffs.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let spread = max_diff - min_diff;

        let top_y = f64::from(s.top_y);
        let top: Vec<f64> = ceiling.iter().map(|n| top_y + n * s.ceiling_range).collect();
        let bottom = top
            .iter()
            .zip(&diffs)
            .map(|(t, d)| {
                let share = if spread > 0.0 { (d - min_diff) / spread } else { 0.0 };
                t + s.min_height + share * room
            })
            .collect();

        Ok(Boundary { top, bottom, anchor })
    }
}

/// Settings for a single terrain profile.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SurfaceSettings {
    /// Mean surface row.
    pub base_level: f64,
    /// Profile noise; the curve swings half its bound either way.
    pub noise: OctaveSettings,
}

impl Default for SurfaceSettings {
    fn default() -> Self {
        Self {
            base_level: 100.0,
            noise: OctaveSettings::new(120, 24.0, 5),
        }
    }
}

/// Builds a surface profile centered on `base_level`.
pub fn surface_curve<R: RngCore + ?Sized>(
    settings: &SurfaceSettings,
    width: usize,
    rng: &mut R,
) -> Vec<f64> {
    let offset = settings.base_level - settings.noise.max_amplitude() * 0.5;
    generate_octave_1d(&settings.noise, width, rng)
        .into_iter()
        .map(|v| v + offset)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::seed::WorldSeed;
    use strata_core::ids;

    fn band() -> BoundarySettings {
        BoundarySettings {
            top_y: 100,
            bottom_y: 199,
            ceiling: OctaveSettings::new(40, 1.0, 3),
            floor: OctaveSettings::new(40, 1.0, 3),
            ceiling_range: 20.0,
            min_height: 15.0,
        }
    }

    #[test]
    fn test_curves_stay_in_band() {
        let shaper = BoundaryShaper::new(band()).unwrap();
        let boundary = shaper.shape(300, &mut WorldSeed::new(42).rng()).unwrap();

        assert_eq!(boundary.width(), 300);
        for x in 0..300 {
            let (top, bottom) = (boundary.top[x], boundary.bottom[x]);
            assert!(top >= 100.0 && top <= 120.0);
            assert!(bottom - top >= 15.0 - 1e-9);
            assert!(bottom <= 200.0 + 1e-9, "x={x} bottom={bottom}");
        }
    }

    #[test]
    fn test_anchor_has_minimum_gap() {
        let shaper = BoundaryShaper::new(band()).unwrap();
        let boundary = shaper.shape(200, &mut WorldSeed::new(5).rng()).unwrap();
        let a = boundary.anchor;
        assert!((boundary.bottom[a] - boundary.top[a] - 15.0).abs() < 1e-9);
    }

    #[test]
    fn test_short_band_is_infeasible() {
        let mut settings = band();
        settings.bottom_y = 120;
        let shaper = BoundaryShaper::new(settings).unwrap();
        let err = shaper.shape(50, &mut WorldSeed::new(1).rng()).unwrap_err();
        assert!(err.is_infeasible());
    }

    #[test]
    fn test_inverted_band_rejected() {
        let mut settings = band();
        settings.bottom_y = 10;
        assert!(BoundaryShaper::new(settings).is_err());
    }

    #[test]
    fn test_extreme_band_height() {
        let settings = BoundarySettings {
            top_y: -10,
            bottom_y: i32::MAX,
            ..band()
        };
        assert_eq!(settings.height(), f64::from(i32::MAX) + 11.0);

        let shaper = BoundaryShaper::new(settings).unwrap();
        let boundary = shaper.shape(16, &mut WorldSeed::new(4).rng()).unwrap();
        assert_eq!(boundary.width(), 16);
        assert!(boundary.top.iter().all(|&top| (-10.0..=10.0).contains(&top)));
    }

    #[test]
    fn test_negative_amplitude_rejected() {
        let mut settings = band();
        settings.floor.amplitude = -1.0;
        assert!(matches!(
            BoundaryShaper::new(settings),
            Err(PlacementError::InvalidValue { what: "noise amplitude", .. })
        ));
    }

    #[test]
    fn test_fill_outside_leaves_gap_open() {
        let mut settings = band();
        settings.top_y = 0;
        settings.bottom_y = 59;
        let mut world = World::new(64, 60);
        let shaper = BoundaryShaper::new(settings).unwrap();
        let boundary = shaper.shape(64, &mut WorldSeed::new(2).rng()).unwrap();

        let written = boundary
            .fill_outside(&mut world, 0, 59, Tile::solid(ids::STONE))
            .unwrap();
        assert!(written > 0);

        for x in 0..64 {
            let mid = ((boundary.top[x] + boundary.bottom[x]) * 0.5) as i32;
            let pos = TilePos::new(x as i32, mid);
            assert!(boundary.contains(pos));
            assert!(!world.tile(pos).unwrap().is_active());
        }
    }

    #[test]
    fn test_surface_centered_on_base() {
        let settings = SurfaceSettings {
            base_level: 50.0,
            noise: OctaveSettings::new(30, 10.0, 2),
        };
        let curve = surface_curve(&settings, 500, &mut WorldSeed::new(3).rng());
        assert!(curve.iter().all(|&y| (42.5..57.5).contains(&y)));
    }
}
