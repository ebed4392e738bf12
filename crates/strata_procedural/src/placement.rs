//! # Retry-Bounded Placement
//!
//! Stochastic siting of rectangles and points. Every proposal is drawn from
//! the caller's stream; a proposal that collides or fails the caller's
//! predicate is thrown away and redrawn, up to a retry budget. Running out
//! of retries just yields fewer instances.

use rand::Rng;
use serde::{Deserialize, Serialize};
use strata_core::{TilePos, TileRect};

use crate::error::{check_non_negative, check_range, PlacementError, PlacementResult};

/// Calls `propose` until it yields a value, at most `max_retries` times.
///
/// Returns `None` once the budget is spent (and immediately for a budget of 0).
pub fn attempt<T>(max_retries: u32, mut propose: impl FnMut() -> Option<T>) -> Option<T> {
    (0..max_retries).find_map(|_| propose())
}

fn check_rect(rect: TileRect) -> PlacementResult<()> {
    TileRect::new(rect.min_x, rect.min_y, rect.max_x, rect.max_y)
        .map(|_| ())
        .map_err(PlacementError::from)
}

/// Settings for [`RoomPlacer`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoomSettings {
    /// Smallest room width.
    pub min_width: i32,
    /// Largest room width.
    pub max_width: i32,
    /// Smallest room height.
    pub min_height: i32,
    /// Largest room height.
    pub max_height: i32,
    /// Free cells kept between rooms.
    pub spacing: i32,
    /// Proposals per room before giving up on it.
    pub max_retries: u32,
    /// Rooms lie entirely inside this rectangle.
    pub bounds: TileRect,
}

impl RoomSettings {
    /// Checks ranges and bounds.
    ///
    /// # Errors
    ///
    /// Returns `InvalidRange` for min > max, `InvalidValue` for non-positive
    /// sizes or negative spacing, and `Core(InvertedRect)` for bad bounds.
    pub fn validate(&self) -> PlacementResult<()> {
        check_range("room width", self.min_width, self.max_width)?;
        check_range("room height", self.min_height, self.max_height)?;
        if self.min_width < 1 || self.min_height < 1 {
            return Err(PlacementError::InvalidValue {
                what: "room size",
                value: f64::from(self.min_width.min(self.min_height)),
            });
        }
        if self.spacing < 0 {
            return Err(PlacementError::InvalidValue {
                what: "room spacing",
                value: f64::from(self.spacing),
            });
        }
        check_rect(self.bounds)
    }
}

/// Places non-overlapping rectangular rooms.
#[derive(Clone, Debug)]
pub struct RoomPlacer {
    settings: RoomSettings,
    rooms: Vec<TileRect>,
}

impl RoomPlacer {
    /// Creates a placer.
    ///
    /// # Errors
    ///
    /// Returns the validation error of `settings`.
    pub fn new(settings: RoomSettings) -> PlacementResult<Self> {
        settings.validate()?;
        Ok(Self {
            settings,
            rooms: Vec::new(),
        })
    }

    /// Rooms accepted so far, in placement order.
    #[must_use]
    pub fn rooms(&self) -> &[TileRect] {
        &self.rooms
    }

    /// Consumes the placer, returning its rooms.
    #[must_use]
    pub fn into_rooms(self) -> Vec<TileRect> {
        self.rooms
    }

    fn propose<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<TileRect> {
        let s = &self.settings;
        let width = rng.gen_range(s.min_width..=s.max_width);
        let height = rng.gen_range(s.min_height..=s.max_height);
        if width > s.bounds.width() || height > s.bounds.height() {
            return None;
        }
        let x = rng.gen_range(s.bounds.min_x..=s.bounds.max_x - width + 1);
        let y = rng.gen_range(s.bounds.min_y..=s.bounds.max_y - height + 1);
        Some(TileRect::from_size(x, y, width as u32, height as u32))
    }

    /// Tries to place one more room.
    ///
    /// A proposal is rejected if it comes within `spacing` of an accepted
    /// room or if `fits` returns false for it.
    pub fn place<R: Rng + ?Sized>(
        &mut self,
        rng: &mut R,
        mut fits: impl FnMut(&TileRect) -> bool,
    ) -> Option<TileRect> {
        let spacing = self.settings.spacing;
        let room = attempt(self.settings.max_retries, || {
            let room = self.propose(rng)?;
            if self
                .rooms
                .iter()
                .any(|r| r.expanded(spacing).intersects(&room))
            {
                return None;
            }
            fits(&room).then_some(room)
        })?;
        self.rooms.push(room);
        Some(room)
    }

    /// Tries to place `count` rooms and returns how many were accepted.
    pub fn place_many<R: Rng + ?Sized>(
        &mut self,
        count: usize,
        rng: &mut R,
        mut fits: impl FnMut(&TileRect) -> bool,
    ) -> usize {
        let before = self.rooms.len();
        for _ in 0..count {
            if self.place(rng, &mut fits).is_none() {
                tracing::debug!(
                    placed = self.rooms.len() - before,
                    requested = count,
                    "room placement exhausted retries"
                );
            }
        }
        self.rooms.len() - before
    }
}

/// Settings for [`scatter_points`].
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct PointSettings {
    /// Points requested.
    pub count: usize,
    /// Points lie inside this rectangle.
    pub region: TileRect,
    /// Minimum Euclidean distance between any two points.
    pub min_spacing: f64,
    /// Proposals per point before giving up on it.
    pub max_retries: u32,
}

/// Scatters points with a minimum spacing and a caller predicate.
///
/// # Errors
///
/// Returns `Core(InvertedRect)` for an inverted region and `InvalidValue`
/// for a negative or non-finite spacing.
pub fn scatter_points<R: Rng + ?Sized>(
    settings: &PointSettings,
    rng: &mut R,
    mut accept: impl FnMut(TilePos) -> bool,
) -> PlacementResult<Vec<TilePos>> {
    check_rect(settings.region)?;
    check_non_negative("point spacing", settings.min_spacing)?;

    let region = settings.region;
    let spacing_sq = settings.min_spacing * settings.min_spacing;
    let mut points: Vec<TilePos> = Vec::with_capacity(settings.count);

    for _ in 0..settings.count {
        let found = attempt(settings.max_retries, || {
            let pos = TilePos::new(
                rng.gen_range(region.min_x..=region.max_x),
                rng.gen_range(region.min_y..=region.max_y),
            );
            let crowded = points
                .iter()
                .any(|p| (p.distance_squared(pos) as f64) < spacing_sq);
            (!crowded && accept(pos)).then_some(pos)
        });
        match found {
            Some(pos) => points.push(pos),
            None => tracing::debug!(
                placed = points.len(),
                requested = settings.count,
                "point placement exhausted retries"
            ),
        }
    }
    Ok(points)
}
