//! # Generation Context
//!
//! The state stages share besides the world itself: the run's single random
//! stream, two well-known levels and a named value bus.
//!
//! ## Bus
//!
//! ```text
//!   terrain ──publish("SurfaceHeight", FloatArray)──┐
//!   cavern  ──publish("CavernTop", FloatArray)──────┤
//!                                                   ▼
//!                                          HashMap<String, BusValue>
//!                                                   │
//!   tunnels ◄──float_array("SurfaceHeight")?────────┘
//! ```
//!
//! Values are overwritten by name. Reading a name nobody published, or
//! reading it with the wrong getter, is an error and never a default.

use std::collections::HashMap;

use strata_procedural::{GenRng, WorldSeed};

use crate::error::{ContextError, ContextResult};

/// Well-known bus names.
pub mod keys {
    /// Surface row per column (`FloatArray`).
    pub const SURFACE_HEIGHT: &str = "SurfaceHeight";
    /// Cavern ceiling row per column (`FloatArray`).
    pub const CAVERN_TOP: &str = "CavernTop";
    /// Cavern floor row per column (`FloatArray`).
    pub const CAVERN_BOTTOM: &str = "CavernBottom";
    /// Rooms placed (`Int`).
    pub const ROOM_COUNT: &str = "RoomCount";
}

/// Fraction of the world height where the surface sits before any terrain
/// stage has run.
pub const DEFAULT_SURFACE_FRACTION: f64 = 0.3;

/// A value on the bus.
#[derive(Clone, Debug, PartialEq)]
pub enum BusValue {
    /// Integer.
    Int(i64),
    /// Float.
    Float(f64),
    /// One float per column, usually.
    FloatArray(Vec<f64>),
    /// Free text.
    Text(String),
}

impl BusValue {
    /// Variant name used in type mismatch errors.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Int(_) => "int",
            Self::Float(_) => "float",
            Self::FloatArray(_) => "float array",
            Self::Text(_) => "text",
        }
    }
}

impl From<i64> for BusValue {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<f64> for BusValue {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

impl From<Vec<f64>> for BusValue {
    fn from(value: Vec<f64>) -> Self {
        Self::FloatArray(value)
    }
}

impl From<String> for BusValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<&str> for BusValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

/// Shared state of one pipeline run.
#[derive(Clone, Debug)]
pub struct GenerationContext {
    seed: WorldSeed,
    rng: GenRng,
    /// Row of the world surface.
    pub surface_level: f64,
    /// Row players respawn at.
    pub respawn_level: f64,
    bus: HashMap<String, BusValue>,
}

impl GenerationContext {
    /// Creates a context for a seed.
    #[must_use]
    pub fn new(seed: u64) -> Self {
        Self::with_seed(WorldSeed::new(seed))
    }

    /// Creates a context for a derived seed.
    #[must_use]
    pub fn with_seed(seed: WorldSeed) -> Self {
        Self {
            seed,
            rng: seed.rng(),
            surface_level: 0.0,
            respawn_level: 0.0,
            bus: HashMap::new(),
        }
    }

    /// The current seed.
    #[inline]
    #[must_use]
    pub const fn seed(&self) -> WorldSeed {
        self.seed
    }

    /// Replaces the seed and restarts the stream from it.
    pub fn set_seed(&mut self, seed: u64) {
        self.seed = WorldSeed::new(seed);
        self.rng = self.seed.rng();
    }

    /// The run's random stream.
    #[inline]
    pub fn rng(&mut self) -> &mut GenRng {
        &mut self.rng
    }

    /// Prepares for a fresh run over a world `height` rows tall: restarts
    /// the stream, empties the bus and resets both levels.
    pub fn reset_for_run(&mut self, height: usize) {
        self.rng = self.seed.rng();
        self.bus.clear();
        self.surface_level = height as f64 * DEFAULT_SURFACE_FRACTION;
        self.respawn_level = self.surface_level;
    }

    /// Publishes a value, replacing any previous one under the name.
    pub fn publish(&mut self, key: impl Into<String>, value: impl Into<BusValue>) {
        self.bus.insert(key.into(), value.into());
    }

    /// Returns true if something was published under the name.
    #[must_use]
    pub fn contains(&self, key: &str) -> bool {
        self.bus.contains_key(key)
    }

    /// Number of published values.
    #[must_use]
    pub fn len(&self) -> usize {
        self.bus.len()
    }

    /// Returns true if nothing was published.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bus.is_empty()
    }

    /// Looks up a value of any variant.
    ///
    /// # Errors
    ///
    /// Returns `MissingKey` if nothing was published under the name.
    pub fn get(&self, key: &str) -> ContextResult<&BusValue> {
        self.bus
            .get(key)
            .ok_or_else(|| ContextError::MissingKey(key.to_string()))
    }

    /// Looks up an integer.
    ///
    /// # Errors
    ///
    /// Returns `MissingKey` or `TypeMismatch`.
    pub fn int(&self, key: &str) -> ContextResult<i64> {
        match self.get(key)? {
            BusValue::Int(v) => Ok(*v),
            other => Err(mismatch(key, "int", other)),
        }
    }

    /// Looks up a float.
    ///
    /// # Errors
    ///
    /// Returns `MissingKey` or `TypeMismatch`.
    pub fn float(&self, key: &str) -> ContextResult<f64> {
        match self.get(key)? {
            BusValue::Float(v) => Ok(*v),
            other => Err(mismatch(key, "float", other)),
        }
    }

    /// Looks up a float array.
    ///
    /// # Errors
    ///
    /// Returns `MissingKey` or `TypeMismatch`.
    pub fn float_array(&self, key: &str) -> ContextResult<&[f64]> {
        match self.get(key)? {
            BusValue::FloatArray(v) => Ok(v),
            other => Err(mismatch(key, "float array", other)),
        }
    }

    /// Looks up text.
    ///
    /// # Errors
    ///
    /// Returns `MissingKey` or `TypeMismatch`.
    pub fn text(&self, key: &str) -> ContextResult<&str> {
        match self.get(key)? {
            BusValue::Text(v) => Ok(v),
            other => Err(mismatch(key, "text", other)),
        }
    }
}

impl Default for GenerationContext {
    fn default() -> Self {
        Self::with_seed(WorldSeed::default())
    }
}

fn mismatch(key: &str, expected: &'static str, found: &BusValue) -> ContextError {
    ContextError::TypeMismatch {
        key: key.to_string(),
        expected,
        found: found.kind(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::Rng;

    #[test]
    fn test_missing_key_is_an_error() {
        let ctx = GenerationContext::new(1);
        assert_eq!(
            ctx.float_array(keys::SURFACE_HEIGHT),
            Err(ContextError::MissingKey("SurfaceHeight".to_string()))
        );
    }

    #[test]
    fn test_wrong_getter_is_an_error() {
        let mut ctx = GenerationContext::new(1);
        ctx.publish(keys::ROOM_COUNT, 7_i64);

        assert_eq!(ctx.int(keys::ROOM_COUNT), Ok(7));
        let err = ctx.float(keys::ROOM_COUNT).unwrap_err();
        assert_eq!(
            err,
            ContextError::TypeMismatch {
                key: "RoomCount".to_string(),
                expected: "float",
                found: "int",
            }
        );
    }

    #[test]
    fn test_publish_overwrites() {
        let mut ctx = GenerationContext::new(1);
        ctx.publish("Biome", "desert");
        ctx.publish("Biome", "jungle");
        assert_eq!(ctx.text("Biome"), Ok("jungle"));
        assert_eq!(ctx.len(), 1);
    }

    #[test]
    fn test_set_seed_restarts_stream() {
        let mut ctx = GenerationContext::new(9);
        let first: u64 = ctx.rng().gen();
        ctx.set_seed(9);
        let again: u64 = ctx.rng().gen();
        assert_eq!(first, again);
    }

    #[test]
    fn test_reset_for_run() {
        let mut ctx = GenerationContext::new(3);
        ctx.publish(keys::CAVERN_TOP, vec![1.0, 2.0]);
        ctx.surface_level = 12.0;
        let _: u32 = ctx.rng().gen();

        ctx.reset_for_run(200);

        assert!(ctx.is_empty());
        assert!((ctx.surface_level - 60.0).abs() < f64::EPSILON);
        assert!((ctx.respawn_level - 60.0).abs() < f64::EPSILON);
        let mut fresh = WorldSeed::new(3).rng();
        assert_eq!(ctx.rng().gen::<u64>(), fresh.gen::<u64>());
    }
}
