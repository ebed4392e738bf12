//! # Placement Error Types

use strata_core::CoreError;
use thiserror::Error;

/// Errors raised by placement primitives.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PlacementError {
    /// A min/max pair where min > max.
    #[error("invalid {what} range: {min} > {max}")]
    InvalidRange {
        /// Which setting.
        what: &'static str,
        /// Lower bound.
        min: f64,
        /// Upper bound.
        max: f64,
    },

    /// A setting outside its allowed domain (negative, zero or not finite).
    #[error("invalid {what}: {value}")]
    InvalidValue {
        /// Which setting.
        what: &'static str,
        /// The offending value.
        value: f64,
    },

    /// The region is too small for the requested shape.
    #[error("infeasible boundary: {room} rows of room left")]
    Infeasible {
        /// Remaining vertical room (negative).
        room: f64,
    },

    /// A target curve with no columns.
    #[error("target curve is empty")]
    EmptyCurve,

    /// A grid write failed.
    #[error(transparent)]
    Core(#[from] CoreError),
}

impl PlacementError {
    /// Returns true for geometric infeasibility, which a stage reports as a
    /// failed run rather than an error.
    #[must_use]
    pub const fn is_infeasible(&self) -> bool {
        matches!(self, Self::Infeasible { .. })
    }
}

/// Result type for placement operations.
pub type PlacementResult<T> = Result<T, PlacementError>;

/// Checks a min/max pair.
pub(crate) fn check_range<T: Into<f64> + PartialOrd + Copy>(
    what: &'static str,
    min: T,
    max: T,
) -> PlacementResult<()> {
    if min > max {
        return Err(PlacementError::InvalidRange {
            what,
            min: min.into(),
            max: max.into(),
        });
    }
    Ok(())
}

/// Checks that a value is finite and not negative.
pub(crate) fn check_non_negative(what: &'static str, value: f64) -> PlacementResult<()> {
    if !value.is_finite() || value < 0.0 {
        return Err(PlacementError::InvalidValue { what, value });
    }
    Ok(())
}
