//! # 1D Cosine Noise
//!
//! Keyframed value noise along one axis. Keyframes are drawn every
//! `wave_length` columns and joined with a raised-cosine ease, which gives
//! rolling hills without the flat spots of linear interpolation.
//!
//! ```text
//!  amplitude ┤        k1
//!            │      ╱‾‾‾╲
//!            │ k0 ╱      ╲        k3
//!            │‾‾‾‾         ╲____╱‾‾
//!          0 ┤                k2
//!            └────┬────┬────┬────┬──
//!                 0   wl   2wl  3wl
//! ```
//!
//! ## Guarantees
//!
//! - At every segment boundary the curve equals its keyframe exactly
//! - Inside a segment the curve stays between the two bounding keyframes
//! - Output length always equals the requested width

use std::f64::consts::PI;

use rand::{Rng, RngCore};
use serde::{Deserialize, Serialize};

use crate::error::{check_non_negative, PlacementError, PlacementResult};
use crate::seed::child_rng;

/// Raised-cosine ease: 0 at `t = 0`, 1 at `t = 1`, flat at both ends.
#[inline]
#[must_use]
pub fn cosine_ease(t: f64) -> f64 {
    (1.0 - (PI * t).cos()) * 0.5
}

/// Generates one noise curve of `width` samples in `[0, amplitude)`.
///
/// A `wave_length` of zero is treated as one. One keyframe is drawn per
/// segment boundary, including the trailing boundary of the last segment.
pub fn generate_1d<R: Rng + ?Sized>(
    wave_length: usize,
    width: usize,
    amplitude: f64,
    rng: &mut R,
) -> Vec<f64> {
    let wave_length = wave_length.max(1);
    let mut curve = Vec::with_capacity(width);
    if width == 0 {
        return curve;
    }

    let step = wave_length as f64;
    let mut left = rng.gen::<f64>() * amplitude;
    let mut start = 0;
    while start < width {
        let right = rng.gen::<f64>() * amplitude;
        let end = (start + wave_length).min(width);
        for x in start..end {
            let t = (x - start) as f64 / step;
            curve.push(left + (right - left) * cosine_ease(t));
        }
        left = right;
        start = end;
    }
    curve
}

/// Settings for an octave-summed curve.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OctaveSettings {
    /// Wave length of the first octave, in columns.
    pub wave_length: usize,
    /// Amplitude of the first octave.
    pub amplitude: f64,
    /// Number of octaves summed.
    pub octaves: u32,
    /// Wave length and amplitude are divided by this each octave.
    pub divisor: f64,
}

impl OctaveSettings {
    /// Creates settings with the default divisor of 2.
    #[must_use]
    pub const fn new(wave_length: usize, amplitude: f64, octaves: u32) -> Self {
        Self {
            wave_length,
            amplitude,
            octaves,
            divisor: 2.0,
        }
    }

    /// Checks the amplitude and divisor.
    ///
    /// # Errors
    ///
    /// Returns `InvalidValue` for a negative or non-finite amplitude and for
    /// a divisor that is not a positive finite number.
    pub fn validate(&self) -> PlacementResult<()> {
        check_non_negative("noise amplitude", self.amplitude)?;
        if !self.divisor.is_finite() || self.divisor <= 0.0 {
            return Err(PlacementError::InvalidValue {
                what: "noise divisor",
                value: self.divisor,
            });
        }
        Ok(())
    }

    fn divisor(&self) -> f64 {
        if self.divisor.is_finite() && self.divisor > 0.0 {
            self.divisor
        } else {
            2.0
        }
    }

    /// `(wave_length, amplitude)` of one octave.
    #[must_use]
    pub fn octave(&self, index: u32) -> (usize, f64) {
        let scale = self.divisor().powi(index as i32);
        let wave_length = ((self.wave_length as f64 / scale).round() as usize).max(1);
        (wave_length, self.amplitude / scale)
    }

    /// Upper bound of the summed curve.
    #[must_use]
    pub fn max_amplitude(&self) -> f64 {
        (0..self.octaves).map(|i| self.octave(i).1).sum()
    }
}

impl Default for OctaveSettings {
    fn default() -> Self {
        Self::new(64, 1.0, 4)
    }
}

/// Sums `settings.octaves` noise curves.
///
/// Each octave runs on its own child stream, so the caller's stream advances
/// by exactly one `u64` per octave regardless of width.
pub fn generate_octave_1d<R: RngCore + ?Sized>(
    settings: &OctaveSettings,
    width: usize,
    rng: &mut R,
) -> Vec<f64> {
    let mut total = vec![0.0; width];
    for index in 0..settings.octaves {
        let (wave_length, amplitude) = settings.octave(index);
        let mut octave_rng = child_rng(rng);
        let layer = generate_1d(wave_length, width, amplitude, &mut octave_rng);
        for (sum, value) in total.iter_mut().zip(layer) {
            *sum += value;
        }
    }
    total
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::seed::WorldSeed;

    #[test]
    fn test_keyframes_are_exact() {
        let amplitude = 25.0;
        let wave_length = 8;
        let curve = generate_1d(wave_length, 64, amplitude, &mut WorldSeed::new(42).rng());

        let mut replay = WorldSeed::new(42).rng();
        for k in 0..8 {
            let keyframe = replay.gen::<f64>() * amplitude;
            assert_eq!(curve[k * wave_length], keyframe);
        }
    }

    #[test]
    fn test_interior_between_keyframes() {
        let wave_length = 10;
        let curve = generate_1d(wave_length, 95, 40.0, &mut WorldSeed::new(8).rng());
        let mut replay = WorldSeed::new(8).rng();
        let keyframes: Vec<f64> = (0..11).map(|_| replay.gen::<f64>() * 40.0).collect();

        for (x, &value) in curve.iter().enumerate() {
            let segment = x / wave_length;
            let lo = keyframes[segment].min(keyframes[segment + 1]);
            let hi = keyframes[segment].max(keyframes[segment + 1]);
            assert!(value >= lo - 1e-9 && value <= hi + 1e-9, "x={x} value={value}");
        }
    }

    #[test]
    fn test_zero_wave_length_is_one() {
        let a = generate_1d(0, 16, 3.0, &mut WorldSeed::new(1).rng());
        let b = generate_1d(1, 16, 3.0, &mut WorldSeed::new(1).rng());
        assert_eq!(a, b);
    }

    #[test]
    fn test_width_is_respected() {
        let mut rng = WorldSeed::new(3).rng();
        assert!(generate_1d(16, 0, 1.0, &mut rng).is_empty());
        assert_eq!(generate_1d(16, 17, 1.0, &mut rng).len(), 17);
        assert_eq!(generate_1d(100, 5, 1.0, &mut rng).len(), 5);
    }

    #[test]
    fn test_validate_rejects_bad_amplitude() {
        assert!(OctaveSettings::new(40, 1.0, 3).validate().is_ok());
        for amplitude in [-1.0, f64::NAN, f64::INFINITY] {
            let settings = OctaveSettings::new(40, amplitude, 3);
            assert!(matches!(
                settings.validate(),
                Err(PlacementError::InvalidValue { what: "noise amplitude", .. })
            ));
        }
        let mut settings = OctaveSettings::new(40, 1.0, 3);
        settings.divisor = 0.0;
        assert!(settings.validate().is_err());
    }

    #[test]
    fn test_ease_endpoints() {
        assert!(cosine_ease(0.0).abs() < 1e-12);
        assert!((cosine_ease(1.0) - 1.0).abs() < 1e-12);
        assert!((cosine_ease(0.5) - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_octave_bounds() {
        let settings = OctaveSettings::new(64, 20.0, 4);
        assert!((settings.max_amplitude() - 37.5).abs() < 1e-9);

        let curve = generate_octave_1d(&settings, 300, &mut WorldSeed::new(12).rng());
        assert_eq!(curve.len(), 300);
        assert!(curve.iter().all(|&v| v >= 0.0 && v < settings.max_amplitude()));
    }

    #[test]
    fn test_octave_advances_parent_once_per_octave() {
        let settings = OctaveSettings::new(32, 5.0, 3);
        let mut a = WorldSeed::new(6).rng();
        let mut b = WorldSeed::new(6).rng();

        generate_octave_1d(&settings, 1000, &mut a);
        for _ in 0..3 {
            b.next_u64();
        }
        assert_eq!(a.next_u64(), b.next_u64());
    }

    #[test]
    fn test_octave_wave_length_floor() {
        let settings = OctaveSettings::new(3, 1.0, 6);
        assert_eq!(settings.octave(5).0, 1);
    }
}
