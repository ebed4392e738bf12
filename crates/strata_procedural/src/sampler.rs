//! # Weighted Sampler
//!
//! Picks an index from a list of weights with probability proportional to
//! each weight's share of the total mass.
//!
//! ## Draw Discipline
//!
//! Exactly one uniform value is consumed per call, whatever the input.
//! An empty list or a list with no positive mass still burns its draw, so
//! the stream position after a call never depends on the weights.

use rand::Rng;

/// Returns true if a weight contributes mass.
#[inline]
fn has_mass(weight: f64) -> bool {
    weight.is_finite() && weight > 0.0
}

/// Selects an index proportionally to `weights`.
///
/// Negative, zero and non-finite weights carry no mass. Returns `None` when
/// nothing carries mass.
pub fn select_weighted<R: Rng + ?Sized>(weights: &[f64], rng: &mut R) -> Option<usize> {
    let draw: f64 = rng.gen();

    let total: f64 = weights.iter().copied().filter(|w| has_mass(*w)).sum();
    if !has_mass(total) {
        return None;
    }

    let mut cumulative = 0.0;
    let mut last_positive = None;
    for (index, &weight) in weights.iter().enumerate() {
        if !has_mass(weight) {
            continue;
        }
        last_positive = Some(index);
        cumulative += weight / total;
        if cumulative > draw {
            return Some(index);
        }
    }

    // Rounding left the cumulative share just under the draw.
    last_positive
}

/// Values paired with selection weights.
#[derive(Clone, Debug, PartialEq)]
pub struct WeightedTable<T> {
    values: Vec<T>,
    weights: Vec<f64>,
}

impl<T> WeightedTable<T> {
    /// Creates an empty table.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            values: Vec::new(),
            weights: Vec::new(),
        }
    }

    /// Adds a value.
    pub fn push(&mut self, value: T, weight: f64) {
        self.values.push(value);
        self.weights.push(weight);
    }

    /// Builder form of [`push`](Self::push).
    #[must_use]
    pub fn with(mut self, value: T, weight: f64) -> Self {
        self.push(value, weight);
        self
    }

    /// Picks a value. Consumes exactly one draw.
    pub fn choose<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<&T> {
        select_weighted(&self.weights, rng).map(|i| &self.values[i])
    }

    /// Sum of all weights that carry mass.
    #[must_use]
    pub fn total_weight(&self) -> f64 {
        self.weights.iter().copied().filter(|w| has_mass(*w)).sum()
    }

    /// Number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Returns true if the table has no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl<T> Default for WeightedTable<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> FromIterator<(T, f64)> for WeightedTable<T> {
    fn from_iter<I: IntoIterator<Item = (T, f64)>>(iter: I) -> Self {
        let mut table = Self::new();
        for (value, weight) in iter {
            table.push(value, weight);
        }
        table
    }
}
