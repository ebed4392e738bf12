//! # STRATA Procedural Primitives
//!
//! Deterministic building blocks that generation stages are made of.
//!
//! ## Design Principles
//!
//! 1. **Deterministic**: Same seed always produces the same world
//! 2. **Explicit streams**: Every random draw comes from a `&mut` RNG handle
//! 3. **Best effort**: Placement retries a bounded number of times, then moves on
//! 4. **Protected writes**: Brushes write through the world's protection overlay
//!
//! ## Core Components
//!
//! - `select_weighted`: Proportional index selection
//! - `generate_1d` / `generate_octave_1d`: Cosine-interpolated noise curves
//! - `RoomPlacer` / `scatter_points`: Non-overlapping rectangles and spaced points
//! - `Brush` / `carve_tunnel`: Random-walk carving and filling
//! - `BoundaryShaper`: Ceiling and floor curves for a band of rows
//!
//! ## Example
//!
//! ```rust,ignore
//! use strata_procedural::{generate_octave_1d, OctaveSettings, WorldSeed};
//!
//! let mut rng = WorldSeed::new(42).rng();
//! let hills = generate_octave_1d(&OctaveSettings::new(120, 30.0, 5), 4200, &mut rng);
//! assert_eq!(hills.len(), 4200);
//! ```

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::perf)]

pub mod boundary;
pub mod brush;
pub mod error;
pub mod noise;
pub mod placement;
pub mod sampler;
pub mod seed;

pub use boundary::{surface_curve, Boundary, BoundaryShaper, BoundarySettings, SurfaceSettings};
pub use brush::{carve_tunnel, Brush, BrushMode, BrushSettings, Stroke, TunnelOutcome};
pub use error::{PlacementError, PlacementResult};
pub use noise::{cosine_ease, generate_1d, generate_octave_1d, OctaveSettings};
pub use placement::{attempt, scatter_points, PointSettings, RoomPlacer, RoomSettings};
pub use sampler::{select_weighted, WeightedTable};
pub use seed::{child_rng, GenRng, WorldSeed};
