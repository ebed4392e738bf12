//! # STRATA Loot
//!
//! Chest contents from named, weighted, nestable loot tables.
//!
//! ## Core Components
//!
//! - `LootRegistry`: items, slots and chest templates loaded from TOML
//! - `LootResolver`: expands a template into item stacks
//!
//! ## Example
//!
//! ```rust,ignore
//! use strata_loot::{LootRegistry, LootResolver};
//!
//! let registry = LootRegistry::from_path("data/loot/cavern.toml")?;
//! let resolver = LootResolver::new(&registry);
//! let items = resolver.resolve_chest("cavern", 40, &mut rng)?;
//! ```

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::perf)]

pub mod defs;
pub mod error;
pub mod registry;
pub mod resolver;

pub use defs::{ChestTemplate, EntryTarget, ItemDef, ItemSlot, SlotEntry, SlotRef};
pub use error::{LootError, LootResult};
pub use registry::LootRegistry;
pub use resolver::{LootResolver, MAX_SLOT_DEPTH};
