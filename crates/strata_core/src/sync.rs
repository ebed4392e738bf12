//! # Shared World Handle
//!
//! A pipeline run needs the world exclusively for its whole duration, so the
//! handle is a plain mutex rather than anything finer grained.
//!
//! ```text
//!   caller ──clone──► SharedWorld ──lock()──► WorldGuard (whole run)
//!                          │
//!                          └──try_lock()──► None while a run holds it
//! ```

use std::sync::Arc;

use parking_lot::{Mutex, MutexGuard};

use crate::world::World;

/// Exclusive guard over a shared world.
pub type WorldGuard<'a> = MutexGuard<'a, World>;

/// A world that can be handed to a background pipeline run.
#[derive(Clone, Debug)]
pub struct SharedWorld {
    inner: Arc<Mutex<World>>,
}

impl SharedWorld {
    /// Wraps a world.
    #[must_use]
    pub fn new(world: World) -> Self {
        Self {
            inner: Arc::new(Mutex::new(world)),
        }
    }

    /// Blocks until the world is free.
    #[must_use]
    pub fn lock(&self) -> WorldGuard<'_> {
        self.inner.lock()
    }

    /// Returns the guard only if no run currently holds the world.
    #[must_use]
    pub fn try_lock(&self) -> Option<WorldGuard<'_>> {
        self.inner.try_lock()
    }

    /// Runs a closure with exclusive access.
    pub fn with<R>(&self, f: impl FnOnce(&mut World) -> R) -> R {
        let mut guard = self.inner.lock();
        f(&mut guard)
    }

    /// Unwraps the world if this is the last handle.
    ///
    /// # Errors
    ///
    /// Returns the handle back if other clones are still alive.
    pub fn into_inner(self) -> Result<World, Self> {
        Arc::try_unwrap(self.inner)
            .map(Mutex::into_inner)
            .map_err(|inner| Self { inner })
    }
}

impl From<World> for SharedWorld {
    fn from(world: World) -> Self {
        Self::new(world)
    }
}
