//! Host environment interface.
//!
//! Potential-context estimation enumerates values from host catalogs rather
//! than from any one subject. The live server may not exist yet (or any more),
//! so it is exposed as an `Option` and callers must handle its absence.

pub mod memory;

use std::sync::Arc;

use permctx_core::ResourceKey;

/// A running server instance.
pub trait ServerHandle: Send + Sync {
    /// Identifiers of every currently loaded world.
    fn worlds(&self) -> Vec<ResourceKey>;
}

/// Catalog access into the host environment.
pub trait Host: Send + Sync {
    /// Every registered game mode.
    fn game_modes(&self) -> Vec<ResourceKey>;

    /// Every registered dimension type.
    fn dimension_types(&self) -> Vec<ResourceKey>;

    /// The primary server, if it is currently available.
    fn server(&self) -> Option<Arc<dyn ServerHandle>>;
}
