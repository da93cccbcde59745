//! # permctx-engine
//!
//! Context resolution for permission subjects.
//!
//! - [`ContextCalculator`]: polymorphic unit that contributes contexts for a
//!   subject and estimates every value it could ever produce
//! - [`CalculatorRegistry`]: read-mostly, snapshot-iterated set of calculators
//! - [`ContextManager`]: aggregates calculators into one [`ContextSet`] per
//!   subject, caches it, and exposes the lazy invalidation entry point
//! - [`calculators`]: world, game mode and static calculators
//! - [`host`]: the catalog/server interface the host environment implements
//!
//! ## Invalidation
//!
//! [`ContextManager::signal_context_update`] only bumps a generation counter.
//! The next [`ContextManager::query`] recomputes, so a burst of signals costs
//! one recomputation, and a signal that lands mid-recomputation leaves the
//! entry stale rather than being lost.
//!
//! [`ContextSet`]: permctx_core::ContextSet

#![deny(unsafe_code)]

pub mod calculator;
pub mod calculators;
pub mod errors;
pub mod host;
pub mod manager;
pub mod registry;

pub use calculator::ContextCalculator;
pub use errors::EngineError;
pub use host::{Host, ServerHandle};
pub use manager::{CacheState, ContextManager, ManagerStats};
pub use registry::CalculatorRegistry;

use std::sync::{Arc, OnceLock};

/// Process-wide context manager, installed once during platform integration.
static CONTEXT_MANAGER: OnceLock<Arc<ContextManager>> = OnceLock::new();

/// Install the process-wide context manager.
pub fn init_context_manager(manager: Arc<ContextManager>) -> Result<(), EngineError> {
    CONTEXT_MANAGER
        .set(manager)
        .map_err(|_| EngineError::AlreadyInitialized)
}

/// The process-wide context manager, if one has been installed.
pub fn context_manager() -> Option<Arc<ContextManager>> {
    CONTEXT_MANAGER.get().cloned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn global_manager_initializes_once() {
        let manager = Arc::new(ContextManager::new());
        // Only this test touches the global.
        init_context_manager(Arc::clone(&manager)).unwrap();
        assert!(Arc::ptr_eq(&context_manager().unwrap(), &manager));
        assert_matches!(
            init_context_manager(Arc::new(ContextManager::new())),
            Err(EngineError::AlreadyInitialized)
        );
    }
}
