//! Calculator registry.
//!
//! Holds the ordered collection of [`ContextCalculator`]s. Reads take an
//! `Arc` snapshot of the current vector, so a query iterates a stable list
//! while registrations publish a new one; no lock is held while calculators
//! run. Order is registration order, which keeps merge results reproducible.

use std::sync::Arc;

use arc_swap::ArcSwap;
use parking_lot::Mutex;
use tracing::debug;

use crate::calculator::ContextCalculator;
use crate::errors::EngineError;

/// Immutable view of the registered calculators at one point in time.
pub type CalculatorSnapshot = Arc<Vec<Arc<dyn ContextCalculator>>>;

/// Registry of context calculators.
pub struct CalculatorRegistry {
    calculators: ArcSwap<Vec<Arc<dyn ContextCalculator>>>,
    /// Serializes writers; readers never touch it.
    write_lock: Mutex<()>,
}

impl CalculatorRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self {
            calculators: ArcSwap::from_pointee(Vec::new()),
            write_lock: Mutex::new(()),
        }
    }

    /// Append a calculator.
    ///
    /// Names must be unique; registering a second calculator under a taken
    /// name is rejected.
    pub fn register(&self, calculator: Arc<dyn ContextCalculator>) -> Result<(), EngineError> {
        let _guard = self.write_lock.lock();
        let current = self.calculators.load_full();
        let name = calculator.name().to_string();
        if current.iter().any(|c| c.name() == name) {
            return Err(EngineError::DuplicateCalculator(name));
        }

        let mut next = Vec::with_capacity(current.len() + 1);
        next.extend(current.iter().cloned());
        next.push(calculator);
        self.calculators.store(Arc::new(next));

        debug!(calculator = %name, "registered context calculator");
        Ok(())
    }

    /// Remove a calculator by name. Returns `true` if one was removed.
    pub fn unregister(&self, name: &str) -> bool {
        let _guard = self.write_lock.lock();
        let current = self.calculators.load_full();
        if !current.iter().any(|c| c.name() == name) {
            return false;
        }

        let next: Vec<_> = current
            .iter()
            .filter(|c| c.name() != name)
            .cloned()
            .collect();
        self.calculators.store(Arc::new(next));

        debug!(calculator = %name, "unregistered context calculator");
        true
    }

    /// The calculators as of now, in registration order.
    pub fn snapshot(&self) -> CalculatorSnapshot {
        self.calculators.load_full()
    }

    /// Registered names, in registration order.
    pub fn names(&self) -> Vec<String> {
        self.calculators
            .load()
            .iter()
            .map(|c| c.name().to_string())
            .collect()
    }

    /// Number of registered calculators.
    pub fn len(&self) -> usize {
        self.calculators.load().len()
    }

    /// Whether no calculators are registered.
    pub fn is_empty(&self) -> bool {
        self.calculators.load().is_empty()
    }
}

impl Default for CalculatorRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for CalculatorRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CalculatorRegistry")
            .field("calculators", &self.names())
            .finish()
    }
}
