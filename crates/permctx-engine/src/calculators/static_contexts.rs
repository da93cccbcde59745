//! Fixed contexts applied to every subject.

use permctx_core::{ContextConsumer, ContextSet, Subject};

use crate::calculator::ContextCalculator;

/// Contributes a configured set of contexts regardless of the subject.
pub struct StaticCalculator {
    contexts: ContextSet,
}

impl StaticCalculator {
    /// Calculator name in the registry.
    pub const NAME: &'static str = "static";

    /// Create a calculator that always contributes `contexts`.
    pub fn new(contexts: ContextSet) -> Self {
        Self { contexts }
    }
}

impl ContextCalculator for StaticCalculator {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn calculate(&self, _subject: &dyn Subject, consumer: &mut dyn ContextConsumer) {
        consumer.accept_all(&self.contexts);
    }

    fn estimate_potential_contexts(&self) -> ContextSet {
        self.contexts.clone()
    }
}
