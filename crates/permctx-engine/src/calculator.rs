//! Context calculator trait.
//!
//! Defines the [`ContextCalculator`] trait every context source implements.
//! Calculators are registered with the
//! [`CalculatorRegistry`](crate::registry::CalculatorRegistry) and driven by the
//! [`ContextManager`](crate::manager::ContextManager).

use permctx_core::{ContextConsumer, ContextSet, Subject};

/// A source of contexts for subjects.
///
/// # Contract
///
/// - [`calculate`](ContextCalculator::calculate) reads the subject's current,
///   host-owned state and pushes zero or more pairs into the consumer. A
///   missing capability means no contributions. It must not block.
/// - [`estimate_potential_contexts`](ContextCalculator::estimate_potential_contexts)
///   enumerates the values this calculator could produce, from host catalogs
///   rather than any one subject. It is an approximation: it may miss values
///   or include ones never seen. It must not block or fail; the worst case is
///   an empty set.
pub trait ContextCalculator: Send + Sync {
    /// Unique name within a registry.
    fn name(&self) -> &str;

    /// Contribute the subject's current contexts.
    fn calculate(&self, subject: &dyn Subject, consumer: &mut dyn ContextConsumer);

    /// Every context this calculator might plausibly produce.
    fn estimate_potential_contexts(&self) -> ContextSet {
        ContextSet::empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use permctx_core::{ContextSetBuilder, SubjectId};

    struct Fixed;

    impl ContextCalculator for Fixed {
        fn name(&self) -> &str {
            "fixed"
        }
        fn calculate(&self, _subject: &dyn Subject, consumer: &mut dyn ContextConsumer) {
            consumer.accept("server", "lobby");
        }
    }

    struct Anonymous(SubjectId);

    impl Subject for Anonymous {
        fn id(&self) -> &SubjectId {
            &self.0
        }
    }

    #[test]
    fn default_estimate_is_empty() {
        assert!(Fixed.estimate_potential_contexts().is_empty());
    }

    #[test]
    fn calculate_pushes_into_consumer() {
        let mut builder = ContextSetBuilder::new();
        Fixed.calculate(&Anonymous(SubjectId::new()), &mut builder);
        assert!(builder.build().contains("server", "lobby"));
    }
}
