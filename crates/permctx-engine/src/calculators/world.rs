//! Location-based contexts.
//!
//! Emits the subject's dimension type, and for server-hosted worlds the world
//! name after it has been through the configured [`RewriteTable`].

use std::sync::Arc;

use arc_swap::ArcSwap;
use permctx_core::keys::{DIMENSION_TYPE_KEY, WORLD_KEY};
use permctx_core::{ContextConsumer, ContextSet, ContextSetBuilder, RewriteTable, Subject};
use tracing::debug;

use crate::calculator::ContextCalculator;
use crate::host::Host;

/// Rewrite table shared with the configuration owner, swappable on reload.
pub type SharedRewrites = Arc<ArcSwap<RewriteTable>>;

/// Wrap a table for sharing.
pub fn shared_rewrites(table: RewriteTable) -> SharedRewrites {
    Arc::new(ArcSwap::from_pointee(table))
}

/// Contributes `dimension-type` and `world`.
pub struct WorldCalculator {
    host: Arc<dyn Host>,
    rewrites: SharedRewrites,
}

impl WorldCalculator {
    /// Calculator name in the registry.
    pub const NAME: &'static str = "world";

    /// Create a calculator reading catalogs from `host`.
    pub fn new(host: Arc<dyn Host>, rewrites: SharedRewrites) -> Self {
        Self { host, rewrites }
    }
}

impl ContextCalculator for WorldCalculator {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn calculate(&self, subject: &dyn Subject, consumer: &mut dyn ContextConsumer) {
        let Some(world) = subject.location() else {
            return;
        };

        consumer.accept(DIMENSION_TYPE_KEY, &world.dimension_type.context_name());
        if world.is_server_hosted() {
            self.rewrites
                .load()
                .rewrite_and_submit(WORLD_KEY, &world.key.context_name(), consumer);
        }
    }

    fn estimate_potential_contexts(&self) -> ContextSet {
        let mut builder = ContextSetBuilder::new();
        for dimension in self.host.dimension_types() {
            builder.add(DIMENSION_TYPE_KEY, &dimension.context_name());
        }

        match self.host.server() {
            Some(server) => {
                let rewrites = self.rewrites.load();
                for world in server.worlds() {
                    let name = world.context_name();
                    for value in rewrites.rewrite(&name) {
                        builder.add(WORLD_KEY, value);
                    }
                }
            }
            None => debug!("server unavailable, skipping world estimation"),
        }

        builder.build()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::memory::{MemoryHost, MemorySubject};
    use permctx_core::{ResourceKey, SubjectId, WorldView};

    fn key(s: &str) -> ResourceKey {
        ResourceKey::parse(s).unwrap()
    }

    fn calculator(host: Arc<MemoryHost>, table: RewriteTable) -> WorldCalculator {
        WorldCalculator::new(host, shared_rewrites(table))
    }

    fn contexts(calc: &WorldCalculator, subject: &MemorySubject) -> ContextSet {
        let mut builder = ContextSetBuilder::new();
        calc.calculate(subject, &mut builder);
        builder.build()
    }

    #[test]
    fn server_world_emits_dimension_and_world() {
        let calc = calculator(Arc::new(MemoryHost::vanilla()), RewriteTable::default());
        let subject = MemorySubject::new(SubjectId::new())
            .with_location(WorldView::server(key("arena"), key("overworld")));
        let set = contexts(&calc, &subject);
        assert!(set.contains("dimension-type", "overworld"));
        assert!(set.contains("world", "arena"));
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn client_world_skips_world_key() {
        let calc = calculator(Arc::new(MemoryHost::vanilla()), RewriteTable::default());
        let subject = MemorySubject::new(SubjectId::new())
            .with_location(WorldView::client(key("local"), key("the_end")));
        let set = contexts(&calc, &subject);
        assert!(set.contains("dimension-type", "the_end"));
        assert!(!set.contains_key("world"));
    }

    #[test]
    fn no_location_contributes_nothing() {
        let calc = calculator(Arc::new(MemoryHost::vanilla()), RewriteTable::default());
        let subject = MemorySubject::new(SubjectId::new());
        assert!(contexts(&calc, &subject).is_empty());
    }

    #[test]
    fn world_name_is_rewritten() {
        let table = RewriteTable::new([("east_server", vec!["region:east"])]);
        let calc = calculator(Arc::new(MemoryHost::vanilla()), table);
        let subject = MemorySubject::new(SubjectId::new())
            .with_location(WorldView::server(key("east_server"), key("overworld")));
        let set = contexts(&calc, &subject);
        assert!(set.contains("world", "region:east"));
        assert!(!set.contains("world", "east_server"));
    }

    #[test]
    fn foreign_namespace_world_is_qualified() {
        let calc = calculator(Arc::new(MemoryHost::vanilla()), RewriteTable::default());
        let subject = MemorySubject::new(SubjectId::new())
            .with_location(WorldView::server(key("mymod:arena"), key("mymod:void")));
        let set = contexts(&calc, &subject);
        assert!(set.contains("world", "mymod:arena"));
        assert!(set.contains("dimension-type", "mymod:void"));
    }

    #[test]
    fn table_swap_applies_to_next_calculation() {
        let rewrites = shared_rewrites(RewriteTable::default());
        let calc = WorldCalculator::new(Arc::new(MemoryHost::vanilla()), Arc::clone(&rewrites));
        let subject = MemorySubject::new(SubjectId::new())
            .with_location(WorldView::server(key("arena"), key("overworld")));
        assert!(contexts(&calc, &subject).contains("world", "arena"));

        rewrites.store(Arc::new(RewriteTable::new([("arena", vec!["pvp"])])));
        assert!(contexts(&calc, &subject).contains("world", "pvp"));
    }

    #[test]
    fn estimate_without_server_has_only_dimensions() {
        let calc = calculator(Arc::new(MemoryHost::vanilla()), RewriteTable::default());
        let estimate = calc.estimate_potential_contexts();
        assert_eq!(estimate.values("dimension-type").count(), 3);
        assert!(!estimate.contains_key("world"));
    }

    #[test]
    fn estimate_with_server_lists_rewritten_worlds() {
        let host = Arc::new(MemoryHost::vanilla());
        let _server = host.start_server([key("east_server"), key("lobby"), key("hidden")]);
        let table = RewriteTable::new([
            ("east_server", vec!["region:east"]),
            ("hidden", Vec::new()),
        ]);
        let calc = calculator(host, table);
        let estimate = calc.estimate_potential_contexts();
        let worlds: Vec<_> = estimate.values("world").collect();
        assert_eq!(worlds, vec!["lobby", "region:east"]);
    }

    #[test]
    fn estimate_skips_invalid_world_names() {
        let host = Arc::new(MemoryHost::vanilla());
        let _server = host.start_server([
            ResourceKey::new("minecraft", "a=b"),
            key("ok"),
            ResourceKey::new("mymod", "tab\tworld"),
        ]);
        let calc = calculator(host, RewriteTable::default());
        let estimate = calc.estimate_potential_contexts();
        assert_eq!(estimate.values("world").collect::<Vec<_>>(), vec!["ok"]);
        assert_eq!(estimate.values("dimension-type").count(), 3);
    }
}
