//! Context manager.
//!
//! Aggregates every registered calculator into one [`ContextSet`] per subject
//! and caches it. Each cache entry carries a generation counter:
//!
//! - [`signal_context_update`](ContextManager::signal_context_update) bumps it
//!   and does nothing else
//! - [`query`](ContextManager::query) serves the cached set when it was
//!   computed at the current generation, and otherwise recomputes, tagging the
//!   result with the generation observed *before* computing
//!
//! A signal that lands while a recomputation is in flight therefore leaves the
//! stored result one generation behind, and the next query recomputes again.
//! Lifecycle per subject: `ABSENT → FRESH → STALE → FRESH → … → ABSENT`.

use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use dashmap::DashMap;
use parking_lot::RwLock;
use permctx_core::{ContextSet, ContextSetBuilder, Subject, SubjectId};
use tracing::{debug, instrument, warn};

use crate::calculator::ContextCalculator;
use crate::errors::EngineError;
use crate::registry::CalculatorRegistry;

/// Observable state of one subject's cache entry.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CacheState {
    /// No entry: never queried, or its lifecycle ended.
    Absent,
    /// Entry exists but has not finished a computation yet.
    Pending,
    /// Cached set matches the current generation.
    Fresh,
    /// A signal arrived since the cached set was computed.
    Stale,
}

/// Counters exposed for diagnostics and tests.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ManagerStats {
    /// Full calculator sweeps performed by `query`.
    pub recomputations: u64,
    /// Queries answered from cache.
    pub cache_hits: u64,
    /// Signals that invalidated an existing entry.
    pub signals: u64,
    /// Subjects currently holding a cache entry.
    pub cached_subjects: usize,
}

struct Computed {
    generation: u64,
    contexts: ContextSet,
}

struct SubjectEntry {
    generation: AtomicU64,
    computed: RwLock<Option<Computed>>,
}

impl SubjectEntry {
    fn new() -> Self {
        Self {
            generation: AtomicU64::new(0),
            computed: RwLock::new(None),
        }
    }

    fn current_generation(&self) -> u64 {
        self.generation.load(Ordering::Acquire)
    }

    fn bump(&self) -> u64 {
        self.generation.fetch_add(1, Ordering::AcqRel) + 1
    }

    fn cached_at(&self, generation: u64) -> Option<ContextSet> {
        self.computed
            .read()
            .as_ref()
            .filter(|c| c.generation == generation)
            .map(|c| c.contexts.clone())
    }

    /// Store unless a result from a later generation is already there.
    fn store(&self, generation: u64, contexts: ContextSet) {
        let mut computed = self.computed.write();
        if computed.as_ref().is_some_and(|c| c.generation > generation) {
            return;
        }
        *computed = Some(Computed {
            generation,
            contexts,
        });
    }

    fn state(&self) -> CacheState {
        let generation = self.current_generation();
        match self.computed.read().as_ref() {
            None => CacheState::Pending,
            Some(c) if c.generation == generation => CacheState::Fresh,
            Some(_) => CacheState::Stale,
        }
    }
}

/// Orchestrates calculators and owns the per-subject context cache.
pub struct ContextManager {
    registry: CalculatorRegistry,
    subjects: DashMap<SubjectId, Arc<SubjectEntry>>,
    recomputations: AtomicU64,
    cache_hits: AtomicU64,
    signals: AtomicU64,
}

impl ContextManager {
    /// Create a manager with no calculators.
    pub fn new() -> Self {
        Self {
            registry: CalculatorRegistry::new(),
            subjects: DashMap::new(),
            recomputations: AtomicU64::new(0),
            cache_hits: AtomicU64::new(0),
            signals: AtomicU64::new(0),
        }
    }

    /// Register a calculator. Cached sets are not invalidated; call
    /// [`invalidate_all`](Self::invalidate_all) if they should be.
    pub fn register_calculator(
        &self,
        calculator: Arc<dyn ContextCalculator>,
    ) -> Result<(), EngineError> {
        self.registry.register(calculator)
    }

    /// Unregister a calculator by name.
    pub fn unregister_calculator(&self, name: &str) -> bool {
        self.registry.unregister(name)
    }

    /// Registered calculator names, in evaluation order.
    pub fn calculator_names(&self) -> Vec<String> {
        self.registry.names()
    }

    /// The subject's current contexts.
    ///
    /// Served from cache when nothing has been signalled since the last
    /// computation; otherwise every calculator runs.
    pub fn query(&self, subject: &dyn Subject) -> ContextSet {
        let entry = self.entry(subject.id());
        let generation = entry.current_generation();

        if let Some(contexts) = entry.cached_at(generation) {
            let _ = self.cache_hits.fetch_add(1, Ordering::Relaxed);
            return contexts;
        }

        let contexts = self.recompute(subject, generation);
        entry.store(generation, contexts.clone());
        contexts
    }

    /// Mark the subject's cached set stale. Recomputation waits for the next
    /// query. Returns `false` when the subject has no entry.
    pub fn signal_context_update(&self, subject: &SubjectId) -> bool {
        let Some(entry) = self.subjects.get(subject).map(|e| Arc::clone(e.value())) else {
            return false;
        };
        let generation = entry.bump();
        let _ = self.signals.fetch_add(1, Ordering::Relaxed);
        debug!(subject = %subject, generation, "context update signalled");
        true
    }

    /// End the subject's lifecycle, dropping its cache entry.
    ///
    /// A query already in flight stores into the detached entry and leaves
    /// the subject absent. A query issued afterwards starts a new lifecycle.
    pub fn remove_subject(&self, subject: &SubjectId) -> bool {
        let removed = self.subjects.remove(subject).is_some();
        if removed {
            debug!(subject = %subject, "subject removed from context cache");
        }
        removed
    }

    /// Mark every cached set stale.
    pub fn invalidate_all(&self) {
        let mut count = 0usize;
        for entry in &self.subjects {
            let _ = entry.value().bump();
            count += 1;
        }
        debug!(subjects = count, "invalidated all cached contexts");
    }

    /// Union of every calculator's estimate.
    ///
    /// An approximation for cache warming; contexts outside it can still
    /// appear at runtime.
    pub fn estimate_potential_contexts(&self) -> ContextSet {
        let mut builder = ContextSetBuilder::new();
        for calculator in self.registry.snapshot().iter() {
            let estimate =
                panic::catch_unwind(AssertUnwindSafe(|| calculator.estimate_potential_contexts()));
            match estimate {
                Ok(set) => builder.add_all(&set),
                Err(_) => warn!(
                    calculator = calculator.name(),
                    "context estimation panicked, skipping"
                ),
            }
        }
        builder.build()
    }

    /// Cache state of a subject.
    pub fn cache_state(&self, subject: &SubjectId) -> CacheState {
        self.subjects
            .get(subject)
            .map_or(CacheState::Absent, |entry| entry.value().state())
    }

    /// Snapshot of the manager's counters.
    pub fn stats(&self) -> ManagerStats {
        ManagerStats {
            recomputations: self.recomputations.load(Ordering::Relaxed),
            cache_hits: self.cache_hits.load(Ordering::Relaxed),
            signals: self.signals.load(Ordering::Relaxed),
            cached_subjects: self.subjects.len(),
        }
    }

    fn entry(&self, subject: &SubjectId) -> Arc<SubjectEntry> {
        if let Some(entry) = self.subjects.get(subject) {
            return Arc::clone(entry.value());
        }
        Arc::clone(
            self.subjects
                .entry(subject.clone())
                .or_insert_with(|| Arc::new(SubjectEntry::new()))
                .value(),
        )
    }

    #[instrument(level = "debug", skip_all, fields(subject = %subject.id(), generation = generation))]
    fn recompute(&self, subject: &dyn Subject, generation: u64) -> ContextSet {
        let mut merged = ContextSetBuilder::new();
        for calculator in self.registry.snapshot().iter() {
            // Contributions land in a scratch builder so a panicking
            // calculator leaves nothing half-written behind.
            let mut scratch = ContextSetBuilder::new();
            let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
                calculator.calculate(subject, &mut scratch);
            }));
            match outcome {
                Ok(()) => merged.merge(scratch),
                Err(_) => warn!(
                    calculator = calculator.name(),
                    "context calculator panicked, skipping its contributions"
                ),
            }
        }

        let _ = self.recomputations.fetch_add(1, Ordering::Relaxed);
        let contexts = merged.build();
        debug!(contexts = %contexts, "recomputed contexts");
        contexts
    }
}

impl Default for ContextManager {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for ContextManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ContextManager")
            .field("registry", &self.registry)
            .field("cached_subjects", &self.subjects.len())
            .finish_non_exhaustive()
    }
}
