//! Mode-based contexts.

use std::sync::Arc;

use permctx_core::keys::GAMEMODE_KEY;
use permctx_core::{ContextConsumer, ContextSet, ContextSetBuilder, Subject};

use crate::calculator::ContextCalculator;
use crate::host::Host;

/// Contributes `gamemode`.
pub struct GameModeCalculator {
    host: Arc<dyn Host>,
}

impl GameModeCalculator {
    /// Calculator name in the registry.
    pub const NAME: &'static str = "gamemode";

    /// Create a calculator reading the game mode catalog from `host`.
    pub fn new(host: Arc<dyn Host>) -> Self {
        Self { host }
    }
}

impl ContextCalculator for GameModeCalculator {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn calculate(&self, subject: &dyn Subject, consumer: &mut dyn ContextConsumer) {
        if let Some(mode) = subject.game_mode() {
            consumer.accept(GAMEMODE_KEY, &mode.context_name());
        }
    }

    fn estimate_potential_contexts(&self) -> ContextSet {
        let mut builder = ContextSetBuilder::new();
        for mode in self.host.game_modes() {
            builder.add(GAMEMODE_KEY, &mode.context_name());
        }
        builder.build()
    }
}
