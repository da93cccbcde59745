//! In-memory host and subject.
//!
//! Used by tests and by the operator CLI to resolve contexts without a live
//! server. State sits behind `parking_lot` locks so a test can mutate a
//! subject from one thread while another queries it.

use std::sync::Arc;

use parking_lot::RwLock;
use permctx_core::{ResourceKey, Subject, SubjectId, WorldView};

use super::{Host, ServerHandle};

/// A server whose world list can be edited.
#[derive(Debug, Default)]
pub struct MemoryServer {
    worlds: RwLock<Vec<ResourceKey>>,
}

impl MemoryServer {
    /// A server with the given worlds loaded.
    pub fn new(worlds: impl IntoIterator<Item = ResourceKey>) -> Self {
        Self {
            worlds: RwLock::new(worlds.into_iter().collect()),
        }
    }

    /// Load another world.
    pub fn add_world(&self, world: ResourceKey) {
        self.worlds.write().push(world);
    }
}

impl ServerHandle for MemoryServer {
    fn worlds(&self) -> Vec<ResourceKey> {
        self.worlds.read().clone()
    }
}

/// Host with fixed catalogs and a server that can be started and stopped.
#[derive(Debug, Default)]
pub struct MemoryHost {
    game_modes: Vec<ResourceKey>,
    dimension_types: Vec<ResourceKey>,
    server: RwLock<Option<Arc<MemoryServer>>>,
}

impl MemoryHost {
    /// A host with the given catalogs and no running server.
    pub fn new(game_modes: Vec<ResourceKey>, dimension_types: Vec<ResourceKey>) -> Self {
        Self {
            game_modes,
            dimension_types,
            server: RwLock::new(None),
        }
    }

    /// The stock game modes and dimension types, no running server.
    pub fn vanilla() -> Self {
        let keys = |names: &[&str]| -> Vec<ResourceKey> {
            names
                .iter()
                .map(|name| ResourceKey::default_namespace(*name))
                .collect()
        };
        Self::new(
            keys(&["survival", "creative", "adventure", "spectator"]),
            keys(&["overworld", "the_nether", "the_end"]),
        )
    }

    /// Bring the server up with the given worlds and return it.
    pub fn start_server(&self, worlds: impl IntoIterator<Item = ResourceKey>) -> Arc<MemoryServer> {
        let server = Arc::new(MemoryServer::new(worlds));
        *self.server.write() = Some(Arc::clone(&server));
        server
    }

    /// Take the server down.
    pub fn stop_server(&self) {
        *self.server.write() = None;
    }
}

impl Host for MemoryHost {
    fn game_modes(&self) -> Vec<ResourceKey> {
        self.game_modes.clone()
    }

    fn dimension_types(&self) -> Vec<ResourceKey> {
        self.dimension_types.clone()
    }

    fn server(&self) -> Option<Arc<dyn ServerHandle>> {
        self.server
            .read()
            .as_ref()
            .map(|server| Arc::clone(server) as Arc<dyn ServerHandle>)
    }
}

#[derive(Debug, Default)]
struct SubjectState {
    location: Option<WorldView>,
    game_mode: Option<ResourceKey>,
}

/// A subject whose location and game mode can be changed at will.
#[derive(Debug)]
pub struct MemorySubject {
    id: SubjectId,
    state: RwLock<SubjectState>,
}

impl MemorySubject {
    /// A subject with no location and no game mode.
    pub fn new(id: SubjectId) -> Self {
        Self {
            id,
            state: RwLock::new(SubjectState::default()),
        }
    }

    /// Builder form of [`set_location`](Self::set_location).
    #[must_use]
    pub fn with_location(self, world: WorldView) -> Self {
        self.set_location(Some(world));
        self
    }

    /// Builder form of [`set_game_mode`](Self::set_game_mode).
    #[must_use]
    pub fn with_game_mode(self, mode: ResourceKey) -> Self {
        self.set_game_mode(Some(mode));
        self
    }

    /// Move the subject (or remove its location).
    pub fn set_location(&self, world: Option<WorldView>) {
        self.state.write().location = world;
    }

    /// Change the subject's game mode.
    pub fn set_game_mode(&self, mode: Option<ResourceKey>) {
        self.state.write().game_mode = mode;
    }
}

impl Subject for MemorySubject {
    fn id(&self) -> &SubjectId {
        &self.id
    }

    fn location(&self) -> Option<WorldView> {
        self.state.read().location.clone()
    }

    fn game_mode(&self) -> Option<ResourceKey> {
        self.state.read().game_mode.clone()
    }
}
