//! Subject capabilities.
//!
//! A subject is owned by the host. Calculators only read its current state
//! through these accessors; every capability is optional and an absent one
//! means "contribute nothing", never an error.

use serde::{Deserialize, Serialize};

use crate::ids::SubjectId;
use crate::resource::ResourceKey;

/// Where a world lives.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorldKind {
    /// Hosted by the server; eligible for world-name contexts and rewrites.
    Server,
    /// A client-local or otherwise ephemeral world.
    Client,
}

/// Snapshot of the world a subject currently stands in.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct WorldView {
    /// Identifier of the world itself.
    pub key: ResourceKey,
    /// Identifier of the world's dimension type.
    pub dimension_type: ResourceKey,
    /// Whether the world is server-hosted.
    pub kind: WorldKind,
}

impl WorldView {
    /// A server-hosted world.
    pub fn server(key: ResourceKey, dimension_type: ResourceKey) -> Self {
        Self {
            key,
            dimension_type,
            kind: WorldKind::Server,
        }
    }

    /// A client-local world.
    pub fn client(key: ResourceKey, dimension_type: ResourceKey) -> Self {
        Self {
            key,
            dimension_type,
            kind: WorldKind::Client,
        }
    }

    /// Whether the world is server-hosted.
    pub fn is_server_hosted(&self) -> bool {
        self.kind == WorldKind::Server
    }
}

/// An entity that permissions can be queried for.
///
/// Accessors must read already-resident host state and return promptly.
pub trait Subject: Send + Sync {
    /// Stable identity used for cache keying.
    fn id(&self) -> &SubjectId;

    /// Current world, if the subject has a location.
    fn location(&self) -> Option<WorldView> {
        None
    }

    /// Current game mode, if the subject has one.
    fn game_mode(&self) -> Option<ResourceKey> {
        None
    }
}
