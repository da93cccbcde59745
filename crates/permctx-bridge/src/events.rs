//! Host lifecycle events.

use permctx_core::{ResourceKey, SubjectId};
use serde::{Deserialize, Serialize};

/// Whether an event fires before or after the transition is applied.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransitionPhase {
    /// The transition may still be cancelled; state is unchanged.
    Pre,
    /// The transition has been applied.
    Post,
}

/// The entity an event is about.
///
/// Only [`Actor::Subject`] exposes the permission subject capability; other
/// entities (mobs, item frames, ...) carry just a description for logging.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "id", rename_all = "snake_case")]
pub enum Actor {
    /// A permission subject.
    Subject(SubjectId),
    /// Any other entity.
    Other(String),
}

impl Actor {
    /// The subject id, if the actor is a subject.
    pub fn subject_id(&self) -> Option<&SubjectId> {
        match self {
            Self::Subject(id) => Some(id),
            Self::Other(_) => None,
        }
    }
}

/// Event emitted by the host environment.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum HostEvent {
    /// An actor joined.
    SubjectConnected {
        /// Who joined.
        actor: Actor,
    },
    /// An actor moved between worlds.
    WorldChanged {
        /// Who moved.
        actor: Actor,
        /// World left behind, if known.
        from: Option<ResourceKey>,
        /// World entered.
        to: ResourceKey,
        /// Before or after the move.
        phase: TransitionPhase,
    },
    /// An actor's game mode changed. Always delivered after the change.
    GameModeChanged {
        /// Whose mode changed.
        actor: Actor,
        /// Previous mode, if known.
        from: Option<ResourceKey>,
        /// New mode.
        to: ResourceKey,
    },
    /// An actor left.
    SubjectDisconnected {
        /// Who left.
        actor: Actor,
    },
}

impl HostEvent {
    /// The entity the event is about.
    pub fn actor(&self) -> &Actor {
        match self {
            Self::SubjectConnected { actor }
            | Self::WorldChanged { actor, .. }
            | Self::GameModeChanged { actor, .. }
            | Self::SubjectDisconnected { actor } => actor,
        }
    }

    /// Shorthand for `self.actor().subject_id()`.
    pub fn subject_id(&self) -> Option<&SubjectId> {
        self.actor().subject_id()
    }

    /// Stable event name for logging.
    pub fn event_type(&self) -> &'static str {
        match self {
            Self::SubjectConnected { .. } => "subject_connected",
            Self::WorldChanged { .. } => "world_changed",
            Self::GameModeChanged { .. } => "game_mode_changed",
            Self::SubjectDisconnected { .. } => "subject_disconnected",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn subject_id_only_for_subjects() {
        let id = SubjectId::from_raw("subj_1");
        let event = HostEvent::SubjectConnected {
            actor: Actor::Subject(id.clone()),
        };
        assert_eq!(event.subject_id(), Some(&id));

        let event = HostEvent::SubjectConnected {
            actor: Actor::Other("item_frame".into()),
        };
        assert_eq!(event.subject_id(), None);
    }

    #[test]
    fn serializes_with_type_tag() {
        let event = HostEvent::WorldChanged {
            actor: Actor::Subject(SubjectId::from_raw("subj_1")),
            from: None,
            to: ResourceKey::default_namespace("the_nether"),
            phase: TransitionPhase::Post,
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], "world_changed");
        assert_eq!(json["phase"], "post");
        assert_eq!(json["to"], "minecraft:the_nether");
        assert_eq!(json["actor"]["kind"], "subject");
        assert_eq!(event.event_type(), "world_changed");
    }
}
