//! Invalidation bridge.
//!
//! Turns host lifecycle events into [`ContextManager`] calls. It only
//! signals; recomputation happens on the next query. Registered at
//! [`EventOrder::Last`] so it acts on a transition only once every other
//! listener has had the chance to cancel or alter it.

use std::sync::Arc;

use permctx_core::SubjectId;
use permctx_engine::ContextManager;
use tokio::sync::broadcast;
use tracing::{debug, info, warn};

use crate::bus::{EventListener, EventOrder, HostEventBus};
use crate::events::{HostEvent, TransitionPhase};

/// What the bridge does with an event.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum BridgeAction {
    /// Mark the subject's contexts stale.
    Signal(SubjectId),
    /// End the subject's cache lifecycle.
    Remove(SubjectId),
    /// Nothing to do.
    Ignore,
}

impl BridgeAction {
    /// Classify an event.
    pub fn for_event(event: &HostEvent) -> Self {
        let Some(id) = event.subject_id() else {
            return Self::Ignore;
        };
        match event {
            HostEvent::WorldChanged {
                phase: TransitionPhase::Post,
                ..
            }
            | HostEvent::GameModeChanged { .. } => Self::Signal(id.clone()),
            HostEvent::SubjectDisconnected { .. } => Self::Remove(id.clone()),
            HostEvent::WorldChanged {
                phase: TransitionPhase::Pre,
                ..
            }
            | HostEvent::SubjectConnected { .. } => Self::Ignore,
        }
    }
}

/// Forwards host events to a [`ContextManager`].
#[derive(Debug)]
pub struct InvalidationBridge {
    manager: Arc<ContextManager>,
}

impl InvalidationBridge {
    /// Listener name on the bus.
    pub const NAME: &'static str = "invalidation_bridge";

    /// Bridge into `manager`.
    pub fn new(manager: Arc<ContextManager>) -> Self {
        Self { manager }
    }

    /// Register the bridge on `bus` at [`EventOrder::Last`].
    pub fn install(self: &Arc<Self>, bus: &HostEventBus) {
        bus.register(EventOrder::Last, Arc::clone(self) as Arc<dyn EventListener>);
    }

    /// Apply one event and report what was done.
    pub fn on_event(&self, event: &HostEvent) -> BridgeAction {
        let action = BridgeAction::for_event(event);
        match &action {
            BridgeAction::Signal(id) => {
                let known = self.manager.signal_context_update(id);
                debug!(
                    subject = %id,
                    event_type = event.event_type(),
                    known,
                    "signalled context update"
                );
            }
            BridgeAction::Remove(id) => {
                let _ = self.manager.remove_subject(id);
            }
            BridgeAction::Ignore => {}
        }
        action
    }

    /// Consume events from a channel until its sender closes.
    ///
    /// Lagging means signals were dropped, so every cached set is
    /// invalidated.
    #[tracing::instrument(skip_all, name = "invalidation_bridge")]
    pub async fn run(&self, mut rx: broadcast::Receiver<HostEvent>) {
        info!("invalidation bridge started");
        loop {
            match rx.recv().await {
                Ok(event) => {
                    let _ = self.on_event(&event);
                }
                Err(broadcast::error::RecvError::Lagged(n)) => {
                    warn!(lagged = n, "invalidation bridge lagged, invalidating all contexts");
                    self.manager.invalidate_all();
                }
                Err(broadcast::error::RecvError::Closed) => {
                    info!("invalidation bridge: sender closed, exiting");
                    break;
                }
            }
        }
    }
}

impl EventListener for InvalidationBridge {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn handle(&self, event: &HostEvent) {
        let _ = self.on_event(event);
    }
}
