//! # permctx-bridge
//!
//! Connects host lifecycle events to context invalidation.
//!
//! - [`HostEventBus`]: ordered synchronous listeners plus a broadcast channel
//! - [`InvalidationBridge`]: signals the [`ContextManager`] on post-transition
//!   world changes and on game mode changes, and ends a subject's cache
//!   lifecycle on disconnect
//!
//! Hosts that dispatch on their own threads install the bridge as a listener;
//! hosts that deliver over a channel spawn [`InvalidationBridge::run`].
//!
//! [`ContextManager`]: permctx_engine::ContextManager

#![deny(unsafe_code)]

pub mod bridge;
pub mod bus;
pub mod events;

pub use bridge::{BridgeAction, InvalidationBridge};
pub use bus::{EventListener, EventOrder, HostEventBus};
pub use events::{Actor, HostEvent, TransitionPhase};
