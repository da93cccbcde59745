//! Host event bus.
//!
//! Listeners run synchronously on the publishing thread, in ascending
//! [`EventOrder`] and registration order within an order. A listener that
//! panics is logged and skipped. After every listener has run, the event is
//! fanned out to channel subscribers.

use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use parking_lot::RwLock;
use tokio::sync::broadcast;
use tracing::{debug, warn};

use crate::events::HostEvent;

/// Default capacity of the subscriber channel.
pub const DEFAULT_CHANNEL_CAPACITY: usize = 256;

/// When a listener runs relative to the others.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum EventOrder {
    /// Before everything else.
    First,
    /// Ahead of ordinary listeners.
    Early,
    /// Ordinary listeners.
    #[default]
    Default,
    /// After ordinary listeners.
    Late,
    /// After everything else; sees the final outcome of the event.
    Last,
}

/// Synchronous event listener.
pub trait EventListener: Send + Sync {
    /// Listener name, for logging.
    fn name(&self) -> &str;

    /// React to an event. Must not block.
    fn handle(&self, event: &HostEvent);
}

struct Registration {
    order: EventOrder,
    listener: Arc<dyn EventListener>,
}

/// Ordered listener dispatch plus a broadcast channel.
pub struct HostEventBus {
    listeners: RwLock<Vec<Registration>>,
    sender: broadcast::Sender<HostEvent>,
}

impl HostEventBus {
    /// Bus with the default channel capacity.
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CHANNEL_CAPACITY)
    }

    /// Bus whose subscriber channel buffers up to `capacity` events.
    pub fn with_capacity(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self {
            listeners: RwLock::new(Vec::new()),
            sender,
        }
    }

    /// Add a listener at `order`.
    pub fn register(&self, order: EventOrder, listener: Arc<dyn EventListener>) {
        let mut listeners = self.listeners.write();
        let at = listeners.partition_point(|r| r.order <= order);
        debug!(listener = listener.name(), ?order, "registered host event listener");
        listeners.insert(at, Registration { order, listener });
    }

    /// Remove every listener registered under `name`. Returns how many were
    /// removed.
    pub fn unregister(&self, name: &str) -> usize {
        let mut listeners = self.listeners.write();
        let before = listeners.len();
        listeners.retain(|r| r.listener.name() != name);
        before - listeners.len()
    }

    /// Listener names in dispatch order.
    pub fn listener_names(&self) -> Vec<String> {
        self.listeners
            .read()
            .iter()
            .map(|r| r.listener.name().to_string())
            .collect()
    }

    /// Receive every published event after listeners have run.
    pub fn subscribe(&self) -> broadcast::Receiver<HostEvent> {
        self.sender.subscribe()
    }

    /// Dispatch an event to listeners, then to subscribers.
    pub fn publish(&self, event: HostEvent) {
        let listeners: Vec<Arc<dyn EventListener>> = self
            .listeners
            .read()
            .iter()
            .map(|r| Arc::clone(&r.listener))
            .collect();

        for listener in &listeners {
            let outcome = panic::catch_unwind(AssertUnwindSafe(|| listener.handle(&event)));
            if outcome.is_err() {
                warn!(
                    listener = listener.name(),
                    event_type = event.event_type(),
                    "host event listener panicked, continuing"
                );
            }
        }

        // No subscribers is not an error.
        let _ = self.sender.send(event);
    }
}

impl Default for HostEventBus {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for HostEventBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HostEventBus")
            .field("listeners", &self.listener_names())
            .field("subscribers", &self.sender.receiver_count())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::Actor;
    use parking_lot::Mutex;

    struct Recorder {
        name: &'static str,
        log: Arc<Mutex<Vec<&'static str>>>,
    }

    impl EventListener for Recorder {
        fn name(&self) -> &str {
            self.name
        }
        fn handle(&self, _event: &HostEvent) {
            self.log.lock().push(self.name);
        }
    }

    struct Exploding;

    impl EventListener for Exploding {
        fn name(&self) -> &str {
            "exploding"
        }
        fn handle(&self, _event: &HostEvent) {
            panic!("listener bug");
        }
    }

    fn connected() -> HostEvent {
        HostEvent::SubjectConnected {
            actor: Actor::Other("zombie".into()),
        }
    }

    fn recorder(name: &'static str, log: &Arc<Mutex<Vec<&'static str>>>) -> Arc<Recorder> {
        Arc::new(Recorder {
            name,
            log: Arc::clone(log),
        })
    }

    #[test]
    fn dispatches_by_order_then_registration() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let bus = HostEventBus::new();
        bus.register(EventOrder::Last, recorder("last", &log));
        bus.register(EventOrder::Default, recorder("default-1", &log));
        bus.register(EventOrder::First, recorder("first", &log));
        bus.register(EventOrder::Default, recorder("default-2", &log));
        bus.register(EventOrder::Late, recorder("late", &log));

        bus.publish(connected());
        assert_eq!(
            *log.lock(),
            vec!["first", "default-1", "default-2", "late", "last"]
        );
    }

    #[test]
    fn panicking_listener_does_not_stop_dispatch() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let bus = HostEventBus::new();
        bus.register(EventOrder::Early, Arc::new(Exploding));
        bus.register(EventOrder::Last, recorder("last", &log));

        bus.publish(connected());
        assert_eq!(*log.lock(), vec!["last"]);
    }

    #[test]
    fn subscribers_receive_after_listeners() {
        let bus = HostEventBus::new();
        let mut rx = bus.subscribe();
        bus.publish(connected());
        assert_eq!(rx.try_recv().unwrap(), connected());
    }

    #[test]
    fn publish_without_subscribers_is_fine() {
        let bus = HostEventBus::new();
        bus.publish(connected());
    }

    #[test]
    fn unregister_by_name() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let bus = HostEventBus::new();
        bus.register(EventOrder::Default, recorder("a", &log));
        bus.register(EventOrder::Default, recorder("b", &log));
        assert_eq!(bus.unregister("a"), 1);
        assert_eq!(bus.listener_names(), vec!["b"]);
        assert_eq!(bus.unregister("missing"), 0);
    }
}
