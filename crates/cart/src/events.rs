//! Change notification.
//!
//! Every successful cart mutation fires a named, payload-free event
//! ([`CART_UPDATED`]); listeners re-read state through the store rather
//! than receiving a snapshot. The [`EventSink`] trait is the emission
//! seam; [`EventBus`] is the provided synchronous implementation.

use std::cell::RefCell;
use std::rc::Rc;

/// Name of the event fired after every successful cart mutation.
pub const CART_UPDATED: &str = "cart-updated";

/// Event emission seam.
///
/// Implementations must not panic; emitting to nobody is fine.
pub trait EventSink {
    /// Fire the named event. Carries no payload.
    fn emit(&self, event: &str);
}

/// An [`EventSink`] that drops every event.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullEvents;

impl EventSink for NullEvents {
    fn emit(&self, _event: &str) {}
}

type Listener = Rc<dyn Fn()>;

/// Identifies one subscription on an [`EventBus`], for later removal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubscriptionId(u64);

#[derive(Default)]
struct Registry {
    next_id: u64,
    listeners: Vec<(String, SubscriptionId, Listener)>,
}

/// Synchronous, single-threaded listener list.
///
/// Cloning an `EventBus` yields a handle to the same listener list, so
/// the store, the validator, and the embedding application can share one
/// bus. Firing order among listeners for the same event is unspecified.
///
/// `emit` snapshots the listener list before invoking callbacks, so a
/// callback may itself emit (the validator's cleaning pass does exactly
/// that when it rewrites the cart).
#[derive(Clone, Default)]
pub struct EventBus {
    registry: Rc<RefCell<Registry>>,
}

impl EventBus {
    /// Create a bus with no listeners.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Subscribe `callback` to the named event.
    ///
    /// The returned id can be passed to [`Self::unsubscribe`]; discard it
    /// with `let _ =` for listeners that live as long as the bus.
    #[must_use = "discarding the id makes the subscription permanent"]
    pub fn subscribe(&self, event: &str, callback: impl Fn() + 'static) -> SubscriptionId {
        let mut registry = self.registry.borrow_mut();
        let id = SubscriptionId(registry.next_id);
        registry.next_id += 1;
        registry
            .listeners
            .push((event.to_owned(), id, Rc::new(callback)));
        id
    }

    /// Remove the subscription registered under `id`. Removing an unknown
    /// or already-removed id is a no-op.
    pub fn unsubscribe(&self, id: SubscriptionId) {
        self.registry
            .borrow_mut()
            .listeners
            .retain(|(_, sid, _)| *sid != id);
    }

    /// Number of listeners subscribed to the named event.
    #[must_use]
    pub fn listener_count(&self, event: &str) -> usize {
        self.registry
            .borrow()
            .listeners
            .iter()
            .filter(|(name, _, _)| name == event)
            .count()
    }
}

impl std::fmt::Debug for EventBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventBus")
            .field("listeners", &self.registry.borrow().listeners.len())
            .finish()
    }
}

impl EventSink for EventBus {
    fn emit(&self, event: &str) {
        // Snapshot first: callbacks may emit again, subscribe, or
        // unsubscribe, and the RefCell must not be borrowed while they
        // run.
        let matching: Vec<Listener> = self
            .registry
            .borrow()
            .listeners
            .iter()
            .filter(|(name, _, _)| name == event)
            .map(|(_, _, listener)| Rc::clone(listener))
            .collect();

        for listener in matching {
            listener();
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use std::cell::Cell;

    #[test]
    fn test_emit_reaches_matching_listeners_only() {
        let bus = EventBus::new();
        let hits = Rc::new(Cell::new(0));

        let h = Rc::clone(&hits);
        let _ = bus.subscribe(CART_UPDATED, move || h.set(h.get() + 1));
        let h = Rc::clone(&hits);
        let _ = bus.subscribe("other-event", move || h.set(h.get() + 100));

        bus.emit(CART_UPDATED);
        bus.emit(CART_UPDATED);
        assert_eq!(hits.get(), 2);
    }

    #[test]
    fn test_clone_shares_listener_list() {
        let bus = EventBus::new();
        let clone = bus.clone();
        let hits = Rc::new(Cell::new(0));

        let h = Rc::clone(&hits);
        let _ = clone.subscribe(CART_UPDATED, move || h.set(h.get() + 1));

        bus.emit(CART_UPDATED);
        assert_eq!(hits.get(), 1);
        assert_eq!(bus.listener_count(CART_UPDATED), 1);
    }

    #[test]
    fn test_emit_with_no_listeners_is_harmless() {
        EventBus::new().emit(CART_UPDATED);
        NullEvents.emit(CART_UPDATED);
    }

    #[test]
    fn test_reentrant_emit_does_not_panic() {
        let bus = EventBus::new();
        let depth = Rc::new(Cell::new(0));

        let inner_bus = bus.clone();
        let d = Rc::clone(&depth);
        let _ = bus.subscribe(CART_UPDATED, move || {
            if d.get() < 3 {
                d.set(d.get() + 1);
                inner_bus.emit(CART_UPDATED);
            }
        });

        bus.emit(CART_UPDATED);
        assert_eq!(depth.get(), 3);
    }

    #[test]
    fn test_subscribe_during_emit_does_not_panic() {
        let bus = EventBus::new();

        let inner_bus = bus.clone();
        let _ = bus.subscribe(CART_UPDATED, move || {
            let _ = inner_bus.subscribe("late", || {});
        });

        bus.emit(CART_UPDATED);
        assert_eq!(bus.listener_count("late"), 1);
    }

    #[test]
    fn test_unsubscribe_stops_delivery() {
        let bus = EventBus::new();
        let hits = Rc::new(Cell::new(0));

        let h = Rc::clone(&hits);
        let id = bus.subscribe(CART_UPDATED, move || h.set(h.get() + 1));
        let h = Rc::clone(&hits);
        let _ = bus.subscribe(CART_UPDATED, move || h.set(h.get() + 10));

        bus.emit(CART_UPDATED);
        assert_eq!(hits.get(), 11);

        bus.unsubscribe(id);
        assert_eq!(bus.listener_count(CART_UPDATED), 1);

        bus.emit(CART_UPDATED);
        assert_eq!(hits.get(), 21);

        // Removing an already-removed id is a no-op.
        bus.unsubscribe(id);
        assert_eq!(bus.listener_count(CART_UPDATED), 1);
    }
}
