use std::fmt;

/// Handle returned by [`EventBus::subscribe`].
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SubscriptionId(u64);

type Handler<E> = Box<dyn FnMut(&E) + Send>;

/// Synchronous, typed publish/subscribe.
///
/// Ordering contract:
/// - `publish` calls every handler before returning, in registration order.
/// - A handler runs to completion before the next one starts.
pub struct EventBus<E> {
    next_id: u64,
    handlers: Vec<(SubscriptionId, Handler<E>)>,
    published: u64,
}

impl<E> EventBus<E> {
    pub fn new() -> Self {
        Self {
            next_id: 0,
            handlers: Vec::new(),
            published: 0,
        }
    }

    pub fn subscribe(&mut self, handler: impl FnMut(&E) + Send + 'static) -> SubscriptionId {
        let id = SubscriptionId(self.next_id);
        self.next_id += 1;
        self.handlers.push((id, Box::new(handler)));
        id
    }

    /// Returns `true` if the subscription existed.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.handlers.len();
        self.handlers.retain(|(sid, _)| *sid != id);
        self.handlers.len() != before
    }

    /// Dispatches `event` to all subscribers; returns how many were called.
    pub fn publish(&mut self, event: &E) -> usize {
        self.published += 1;
        for (_id, handler) in &mut self.handlers {
            handler(event);
        }
        self.handlers.len()
    }

    pub fn subscriber_count(&self) -> usize {
        self.handlers.len()
    }

    /// Number of events published over the bus lifetime.
    pub fn published_count(&self) -> u64 {
        self.published
    }
}

impl<E> Default for EventBus<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E> fmt::Debug for EventBus<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventBus")
            .field("subscribers", &self.handlers.len())
            .field("published", &self.published)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::EventBus;
    use std::sync::{Arc, Mutex};

    #[derive(Debug, Clone, PartialEq)]
    enum Ping {
        A(u32),
        Clear,
    }

    #[test]
    fn dispatches_in_registration_order() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let mut bus = EventBus::new();
        for name in ["first", "second", "third"] {
            let log = Arc::clone(&log);
            bus.subscribe(move |ev: &Ping| log.lock().unwrap().push(format!("{name}:{ev:?}")));
        }

        assert_eq!(bus.publish(&Ping::A(7)), 3);
        assert_eq!(
            *log.lock().unwrap(),
            vec!["first:A(7)", "second:A(7)", "third:A(7)"]
        );
        assert_eq!(bus.published_count(), 1);
    }

    #[test]
    fn unsubscribed_handlers_stop_receiving() {
        let hits = Arc::new(Mutex::new(0u32));
        let mut bus = EventBus::new();
        let h = Arc::clone(&hits);
        let id = bus.subscribe(move |_: &Ping| *h.lock().unwrap() += 1);

        bus.publish(&Ping::Clear);
        assert!(bus.unsubscribe(id));
        assert!(!bus.unsubscribe(id));
        bus.publish(&Ping::Clear);

        assert_eq!(*hits.lock().unwrap(), 1);
        assert_eq!(bus.subscriber_count(), 0);
    }

    #[test]
    fn publishing_without_subscribers_is_fine() {
        let mut bus: EventBus<Ping> = EventBus::default();
        assert_eq!(bus.publish(&Ping::A(1)), 0);
    }
}
