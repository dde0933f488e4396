//! Synchronous observer registry owned by an emitting service.
//!
//! Observers are called in subscription order on the caller's stack. A
//! callback only receives the notice, never the emitting service, so it
//! cannot observe or mutate a half-finished operation.

use std::fmt;

/// Handle returned by [`ObserverRegistry::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Callback<T> = Box<dyn FnMut(&T) + Send + Sync>;

pub struct ObserverRegistry<T> {
    next_id: u64,
    observers: Vec<(SubscriptionId, Callback<T>)>,
}

impl<T> Default for ObserverRegistry<T> {
    fn default() -> Self {
        Self {
            next_id: 0,
            observers: Vec::new(),
        }
    }
}

impl<T> fmt::Debug for ObserverRegistry<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ObserverRegistry")
            .field("observers", &self.observers.len())
            .finish()
    }
}

impl<T> ObserverRegistry<T> {
    pub fn subscribe(&mut self, callback: impl FnMut(&T) + Send + Sync + 'static) -> SubscriptionId {
        let id = SubscriptionId(self.next_id);
        self.next_id += 1;
        self.observers.push((id, Box::new(callback)));
        id
    }

    /// Returns false if the handle was already removed (double unsubscribe is harmless).
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.observers.len();
        self.observers.retain(|(sub, _)| *sub != id);
        self.observers.len() != before
    }

    pub fn notify(&mut self, notice: &T) {
        for (_, callback) in self.observers.iter_mut() {
            callback(notice);
        }
    }

    pub fn len(&self) -> usize {
        self.observers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.observers.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    #[test]
    fn test_notify_in_subscription_order() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let mut registry = ObserverRegistry::<u32>::default();

        let a = Arc::clone(&seen);
        registry.subscribe(move |n| a.lock().unwrap().push(("first", *n)));
        let b = Arc::clone(&seen);
        registry.subscribe(move |n| b.lock().unwrap().push(("second", *n)));

        registry.notify(&7);

        assert_eq!(*seen.lock().unwrap(), vec![("first", 7), ("second", 7)]);
    }

    #[test]
    fn test_double_unsubscribe_is_harmless() {
        let mut registry = ObserverRegistry::<()>::default();
        let id = registry.subscribe(|_| {});
        assert_eq!(registry.len(), 1);

        assert!(registry.unsubscribe(id));
        assert!(!registry.unsubscribe(id));
        assert!(registry.is_empty());
    }

    #[test]
    fn test_unsubscribed_observer_is_not_called() {
        let hits = Arc::new(Mutex::new(0));
        let mut registry = ObserverRegistry::<u8>::default();
        let h = Arc::clone(&hits);
        let id = registry.subscribe(move |_| *h.lock().unwrap() += 1);

        registry.notify(&1);
        registry.unsubscribe(id);
        registry.notify(&2);

        assert_eq!(*hits.lock().unwrap(), 1);
    }
}
