//! Listener registry and the RAII subscription handle.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};

use parking_lot::Mutex;

/// Zero-argument change callback.
pub type Listener = Arc<dyn Fn() + Send + Sync>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

/// Registered listeners in registration order.
#[derive(Default)]
pub(crate) struct SubscriberRegistry {
    entries: Mutex<Vec<(ListenerId, Listener)>>,
    next_id: AtomicU64,
}

impl SubscriberRegistry {
    pub(crate) fn add(&self, listener: Listener) -> ListenerId {
        let id = ListenerId(self.next_id.fetch_add(1, Ordering::Relaxed));
        self.entries.lock().push((id, listener));
        id
    }

    pub(crate) fn remove(&self, id: ListenerId) -> bool {
        let mut entries = self.entries.lock();
        let before = entries.len();
        entries.retain(|(entry, _)| *entry != id);
        entries.len() != before
    }

    /// Copy of the current list. Notification iterates the copy with the
    /// lock released, so listeners may subscribe or unsubscribe freely;
    /// their changes apply from the next cycle.
    pub(crate) fn snapshot(&self) -> Vec<Listener> {
        self.entries
            .lock()
            .iter()
            .map(|(_, listener)| Arc::clone(listener))
            .collect()
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.lock().len()
    }
}

/// Handle returned by `Store::subscribe`.
///
/// Dropping it unsubscribes, so a subscription scoped to some lifecycle
/// is released on every exit path. Keep it alive as long as the listener
/// should run.
#[must_use = "dropping a Subscription unsubscribes the listener"]
pub struct Subscription {
    id: ListenerId,
    registry: Weak<SubscriberRegistry>,
    active: bool,
}

impl Subscription {
    pub(crate) fn new(id: ListenerId, registry: &Arc<SubscriberRegistry>) -> Self {
        Self {
            id,
            registry: Arc::downgrade(registry),
            active: true,
        }
    }

    pub fn id(&self) -> ListenerId {
        self.id
    }

    pub fn is_active(&self) -> bool {
        self.active && self.registry.strong_count() > 0
    }

    pub fn unsubscribe(mut self) {
        self.release();
    }

    fn release(&mut self) {
        if !std::mem::take(&mut self.active) {
            return;
        }
        if let Some(registry) = self.registry.upgrade() {
            if registry.remove(self.id) {
                tracing::trace!(listener = self.id.0, "Listener removed");
            }
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.release();
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription")
            .field("id", &self.id)
            .field("active", &self.is_active())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;

    fn counting() -> (Arc<AtomicUsize>, Listener) {
        let calls = Arc::new(AtomicUsize::new(0));
        let listener: Listener = {
            let calls = Arc::clone(&calls);
            Arc::new(move || {
                calls.fetch_add(1, Ordering::SeqCst);
            })
        };
        (calls, listener)
    }

    #[test]
    fn same_listener_twice_is_two_registrations() {
        let registry = Arc::new(SubscriberRegistry::default());
        let (calls, listener) = counting();
        let first = Subscription::new(registry.add(Arc::clone(&listener)), &registry);
        let _second = Subscription::new(registry.add(listener), &registry);
        assert_eq!(registry.len(), 2);

        first.unsubscribe();
        assert_eq!(registry.len(), 1);
        for listener in registry.snapshot() {
            listener();
        }
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn drop_unsubscribes() {
        let registry = Arc::new(SubscriberRegistry::default());
        let (_, listener) = counting();
        {
            let _subscription = Subscription::new(registry.add(listener), &registry);
            assert_eq!(registry.len(), 1);
        }
        assert_eq!(registry.len(), 0);
    }

    #[test]
    fn subscription_outliving_registry_is_inert() {
        let registry = Arc::new(SubscriberRegistry::default());
        let (_, listener) = counting();
        let subscription = Subscription::new(registry.add(listener), &registry);
        drop(registry);
        assert!(!subscription.is_active());
        subscription.unsubscribe();
    }
}
