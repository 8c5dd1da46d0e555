//! Subscription fan-out.
//!
//! [`Subscribers<A>`] is an ordered list of change handlers. Handlers are
//! invoked synchronously, in subscription order, each time the owner calls
//! [`Subscribers::notify`].
//!
//! # Example
//!
//! ```
//! use vista_core::Subscribers;
//! use std::sync::Arc;
//! use std::sync::atomic::{AtomicI32, Ordering};
//!
//! let subscribers = Subscribers::<i32>::new();
//! let last = Arc::new(AtomicI32::new(0));
//!
//! let last_clone = last.clone();
//! let subscription = subscribers.subscribe(&7, move |value| {
//!     last_clone.store(*value, Ordering::SeqCst);
//! });
//!
//! // Handlers observe the current state immediately.
//! assert_eq!(last.load(Ordering::SeqCst), 7);
//!
//! subscribers.notify(&42);
//! assert_eq!(last.load(Ordering::SeqCst), 42);
//!
//! subscription.unsubscribe();
//! subscribers.notify(&1);
//! assert_eq!(last.load(Ordering::SeqCst), 42);
//! ```

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};

use parking_lot::Mutex;

/// A change handler.
pub type Handler<A> = Arc<dyn Fn(&A) + Send + Sync>;

/// Internal storage for a single handler.
struct Entry<A> {
    id: u64,
    handler: Handler<A>,
}

type HandlerList<A> = Mutex<Vec<Entry<A>>>;

/// An ordered list of handlers notified with a shared argument.
///
/// Removal is a linear scan by id. Handler lists are expected to be short.
///
/// No lock is held while handlers run, so a handler may subscribe,
/// unsubscribe or trigger another notification on the same list.
pub struct Subscribers<A> {
    handlers: Arc<HandlerList<A>>,
    next_id: AtomicU64,
}

impl<A> Default for Subscribers<A> {
    fn default() -> Self {
        Self::new()
    }
}

impl<A> Subscribers<A> {
    /// Create an empty handler list.
    pub fn new() -> Self {
        Self {
            handlers: Arc::new(Mutex::new(Vec::new())),
            next_id: AtomicU64::new(0),
        }
    }

    /// Append a handler and invoke it once with `current`.
    ///
    /// The immediate invocation happens before this returns, so a late
    /// subscriber observes the current state without waiting for the next
    /// change.
    pub fn subscribe<F>(&self, current: &A, handler: F) -> Subscription<A>
    where
        F: Fn(&A) + Send + Sync + 'static,
    {
        let handler: Handler<A> = Arc::new(handler);
        let subscription = self.insert(handler.clone());
        handler(current);
        subscription
    }

    /// Append a handler without invoking it.
    pub fn insert(&self, handler: Handler<A>) -> Subscription<A> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let mut handlers = self.handlers.lock();
        handlers.push(Entry { id, handler });
        tracing::trace!(
            target: "vista::subscription",
            id,
            count = handlers.len(),
            "handler subscribed"
        );
        Subscription {
            handlers: Arc::downgrade(&self.handlers),
            id,
        }
    }

    /// Invoke every handler, in subscription order, with `args`.
    ///
    /// The list is snapshotted first; handlers added during delivery are
    /// not invoked until the next notification. A panicking handler
    /// propagates and the remaining handlers are skipped.
    #[tracing::instrument(skip_all, target = "vista::subscription", level = "trace")]
    pub fn notify(&self, args: &A) {
        let snapshot: Vec<Handler<A>> = self
            .handlers
            .lock()
            .iter()
            .map(|entry| entry.handler.clone())
            .collect();
        tracing::trace!(target: "vista::subscription", count = snapshot.len(), "notifying");

        for handler in snapshot {
            handler(args);
        }
    }

    /// Number of registered handlers.
    pub fn len(&self) -> usize {
        self.handlers.lock().len()
    }

    /// Whether no handler is registered.
    pub fn is_empty(&self) -> bool {
        self.handlers.lock().is_empty()
    }

    /// Remove every handler.
    ///
    /// Outstanding [`Subscription`]s become no-ops.
    pub fn clear(&self) {
        self.handlers.lock().clear();
    }
}

/// The capability to remove one handler from a [`Subscribers`] list.
///
/// Dropping a `Subscription` does **not** unsubscribe; call
/// [`unsubscribe`](Self::unsubscribe) or convert it with
/// [`into_guard`](Self::into_guard) for scoped removal.
pub struct Subscription<A> {
    handlers: Weak<HandlerList<A>>,
    id: u64,
}

impl<A> Clone for Subscription<A> {
    fn clone(&self) -> Self {
        Self {
            handlers: self.handlers.clone(),
            id: self.id,
        }
    }
}

impl<A> std::fmt::Debug for Subscription<A> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription")
            .field("id", &self.id)
            .field("active", &self.is_active())
            .finish()
    }
}

impl<A> Subscription<A> {
    /// Remove the handler this subscription was created for.
    ///
    /// Returns `true` if the handler was still registered. Calling this
    /// again, or after the list was cleared or dropped, does nothing.
    pub fn unsubscribe(&self) -> bool {
        let Some(handlers) = self.handlers.upgrade() else {
            return false;
        };
        let mut handlers = handlers.lock();
        match handlers.iter().position(|entry| entry.id == self.id) {
            Some(pos) => {
                handlers.remove(pos);
                tracing::trace!(target: "vista::subscription", id = self.id, "handler unsubscribed");
                true
            }
            None => false,
        }
    }

    /// Whether the handler is still registered.
    pub fn is_active(&self) -> bool {
        self.handlers
            .upgrade()
            .is_some_and(|handlers| handlers.lock().iter().any(|entry| entry.id == self.id))
    }

    /// Convert into a guard that unsubscribes when dropped.
    pub fn into_guard(self) -> SubscriptionGuard<A> {
        SubscriptionGuard { subscription: self }
    }
}

/// A subscription that removes its handler when dropped.
pub struct SubscriptionGuard<A> {
    subscription: Subscription<A>,
}

impl<A> Drop for SubscriptionGuard<A> {
    fn drop(&mut self) {
        self.subscription.unsubscribe();
    }
}

static_assertions::assert_impl_all!(Subscribers<i32>: Send, Sync);
static_assertions::assert_impl_all!(Subscription<i32>: Send, Sync);

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;

    #[test]
    fn test_subscribe_invokes_immediately() {
        let subscribers = Subscribers::<i32>::new();
        let received = Arc::new(Mutex::new(Vec::new()));

        let received_clone = received.clone();
        subscribers.subscribe(&5, move |&value| {
            received_clone.lock().push(value);
        });

        assert_eq!(*received.lock(), vec![5]);
    }

    #[test]
    fn test_notify_in_subscription_order() {
        let subscribers = Subscribers::<i32>::new();
        let order = Arc::new(Mutex::new(Vec::new()));

        for tag in ["a", "b", "c"] {
            let order_clone = order.clone();
            subscribers.insert(Arc::new(move |_: &i32| order_clone.lock().push(tag)));
        }

        subscribers.notify(&0);
        assert_eq!(*order.lock(), vec!["a", "b", "c"]);
    }

    #[test]
    fn test_unsubscribe_removes_only_that_handler() {
        let subscribers = Subscribers::<i32>::new();
        let count = Arc::new(AtomicUsize::new(0));

        let count_a = count.clone();
        let first = subscribers.insert(Arc::new(move |_: &i32| {
            count_a.fetch_add(1, Ordering::SeqCst);
        }));
        let count_b = count.clone();
        let _second = subscribers.insert(Arc::new(move |_: &i32| {
            count_b.fetch_add(10, Ordering::SeqCst);
        }));

        assert!(first.unsubscribe());
        subscribers.notify(&0);
        assert_eq!(count.load(Ordering::SeqCst), 10);
        assert_eq!(subscribers.len(), 1);
    }

    #[test]
    fn test_unsubscribe_twice_is_noop() {
        let subscribers = Subscribers::<()>::new();
        let subscription = subscribers.subscribe(&(), |_| {});

        assert!(subscription.is_active());
        assert!(subscription.unsubscribe());
        assert!(!subscription.unsubscribe());
        assert!(!subscription.is_active());
    }

    #[test]
    fn test_unsubscribe_after_list_dropped() {
        let subscribers = Subscribers::<()>::new();
        let subscription = subscribers.subscribe(&(), |_| {});
        drop(subscribers);

        assert!(!subscription.unsubscribe());
    }

    #[test]
    fn test_guard_unsubscribes_on_drop() {
        let subscribers = Subscribers::<i32>::new();
        let received = Arc::new(Mutex::new(Vec::new()));

        {
            let received_clone = received.clone();
            let _guard = subscribers
                .subscribe(&1, move |&value| received_clone.lock().push(value))
                .into_guard();
            subscribers.notify(&2);
        }

        subscribers.notify(&3);
        assert_eq!(*received.lock(), vec![1, 2]);
    }

    #[test]
    fn test_handler_may_unsubscribe_during_notify() {
        let subscribers = Arc::new(Subscribers::<i32>::new());
        let slot: Arc<Mutex<Option<Subscription<i32>>>> = Arc::new(Mutex::new(None));
        let calls = Arc::new(AtomicUsize::new(0));

        let slot_clone = slot.clone();
        let calls_clone = calls.clone();
        let subscription = subscribers.insert(Arc::new(move |_: &i32| {
            calls_clone.fetch_add(1, Ordering::SeqCst);
            if let Some(subscription) = slot_clone.lock().as_ref() {
                subscription.unsubscribe();
            }
        }));
        *slot.lock() = Some(subscription);

        subscribers.notify(&0);
        subscribers.notify(&0);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(subscribers.is_empty());
    }
}
