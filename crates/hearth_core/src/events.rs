//! Event sources with scoped subscriptions
//!
//! An [`EventSource`] fans a value out to every registered listener. Listeners
//! are registered through [`EventSource::subscribe`], which returns a
//! [`Subscription`] guard; dropping the guard removes the listener. There is
//! no other way to register, so a listener can never outlive its owner.
//!
//! ```rust
//! use hearth_core::events::EventSource;
//! use std::sync::{Arc, Mutex};
//!
//! let scroll = EventSource::<f32>::new();
//! let seen = Arc::new(Mutex::new(Vec::new()));
//!
//! let sink = seen.clone();
//! let sub = scroll.subscribe(move |y| sink.lock().unwrap().push(*y));
//! scroll.emit(&120.0);
//!
//! drop(sub);
//! scroll.emit(&240.0);
//! assert_eq!(*seen.lock().unwrap(), vec![120.0]);
//! ```

use slotmap::{new_key_type, SlotMap};
use std::sync::{Arc, Mutex, Weak};

new_key_type! {
    /// Handle to a registered listener
    pub struct ListenerId;
}

type Listener<E> = Arc<dyn Fn(&E) + Send + Sync>;
type Listeners<E> = Mutex<SlotMap<ListenerId, Listener<E>>>;

/// A multicast source of events of type `E`
pub struct EventSource<E> {
    listeners: Arc<Listeners<E>>,
}

impl<E: 'static> EventSource<E> {
    pub fn new() -> Self {
        Self {
            listeners: Arc::new(Mutex::new(SlotMap::with_key())),
        }
    }

    /// Register a listener for as long as the returned guard lives
    #[must_use = "dropping the subscription immediately unregisters the listener"]
    pub fn subscribe<F>(&self, listener: F) -> Subscription
    where
        F: Fn(&E) + Send + Sync + 'static,
    {
        let id = self.listeners.lock().unwrap().insert(Arc::new(listener));
        let weak: Weak<Listeners<E>> = Arc::downgrade(&self.listeners);

        Subscription {
            id,
            release: Some(Box::new(move || {
                if let Some(listeners) = weak.upgrade() {
                    // Dropped outside the lock; the listener may own other guards
                    let removed = listeners.lock().unwrap().remove(id);
                    drop(removed);
                }
            })),
        }
    }

    /// Deliver an event to every current listener
    ///
    /// Listeners are snapshotted first, so a listener may subscribe or
    /// unsubscribe while being called. A listener removed during the emit is
    /// skipped; one added during it waits for the next event. Returns the
    /// number of listeners called.
    pub fn emit(&self, event: &E) -> usize {
        let snapshot: Vec<(ListenerId, Listener<E>)> = self
            .listeners
            .lock()
            .unwrap()
            .iter()
            .map(|(id, listener)| (id, listener.clone()))
            .collect();

        let mut called = 0;
        for (id, listener) in &snapshot {
            if !self.listeners.lock().unwrap().contains_key(*id) {
                continue;
            }
            listener(event);
            called += 1;
        }
        called
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.lock().unwrap().len()
    }
}

impl<E: 'static> Default for EventSource<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E> std::fmt::Debug for EventSource<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventSource")
            .field("listeners", &self.listeners.lock().map(|l| l.len()).unwrap_or(0))
            .finish()
    }
}

/// Guard for a registered listener
///
/// The listener is removed exactly once: on [`Subscription::unsubscribe`] or on
/// drop, whichever comes first. If the source is already gone, release is a
/// no-op.
pub struct Subscription {
    id: ListenerId,
    release: Option<Box<dyn FnOnce() + Send + Sync>>,
}

impl Subscription {
    pub fn id(&self) -> ListenerId {
        self.id
    }

    /// Whether the listener is still registered through this guard
    pub fn is_active(&self) -> bool {
        self.release.is_some()
    }

    /// Remove the listener now
    pub fn unsubscribe(&mut self) {
        if let Some(release) = self.release.take() {
            release();
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.unsubscribe();
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
