// src/events/registry.rs

//! Generic listener registry.
//!
//! One `ListenerSet<E>` replaces the per-category listener interfaces of
//! toolkit binding layers: every event category shares this single
//! implementation, parameterized over its payload type.
//!
//! A set is owned by the `EventCollector` and only ever touched from the
//! designated event thread; registration takes `&mut self`, so mutating
//! a registry from inside its own dispatch cannot compile.

use log::error;
use std::panic::{catch_unwind, AssertUnwindSafe};

/// Identifies a registered listener within one `ListenerSet`, for later
/// removal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

type BoxedListener<E> = Box<dyn FnMut(&E) + Send>;

/// An ordered collection of listeners for one event category.
///
/// Listeners are invoked in registration order. A panicking listener is
/// caught and logged; it does not abort delivery to the remaining
/// listeners or subsequent events.
pub struct ListenerSet<E> {
    next_id: u64,
    listeners: Vec<(ListenerId, BoxedListener<E>)>,
}

impl<E> ListenerSet<E> {
    pub fn new() -> Self {
        ListenerSet {
            next_id: 0,
            listeners: Vec::new(),
        }
    }

    /// Register a listener, returning an id that can be used to remove it.
    pub fn add(&mut self, listener: impl FnMut(&E) + Send + 'static) -> ListenerId {
        let id = ListenerId(self.next_id);
        self.next_id += 1;
        self.listeners.push((id, Box::new(listener)));
        id
    }

    /// Remove a listener by id. Returns false if the id is not present.
    pub fn remove(&mut self, id: ListenerId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(lid, _)| *lid != id);
        self.listeners.len() != before
    }

    pub fn len(&self) -> usize {
        self.listeners.len()
    }

    pub fn is_empty(&self) -> bool {
        self.listeners.is_empty()
    }

    /// Invoke every listener with `event`, in registration order.
    pub fn dispatch(&mut self, event: &E) {
        for (id, listener) in &mut self.listeners {
            let result = catch_unwind(AssertUnwindSafe(|| listener(event)));
            if result.is_err() {
                error!("Listener {:?} panicked during dispatch; continuing", id);
            }
        }
    }
}

impl<E> Default for ListenerSet<E> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[test]
    fn it_should_invoke_listeners_in_registration_order() {
        let order = Arc::new(std::sync::Mutex::new(Vec::new()));
        let mut set = ListenerSet::new();
        for tag in ["first", "second", "third"] {
            let order = order.clone();
            set.add(move |_: &u32| order.lock().unwrap().push(tag));
        }
        set.dispatch(&0);
        assert_eq!(*order.lock().unwrap(), vec!["first", "second", "third"]);
    }

    #[test]
    fn it_should_remove_only_the_listener_with_the_given_id() {
        let count = Arc::new(AtomicUsize::new(0));
        let mut set = ListenerSet::new();
        let c1 = count.clone();
        let id = set.add(move |_: &u32| {
            c1.fetch_add(1, Ordering::SeqCst);
        });
        let c2 = count.clone();
        set.add(move |_: &u32| {
            c2.fetch_add(10, Ordering::SeqCst);
        });

        assert!(set.remove(id));
        assert!(!set.remove(id));
        set.dispatch(&0);
        assert_eq!(count.load(Ordering::SeqCst), 10);
    }

    #[test]
    fn it_should_survive_a_panicking_listener() {
        let count = Arc::new(AtomicUsize::new(0));
        let mut set = ListenerSet::new();
        set.add(|_: &u32| panic!("listener bug"));
        let c = count.clone();
        set.add(move |_: &u32| {
            c.fetch_add(1, Ordering::SeqCst);
        });

        set.dispatch(&0);
        set.dispatch(&1);
        assert_eq!(count.load(Ordering::SeqCst), 2);
    }
}
