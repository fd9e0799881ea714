//! Synchronous listener registry.
//!
//! Sessions and timer engines notify their listeners after every effective
//! mutation. Listeners run on the caller's thread, in subscription order.

use std::sync::Arc;

use parking_lot::Mutex;

/// Handle returned by [`Observers::subscribe`], used to unsubscribe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ListenerId(u64);

pub type Listener<E> = Arc<dyn Fn(&E) + Send + Sync>;

pub struct Observers<E> {
    inner: Mutex<Registry<E>>,
}

struct Registry<E> {
    next_id: u64,
    listeners: Vec<(ListenerId, Listener<E>)>,
}

impl<E> Observers<E> {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(Registry {
                next_id: 0,
                listeners: Vec::new(),
            }),
        }
    }

    pub fn subscribe<F>(&self, listener: F) -> ListenerId
    where
        F: Fn(&E) + Send + Sync + 'static,
    {
        let mut reg = self.inner.lock();
        let id = ListenerId(reg.next_id);
        reg.next_id += 1;
        reg.listeners.push((id, Arc::new(listener)));
        id
    }

    /// Returns `false` if the id was not registered.
    pub fn unsubscribe(&self, id: ListenerId) -> bool {
        let mut reg = self.inner.lock();
        let before = reg.listeners.len();
        reg.listeners.retain(|(lid, _)| *lid != id);
        reg.listeners.len() != before
    }

    pub fn len(&self) -> usize {
        self.inner.lock().listeners.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Deliver `event` to every listener.
    ///
    /// The registry lock is released before listeners run, so a listener may
    /// subscribe or unsubscribe without deadlocking.
    pub fn notify(&self, event: &E) {
        let listeners: Vec<Listener<E>> = self
            .inner
            .lock()
            .listeners
            .iter()
            .map(|(_, l)| Arc::clone(l))
            .collect();
        for listener in listeners {
            listener(event);
        }
    }
}

impl<E> Default for Observers<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E> std::fmt::Debug for Observers<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Observers")
            .field("listeners", &self.len())
            .finish()
    }
}
