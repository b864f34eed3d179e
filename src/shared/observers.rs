use std::sync::{Arc, Mutex, Weak};

type Callback<E> = Arc<dyn Fn(&E) + Send + Sync>;

struct ObserverList<E> {
    next_id: u64,
    callbacks: Vec<(u64, Callback<E>)>,
}

/// Explicit observer list with synchronous notify-all. Clones share the
/// same list.
pub struct Observers<E> {
    inner: Arc<Mutex<ObserverList<E>>>,
}

impl<E> Clone for Observers<E> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<E> Default for Observers<E> {
    fn default() -> Self {
        Self {
            inner: Arc::new(Mutex::new(ObserverList {
                next_id: 0,
                callbacks: Vec::new(),
            })),
        }
    }
}

impl<E: 'static> Observers<E> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a callback. It stays registered until the returned disposer
    /// is dropped or disposed.
    pub fn register<F>(&self, callback: F) -> ObserverDisposer
    where
        F: Fn(&E) + Send + Sync + 'static,
    {
        let id = {
            let mut list = lock(&self.inner);
            let id = list.next_id;
            list.next_id += 1;
            list.callbacks.push((id, Arc::new(callback)));
            id
        };

        let weak: Weak<Mutex<ObserverList<E>>> = Arc::downgrade(&self.inner);
        ObserverDisposer {
            unregister: Some(Box::new(move || {
                if let Some(inner) = weak.upgrade() {
                    lock(&inner).callbacks.retain(|(existing, _)| *existing != id);
                }
            })),
        }
    }

    /// Calls every registered callback once, in registration order.
    pub fn notify(&self, event: &E) {
        let callbacks: Vec<Callback<E>> = lock(&self.inner)
            .callbacks
            .iter()
            .map(|(_, callback)| Arc::clone(callback))
            .collect();
        for callback in callbacks {
            callback(event);
        }
    }

    pub fn len(&self) -> usize {
        lock(&self.inner).callbacks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn lock<T>(mutex: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

#[must_use = "dropping the disposer unregisters the observer"]
pub struct ObserverDisposer {
    unregister: Option<Box<dyn FnOnce() + Send + Sync>>,
}

impl ObserverDisposer {
    pub fn dispose(mut self) {
        if let Some(unregister) = self.unregister.take() {
            unregister();
        }
    }

    /// Keep the observer registered for the lifetime of the list.
    pub fn detach(mut self) {
        self.unregister = None;
    }
}

impl Drop for ObserverDisposer {
    fn drop(&mut self) {
        if let Some(unregister) = self.unregister.take() {
            unregister();
        }
    }
}
