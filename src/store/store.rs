use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{
    Arc, Mutex, MutexGuard, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard, Weak,
};

type Subscriber<T> = Arc<dyn Fn(&T) + Send + Sync>;
type SubscriberList<T> = RwLock<Vec<(usize, Subscriber<T>)>>;

/// Notifications waiting to be delivered, oldest first.
struct Outbox<T> {
    queue: VecDeque<(Subscriber<T>, Arc<T>)>,
    draining: bool,
}

/// A thread-safe reactive cell.
///
/// A store holds a value and an ordered list of subscribers. Every
/// replacement of the value notifies all subscribers synchronously, in the
/// order they subscribed. Clones share the same value and subscribers.
///
/// A change made from inside a subscriber is queued behind the
/// notifications already in flight, so every subscriber sees values in the
/// order they were set and its last call carries the current value.
pub struct Store<T> {
    state: Arc<RwLock<T>>,
    subscribers: Arc<SubscriberList<T>>,
    outbox: Arc<Mutex<Outbox<T>>>,
    next_id: Arc<AtomicUsize>,
}

impl<T: Clone> Store<T> {
    /// Create a new store with the given initial state.
    pub fn new(initial: T) -> Self {
        Self {
            state: Arc::new(RwLock::new(initial)),
            subscribers: Arc::new(RwLock::new(Vec::new())),
            outbox: Arc::new(Mutex::new(Outbox {
                queue: VecDeque::new(),
                draining: false,
            })),
            next_id: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Get a clone of the current state.
    pub fn get(&self) -> T {
        self.read_state().clone()
    }

    /// Read state by reference without cloning.
    pub fn with<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&T) -> R,
    {
        let state = self.read_state();
        f(&*state)
    }

    /// Mutate the state in place, then notify.
    pub fn update<F>(&self, f: F)
    where
        F: FnOnce(&mut T),
    {
        let drain = {
            let mut state = self.write_state();
            f(&mut *state);
            self.enqueue(&state)
        };
        if drain {
            self.deliver();
        }
    }

    /// Compute a new state from the current one, then notify.
    ///
    /// The state lock is released before `f` runs, so `f` may read the
    /// store itself.
    pub fn replace_with<F>(&self, f: F)
    where
        F: FnOnce(&T) -> T,
    {
        let current = self.get();
        self.set(f(&current));
    }

    /// Set a new state value.
    pub fn set(&self, new_state: T) {
        if self.replace(new_state) {
            self.deliver();
        }
    }

    /// Swap in a new state and queue its notifications without sending
    /// them. Returns `true` when the caller must call [`deliver`](Self::deliver).
    pub(crate) fn replace(&self, new_state: T) -> bool {
        let mut state = self.write_state();
        *state = new_state;
        self.enqueue(&state)
    }

    /// Subscribe to state changes.
    ///
    /// The callback runs once immediately with the current state and then
    /// after every change, until the returned [`Subscription`] is dropped.
    pub fn subscribe<F>(&self, callback: F) -> Subscription
    where
        F: Fn(&T) + Send + Sync + 'static,
        T: 'static,
    {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        let callback: Subscriber<T> = Arc::new(callback);

        self.subscribers
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .push((id, Arc::clone(&callback)));

        let current = self.get();
        callback(&current);

        let weak: Weak<SubscriberList<T>> = Arc::downgrade(&self.subscribers);
        Subscription {
            remove: Some(Box::new(move || {
                if let Some(subscribers) = weak.upgrade() {
                    subscribers
                        .write()
                        .unwrap_or_else(PoisonError::into_inner)
                        .retain(|(sub_id, _)| *sub_id != id);
                }
            })),
        }
    }

    /// Number of live subscribers.
    pub fn subscriber_count(&self) -> usize {
        self.subscribers
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Queue one notification per subscriber for `state`.
    ///
    /// Called with the state write lock held so queue order matches the
    /// order of replacements. Returns `true` if nobody is draining yet.
    fn enqueue(&self, state: &T) -> bool {
        let subscribers = self
            .subscribers
            .read()
            .unwrap_or_else(PoisonError::into_inner);
        if subscribers.is_empty() {
            return false;
        }

        let snapshot = Arc::new(state.clone());
        let mut outbox = self.lock_outbox();
        outbox.queue.extend(
            subscribers
                .iter()
                .map(|(_, subscriber)| (Arc::clone(subscriber), Arc::clone(&snapshot))),
        );
        if outbox.draining {
            false
        } else {
            outbox.draining = true;
            true
        }
    }

    /// Send queued notifications until the queue is empty.
    ///
    /// No lock is held while a subscriber runs, so subscribers may read or
    /// write the store; their writes land at the back of the queue.
    pub(crate) fn deliver(&self) {
        let _reset = DrainReset(&self.outbox);
        loop {
            let (subscriber, value) = {
                let mut outbox = self.lock_outbox();
                match outbox.queue.pop_front() {
                    Some(next) => next,
                    None => {
                        outbox.draining = false;
                        return;
                    }
                }
            };
            subscriber(&value);
        }
    }

    fn lock_outbox(&self) -> MutexGuard<'_, Outbox<T>> {
        self.outbox.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn read_state(&self) -> RwLockReadGuard<'_, T> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write_state(&self) -> RwLockWriteGuard<'_, T> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Ends a drain cut short by a panicking subscriber. Whatever is still
/// queued at that point is dropped.
struct DrainReset<'a, T>(&'a Mutex<Outbox<T>>);

impl<T> Drop for DrainReset<'_, T> {
    fn drop(&mut self) {
        if std::thread::panicking() {
            let mut outbox = self.0.lock().unwrap_or_else(PoisonError::into_inner);
            outbox.queue.clear();
            outbox.draining = false;
        }
    }
}

impl<T> Clone for Store<T> {
    fn clone(&self) -> Self {
        Self {
            state: Arc::clone(&self.state),
            subscribers: Arc::clone(&self.subscribers),
            outbox: Arc::clone(&self.outbox),
            next_id: Arc::clone(&self.next_id),
        }
    }
}

/// RAII guard for a store subscriber.
///
/// Dropping the guard removes the subscriber.
#[must_use = "dropping a Subscription unsubscribes immediately"]
pub struct Subscription {
    remove: Option<Box<dyn FnOnce() + Send + Sync>>,
}

impl Subscription {
    /// Remove the subscriber now.
    pub fn unsubscribe(mut self) {
        self.cancel();
    }

    fn cancel(&mut self) {
        if let Some(remove) = self.remove.take() {
            remove();
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.cancel();
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription")
            .field("active", &self.remove.is_some())
            .finish()
    }
}
