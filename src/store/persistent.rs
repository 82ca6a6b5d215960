use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, warn};

use super::options::StoreOptions;
use super::store::{Store, Subscription};
use crate::error::PersistenceError;
use crate::storage::{Storage, StorageArea, Tier};

/// A [`Store`] that mirrors its value into a storage slot.
///
/// On construction the slot is read and, if it holds a valid JSON value,
/// that value becomes the starting state. Every [`set`](Self::set) and
/// [`update`](Self::update) writes the new value to the slot *before* the
/// in-memory value changes, and [`reset`](Self::reset) deletes the slot and
/// restores the value the store was created with.
///
/// Mutations on one store (and its clones) are serialized: the slot write
/// and the in-memory replacement happen under one lock, so concurrent
/// writers cannot leave the slot and the value disagreeing. Subscribers
/// run after that lock is released.
///
/// Built without a [`Storage`] handle the store is purely in memory and
/// none of its operations touch storage.
///
/// # Examples
///
/// ```
/// use storable::{PersistentStore, Storage};
///
/// let storage = Storage::in_memory();
///
/// let counter = PersistentStore::new(0, "counter", Some(&storage));
/// counter.set(5).unwrap();
///
/// // A fresh store on the same slot picks the value back up.
/// let again = PersistentStore::new(0, "counter", Some(&storage));
/// assert_eq!(again.get(), 5);
///
/// again.update(|n| n + 1).unwrap();
/// assert_eq!(again.get(), 6);
///
/// again.reset().unwrap();
/// assert_eq!(again.get(), 0);
/// ```
pub struct PersistentStore<T> {
    store: Store<T>,
    initial: Arc<T>,
    key: Arc<str>,
    tier: Tier,
    area: Option<Arc<dyn StorageArea>>,
    write_lock: Arc<Mutex<()>>,
}

type Result<T> = std::result::Result<T, PersistenceError>;

impl<T> PersistentStore<T>
where
    T: Serialize + DeserializeOwned + Clone,
{
    /// Create a store, hydrating it from the slot named by `options`.
    ///
    /// A missing slot, a slot holding JSON `null`, unreadable storage and
    /// contents that do not deserialize into `T` all fall back to
    /// `initial`. None of these are errors.
    pub fn new(initial: T, options: impl Into<StoreOptions>, storage: Option<&Storage>) -> Self {
        let StoreOptions { key, tier } = options.into();
        let area = storage.and_then(|storage| storage.area(tier));

        let start = match &area {
            Some(area) => hydrate(area.as_ref(), &key, tier).unwrap_or_else(|| initial.clone()),
            None => {
                debug!(key = %key, %tier, "no storage available, store is memory only");
                initial.clone()
            }
        };

        Self {
            store: Store::new(start),
            initial: Arc::new(initial),
            key: key.into(),
            tier,
            area,
            write_lock: Arc::new(Mutex::new(())),
        }
    }

    /// A memory-only store under the default options.
    pub fn in_memory(initial: T) -> Self {
        Self::new(initial, StoreOptions::default(), None)
    }

    /// Get a clone of the current value.
    pub fn get(&self) -> T {
        self.store.get()
    }

    /// Read the current value by reference.
    pub fn with<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&T) -> R,
    {
        self.store.with(f)
    }

    /// Subscribe to value changes. See [`Store::subscribe`].
    pub fn subscribe<F>(&self, callback: F) -> Subscription
    where
        F: Fn(&T) + Send + Sync + 'static,
        T: 'static,
    {
        self.store.subscribe(callback)
    }

    /// Persist `value`, then make it the current value.
    pub fn set(&self, value: T) -> Result<()> {
        let drain = {
            let _write = self.lock_writes();
            self.commit(value)?
        };
        self.finish(drain);
        Ok(())
    }

    /// Replace the current value with `f(current)`, persisting it first.
    ///
    /// Reading, `f`, the slot write and the replacement form one step with
    /// respect to other writers. `f` may read the store but must not write
    /// to it.
    pub fn update<F>(&self, f: F) -> Result<()>
    where
        F: FnOnce(&T) -> T,
    {
        let drain = {
            let _write = self.lock_writes();
            let value = f(&self.store.get());
            self.commit(value)?
        };
        self.finish(drain);
        Ok(())
    }

    /// Delete the slot and go back to the value the store was created with.
    pub fn reset(&self) -> Result<()> {
        let drain = {
            let _write = self.lock_writes();
            if let Some(area) = &self.area {
                area.remove_item(&self.key).map_err(|err| {
                    warn!(key = %self.key, tier = %self.tier, error = %err, "failed to clear slot");
                    PersistenceError::storage(&self.key, err)
                })?;
            }
            self.store.replace(T::clone(&self.initial))
        };
        self.finish(drain);
        Ok(())
    }

    /// Persist, then swap the value in. Caller holds the write lock.
    fn commit(&self, value: T) -> Result<bool> {
        self.persist(&value)?;
        Ok(self.store.replace(value))
    }

    fn finish(&self, drain: bool) {
        if drain {
            self.store.deliver();
        }
    }

    fn lock_writes(&self) -> MutexGuard<'_, ()> {
        self.write_lock.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn persist(&self, value: &T) -> Result<()> {
        let Some(area) = &self.area else {
            return Ok(());
        };
        let raw = serde_json::to_string(value)?;
        area.set_item(&self.key, &raw).map_err(|err| {
            warn!(key = %self.key, tier = %self.tier, error = %err, "failed to persist slot");
            PersistenceError::storage(&self.key, err)
        })
    }
}

impl<T> PersistentStore<T> {
    /// The slot name.
    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn tier(&self) -> Tier {
        self.tier
    }

    /// The value given at construction, restored by `reset`.
    pub fn initial(&self) -> &T {
        &self.initial
    }

    /// Whether writes reach a storage area.
    pub fn is_persistent(&self) -> bool {
        self.area.is_some()
    }
}

impl<T> Clone for PersistentStore<T> {
    fn clone(&self) -> Self {
        Self {
            store: self.store.clone(),
            initial: Arc::clone(&self.initial),
            key: Arc::clone(&self.key),
            tier: self.tier,
            area: self.area.clone(),
            write_lock: Arc::clone(&self.write_lock),
        }
    }
}

impl<T> std::fmt::Debug for PersistentStore<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PersistentStore")
            .field("key", &self.key)
            .field("tier", &self.tier)
            .field("persistent", &self.area.is_some())
            .finish_non_exhaustive()
    }
}

/// Read and parse the slot. `None` means "use the initial value".
fn hydrate<T: DeserializeOwned>(area: &dyn StorageArea, key: &str, tier: Tier) -> Option<T> {
    let raw = match area.get_item(key) {
        Ok(Some(raw)) => raw,
        Ok(None) => {
            debug!(key, %tier, "slot empty, using initial value");
            return None;
        }
        Err(err) => {
            warn!(key, %tier, error = %err, "failed to read slot, using initial value");
            return None;
        }
    };

    // `Option<T>` so a stored `null` reads as absent.
    match serde_json::from_str::<Option<T>>(&raw) {
        Ok(Some(value)) => {
            debug!(key, %tier, "hydrated from slot");
            Some(value)
        }
        Ok(None) => {
            debug!(key, %tier, "slot holds null, using initial value");
            None
        }
        Err(err) => {
            warn!(key, %tier, error = %err, "discarding unreadable slot contents");
            None
        }
    }
}
