//! # Storable
//!
//! Reactive state that survives reloads.
//!
//! A [`PersistentStore`] is an observable value mirrored into a key/value
//! storage slot. It reads the slot when created, writes it on every change
//! and deletes it on reset:
//!
//! - `get` / `with` - read the current value
//! - `subscribe` - observe the value now and after every change
//! - `set` / `update` - persist a new value, then notify subscribers
//! - `reset` - delete the slot and return to the initial value
//!
//! Storage is passed in explicitly as a [`Storage`] handle with one
//! [`StorageArea`] per [`Tier`]. With no handle the store keeps its value in
//! memory only. On `wasm32`, `Storage::browser()` wraps the page's
//! `localStorage` and `sessionStorage`.
//!
//! ```
//! use storable::{PersistentStore, Storage, StoreOptions};
//!
//! let storage = Storage::in_memory();
//! let theme = PersistentStore::new(
//!     String::from("light"),
//!     StoreOptions::new("theme").session(),
//!     Some(&storage),
//! );
//!
//! let _sub = theme.subscribe(|t| println!("theme is {t}"));
//! theme.set("dark".into()).unwrap();
//! ```

pub mod error;
pub mod storage;
pub mod store;

// Re-export main types for convenience
pub use error::{PersistenceError, StorageError};
pub use storage::{FileStorage, MemoryStorage, Storage, StorageArea, Tier};
pub use store::{PersistentStore, Store, StoreOptions, Subscription};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn it_works() {
        // Basic smoke test
        let storage = Storage::in_memory();
        let store = PersistentStore::new(0, "smoke", Some(&storage));
        assert_eq!(store.get(), 0);
        store.set(42).unwrap();
        assert_eq!(PersistentStore::new(0, "smoke", Some(&storage)).get(), 42);
    }
}
