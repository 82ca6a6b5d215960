//! Reactive stores.
//!
//! [`Store`] is a plain observable cell. [`PersistentStore`] wraps one and
//! mirrors its value into a [`Storage`](crate::storage::Storage) slot.

mod options;
mod persistent;
mod store;

pub use options::{StoreOptions, DEFAULT_KEY};
pub use persistent::PersistentStore;
pub use store::{Store, Subscription};
