//! Key/value persistence tiers.
//!
//! A [`StorageArea`] is a flat string-to-string map, the same shape as the
//! browser's `localStorage` and `sessionStorage`. [`Storage`] pairs one area
//! per [`Tier`] and is the handle a
//! [`PersistentStore`](crate::PersistentStore) is given at construction.
//! Passing no handle at all puts the store in memory-only mode.
//!
//! Backends:
//! - [`MemoryStorage`] - process lifetime, used for the session tier and tests
//! - [`FileStorage`] - durable JSON file, the native local tier
//! - `WebStorage` - browser storage, only on `wasm32`

mod file;
mod memory;
#[cfg(target_arch = "wasm32")]
mod web;

use std::sync::Arc;

use serde::{Deserialize, Serialize};

pub use crate::error::StorageError;
pub use file::FileStorage;
pub use memory::MemoryStorage;
#[cfg(target_arch = "wasm32")]
pub use web::WebStorage;

/// Result alias for storage backends.
pub type Result<T> = std::result::Result<T, StorageError>;

/// A synchronous key/value storage backend.
pub trait StorageArea: Send + Sync {
    /// Read the raw value stored under `key`.
    fn get_item(&self, key: &str) -> Result<Option<String>>;

    /// Store `value` under `key`, replacing any previous value.
    fn set_item(&self, key: &str, value: &str) -> Result<()>;

    /// Delete `key`. Removing a missing key is not an error.
    fn remove_item(&self, key: &str) -> Result<()>;

    /// Delete every key.
    fn clear(&self) -> Result<()>;

    /// Number of stored keys.
    fn len(&self) -> Result<usize>;

    fn is_empty(&self) -> Result<bool> {
        Ok(self.len()? == 0)
    }
}

/// Which persistence tier a store mirrors into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tier {
    /// Scoped to the current session.
    Session,
    /// Durable across sessions.
    #[default]
    Local,
}

impl Tier {
    /// Map a "use session storage" flag to a tier.
    pub fn from_session(session: bool) -> Self {
        if session {
            Tier::Session
        } else {
            Tier::Local
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Tier::Session => "session",
            Tier::Local => "local",
        }
    }
}

impl std::fmt::Display for Tier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One storage area per tier.
///
/// A tier can be missing; stores on a missing tier keep their value in
/// memory only, while the other tier keeps working.
#[derive(Clone)]
pub struct Storage {
    local: Option<Arc<dyn StorageArea>>,
    session: Option<Arc<dyn StorageArea>>,
}

impl Storage {
    pub fn new(local: Arc<dyn StorageArea>, session: Arc<dyn StorageArea>) -> Self {
        Self::from_areas(Some(local), Some(session))
    }

    /// Build from whichever tiers are available.
    pub fn from_areas(
        local: Option<Arc<dyn StorageArea>>,
        session: Option<Arc<dyn StorageArea>>,
    ) -> Self {
        Self { local, session }
    }

    /// Both tiers backed by fresh in-memory areas.
    pub fn in_memory() -> Self {
        Self::new(
            Arc::new(MemoryStorage::new()),
            Arc::new(MemoryStorage::new()),
        )
    }

    /// Durable local tier in the JSON file at `path`, in-memory session tier.
    pub fn with_file(path: impl Into<std::path::PathBuf>) -> Result<Self> {
        Ok(Self::new(
            Arc::new(FileStorage::open(path)?),
            Arc::new(MemoryStorage::new()),
        ))
    }

    /// The browser's `localStorage` and `sessionStorage`.
    ///
    /// Each tier is detected on its own, so a disabled `sessionStorage`
    /// does not take `localStorage` down with it. Returns `None` only when
    /// neither is available, e.g. outside a browser window.
    #[cfg(target_arch = "wasm32")]
    pub fn browser() -> Option<Self> {
        let area = |tier| {
            WebStorage::detect(tier).map(|web| Arc::new(web) as Arc<dyn StorageArea>)
        };
        let storage = Self::from_areas(area(Tier::Local), area(Tier::Session));
        if storage.local.is_none() && storage.session.is_none() {
            return None;
        }
        Some(storage)
    }

    /// The area backing `tier`, if that tier is available.
    pub fn area(&self, tier: Tier) -> Option<Arc<dyn StorageArea>> {
        match tier {
            Tier::Local => self.local.clone(),
            Tier::Session => self.session.clone(),
        }
    }
}

impl std::fmt::Debug for Storage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Storage").finish_non_exhaustive()
    }
}
