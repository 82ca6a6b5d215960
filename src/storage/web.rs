use wasm_bindgen::{JsCast, JsValue};
use web_sys::DomException;

use super::{Result, StorageArea, Tier};
use crate::error::StorageError;

/// Browser `localStorage` or `sessionStorage`.
///
/// `web_sys::Storage` is not `Send`, so the handle is looked up from the
/// window on every call instead of being held.
#[derive(Debug, Clone, Copy)]
pub struct WebStorage {
    tier: Tier,
}

impl WebStorage {
    /// Returns `None` when there is no window or the storage is disabled.
    pub fn detect(tier: Tier) -> Option<Self> {
        let area = Self { tier };
        area.storage().ok().map(|_| area)
    }

    pub fn tier(&self) -> Tier {
        self.tier
    }

    fn storage(&self) -> Result<web_sys::Storage> {
        let window = web_sys::window().ok_or(StorageError::Unavailable)?;
        let storage = match self.tier {
            Tier::Local => window.local_storage(),
            Tier::Session => window.session_storage(),
        };
        storage.ok().flatten().ok_or(StorageError::Unavailable)
    }
}

/// The DOM reports quota failures as a `QuotaExceededError` exception.
fn js_error(err: JsValue) -> StorageError {
    match err.dyn_ref::<DomException>() {
        Some(exception) => StorageError::from_dom(&exception.name(), &exception.message()),
        None => StorageError::Backend(err.as_string().unwrap_or_else(|| format!("{err:?}"))),
    }
}

impl StorageArea for WebStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>> {
        self.storage()?.get_item(key).map_err(js_error)
    }

    fn set_item(&self, key: &str, value: &str) -> Result<()> {
        self.storage()?.set_item(key, value).map_err(js_error)
    }

    fn remove_item(&self, key: &str) -> Result<()> {
        self.storage()?.remove_item(key).map_err(js_error)
    }

    fn clear(&self) -> Result<()> {
        self.storage()?.clear().map_err(js_error)
    }

    fn len(&self) -> Result<usize> {
        let len = self.storage()?.length().map_err(js_error)?;
        Ok(len as usize)
    }
}
