use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};

use super::{Result, StorageArea};

/// A storage area that lives as long as the process.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    items: RwLock<HashMap<String, String>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

impl StorageArea for MemoryStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>> {
        let items = self.items.read().unwrap_or_else(PoisonError::into_inner);
        Ok(items.get(key).cloned())
    }

    fn set_item(&self, key: &str, value: &str) -> Result<()> {
        let mut items = self.items.write().unwrap_or_else(PoisonError::into_inner);
        items.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove_item(&self, key: &str) -> Result<()> {
        let mut items = self.items.write().unwrap_or_else(PoisonError::into_inner);
        items.remove(key);
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        let mut items = self.items.write().unwrap_or_else(PoisonError::into_inner);
        items.clear();
        Ok(())
    }

    fn len(&self) -> Result<usize> {
        let items = self.items.read().unwrap_or_else(PoisonError::into_inner);
        Ok(items.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_get_remove() {
        let area = MemoryStorage::new();
        assert_eq!(area.get_item("a").unwrap(), None);

        area.set_item("a", "1").unwrap();
        area.set_item("a", "2").unwrap();
        assert_eq!(area.get_item("a").unwrap().as_deref(), Some("2"));
        assert_eq!(area.len().unwrap(), 1);

        area.remove_item("a").unwrap();
        assert_eq!(area.get_item("a").unwrap(), None);
    }

    #[test]
    fn remove_missing_is_ok() {
        let area = MemoryStorage::new();
        area.remove_item("nope").unwrap();
    }

    #[test]
    fn clear_empties_area() {
        let area = MemoryStorage::new();
        area.set_item("a", "1").unwrap();
        area.set_item("b", "2").unwrap();
        area.clear().unwrap();
        assert!(area.is_empty().unwrap());
    }
}
