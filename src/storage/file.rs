use std::collections::BTreeMap;
use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::sync::{PoisonError, RwLock};

use tempfile::NamedTempFile;
use tracing::debug;

use super::{Result, StorageArea};
use crate::error::StorageError;

/// A durable storage area kept in a single JSON file.
///
/// The file holds one JSON object mapping keys to raw string values. It is
/// read once on [`open`](FileStorage::open) and rewritten on every change
/// by syncing a uniquely named sibling temp file and renaming it over the
/// original. A change that fails to reach disk is not applied in memory
/// either.
#[derive(Debug)]
pub struct FileStorage {
    path: PathBuf,
    items: RwLock<BTreeMap<String, String>>,
}

impl FileStorage {
    /// Open the area at `path`. A missing or empty file is an empty area.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let items = match fs::read_to_string(&path) {
            Ok(raw) if raw.trim().is_empty() => BTreeMap::new(),
            Ok(raw) => serde_json::from_str(&raw).map_err(|source| StorageError::Corrupt {
                path: path.display().to_string(),
                source,
            })?,
            Err(err) if err.kind() == ErrorKind::NotFound => BTreeMap::new(),
            Err(err) => return Err(err.into()),
        };
        debug!(path = %path.display(), keys = items.len(), "opened file storage");

        Ok(Self {
            path,
            items: RwLock::new(items),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Apply `change` to a copy of the map, write it out, then commit.
    fn modify<F>(&self, change: F) -> Result<()>
    where
        F: FnOnce(&mut BTreeMap<String, String>) -> bool,
    {
        let mut items = self.items.write().unwrap_or_else(PoisonError::into_inner);
        let mut next = items.clone();
        if !change(&mut next) {
            return Ok(());
        }
        self.write_file(&next)?;
        *items = next;
        Ok(())
    }

    /// Write to a uniquely named temp file next to the target, flush it to
    /// disk, then rename it into place.
    fn write_file(&self, items: &BTreeMap<String, String>) -> Result<()> {
        let parent = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        fs::create_dir_all(parent)?;
        let raw =
            serde_json::to_string(items).map_err(|err| StorageError::Backend(err.to_string()))?;

        let mut tmp = NamedTempFile::new_in(parent)?;
        tmp.write_all(raw.as_bytes())?;
        tmp.as_file().sync_all()?;
        tmp.persist(&self.path).map_err(|err| err.error)?;
        Ok(())
    }
}

impl StorageArea for FileStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>> {
        let items = self.items.read().unwrap_or_else(PoisonError::into_inner);
        Ok(items.get(key).cloned())
    }

    fn set_item(&self, key: &str, value: &str) -> Result<()> {
        self.modify(|items| {
            items.insert(key.to_string(), value.to_string()).as_deref() != Some(value)
        })
    }

    fn remove_item(&self, key: &str) -> Result<()> {
        self.modify(|items| items.remove(key).is_some())
    }

    fn clear(&self) -> Result<()> {
        self.modify(|items| {
            let changed = !items.is_empty();
            items.clear();
            changed
        })
    }

    fn len(&self) -> Result<usize> {
        let items = self.items.read().unwrap_or_else(PoisonError::into_inner);
        Ok(items.len())
    }
}
