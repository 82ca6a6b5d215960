//! Error types.

use thiserror::Error;

/// A fault reported by a [`StorageArea`](crate::storage::StorageArea) backend.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("storage I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("storage file {path} is corrupt: {source}")]
    Corrupt {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("storage quota exceeded")]
    QuotaExceeded,

    #[error("storage is unavailable")]
    Unavailable,

    #[error("storage backend error: {0}")]
    Backend(String),
}

impl StorageError {
    /// Map a DOM exception by its `name`.
    #[cfg_attr(not(target_arch = "wasm32"), allow(dead_code))]
    pub(crate) fn from_dom(name: &str, message: &str) -> Self {
        match name {
            "QuotaExceededError" => Self::QuotaExceeded,
            "SecurityError" | "InvalidStateError" => Self::Unavailable,
            _ => Self::Backend(format!("{name}: {message}")),
        }
    }
}

/// Failure to mirror a store's value into its persistence slot.
///
/// Returned by the mutating operations of
/// [`PersistentStore`](crate::PersistentStore). When one of these is
/// returned the in-memory value has not changed and no subscriber ran.
#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("failed to serialize value: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("failed to persist slot `{key}`: {source}")]
    Storage {
        key: String,
        #[source]
        source: StorageError,
    },
}

impl PersistenceError {
    pub(crate) fn storage(key: &str, source: StorageError) -> Self {
        Self::Storage {
            key: key.to_string(),
            source,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dom_exceptions_by_name() {
        assert!(matches!(
            StorageError::from_dom("QuotaExceededError", "the quota has been exceeded"),
            StorageError::QuotaExceeded
        ));
        assert!(matches!(
            StorageError::from_dom("SecurityError", "access denied"),
            StorageError::Unavailable
        ));
        // Only the name decides; a message mentioning quotas is not enough.
        match StorageError::from_dom("DataError", "QuotaExceeded in message") {
            StorageError::Backend(text) => assert_eq!(text, "DataError: QuotaExceeded in message"),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn persistence_error_names_the_slot() {
        let err = PersistenceError::storage("counter", StorageError::QuotaExceeded);
        assert_eq!(
            err.to_string(),
            "failed to persist slot `counter`: storage quota exceeded"
        );
    }
}
