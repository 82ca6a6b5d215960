use serde::{Deserialize, Serialize};

use crate::storage::Tier;

/// Slot name used when none is given.
pub const DEFAULT_KEY: &str = "storable";

/// Where a [`PersistentStore`](super::PersistentStore) keeps its value.
///
/// Deserializes with every field optional, so it can sit inside an
/// application's own config:
///
/// ```
/// use storable::{StoreOptions, Tier};
///
/// let options: StoreOptions = serde_json::from_str(r#"{ "tier": "session" }"#).unwrap();
/// assert_eq!(options.key, "storable");
/// assert_eq!(options.tier, Tier::Session);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreOptions {
    /// Slot name within the tier.
    pub key: String,
    /// Tier the value is mirrored into.
    pub tier: Tier,
}

impl Default for StoreOptions {
    fn default() -> Self {
        Self {
            key: DEFAULT_KEY.to_string(),
            tier: Tier::default(),
        }
    }
}

impl StoreOptions {
    /// Default tier, custom key.
    pub fn new(key: impl Into<String>) -> Self {
        Self::default().with_key(key)
    }

    pub fn with_key(mut self, key: impl Into<String>) -> Self {
        self.key = key.into();
        self
    }

    pub fn with_tier(mut self, tier: Tier) -> Self {
        self.tier = tier;
        self
    }

    /// Shorthand for `with_tier(Tier::Session)`.
    pub fn session(self) -> Self {
        self.with_tier(Tier::Session)
    }
}

impl From<&str> for StoreOptions {
    fn from(key: &str) -> Self {
        Self::new(key)
    }
}

impl From<String> for StoreOptions {
    fn from(key: String) -> Self {
        Self::new(key)
    }
}
