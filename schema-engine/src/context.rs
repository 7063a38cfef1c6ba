//! Provide a [`Context`] for a resolution pass.
//!
//! Callers fill the context with caller-scoped data (an auth token, a message, ...) before
//! executing an operation. Resolvers and coerced input objects read it back without the data
//! being threaded through every accessor.

use std::sync::Arc;

use dashmap::DashMap;
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::json_ext::Value;

/// Holds [`Context`] entries.
pub(crate) type Entries = Arc<DashMap<String, Value>>;

/// Caller-scoped data for one resolution pass.
///
/// Cloning a context is cheap and every clone shares the same entries.
#[derive(Clone, Debug, Default)]
pub struct Context {
    entries: Entries,
}

impl Context {
    pub fn new() -> Self {
        Context {
            entries: Default::default(),
        }
    }

    /// Get a value from the context using the provided key.
    pub fn get<K, V>(&self, key: K) -> Result<Option<V>, serde_json::Error>
    where
        K: Into<String>,
        V: DeserializeOwned,
    {
        self.entries
            .get(&key.into())
            .map(|v| serde_json_bytes::from_value(v.value().clone()))
            .transpose()
    }

    /// Insert a value into the context using the provided key.
    ///
    /// Returns the previous value, if any.
    pub fn insert<K, V>(&self, key: K, value: V) -> Result<Option<V>, serde_json::Error>
    where
        K: Into<String>,
        V: DeserializeOwned + Serialize,
    {
        let value = serde_json_bytes::to_value(value)?;
        self.entries
            .insert(key.into(), value)
            .map(serde_json_bytes::from_value)
            .transpose()
    }

    /// Update a value in the context using the provided key, starting from `default` when the
    /// key is absent.
    pub fn upsert<K, V>(
        &self,
        key: K,
        upsert: impl FnOnce(V) -> V,
        default: impl FnOnce() -> V,
    ) -> Result<(), serde_json::Error>
    where
        K: Into<String>,
        V: DeserializeOwned + Serialize,
    {
        let key = key.into();
        let current = match self.entries.get(&key) {
            Some(v) => serde_json_bytes::from_value(v.value().clone())?,
            None => default(),
        };
        let updated = serde_json_bytes::to_value(upsert(current))?;
        self.entries.insert(key, updated);
        Ok(())
    }

    /// Returns `true` if an entry exists for `key`.
    pub fn contains_key(&self, key: impl Into<String>) -> bool {
        self.entries.contains_key(&key.into())
    }

    /// Read an entry as a string, ignoring non-string values.
    pub fn get_str(&self, key: impl Into<String>) -> Option<String> {
        self.entries
            .get(&key.into())
            .and_then(|v| v.value().as_str().map(str::to_owned))
    }
}
