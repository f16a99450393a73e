//! In-memory key/value store.

use std::{
    collections::HashMap,
    sync::{Arc, RwLock},
};

use super::{KeyValueStore, StorageError, validate_key};

/// Key/value store backed by a shared map.
///
/// Clones share the same map, so two stores built from one clone observe
/// each other's writes (last write wins).
#[derive(Debug, Clone, Default)]
pub struct InMemoryStore {
    values: Arc<RwLock<HashMap<String, String>>>,
}

impl InMemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store holding one value, as if written by an earlier session.
    pub fn with_value(key: &str, value: &str) -> Self {
        let store = Self::new();

        if let Ok(mut values) = store.values.write() {
            values.insert(key.to_string(), value.to_string());
        }

        store
    }
}

impl KeyValueStore for InMemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        validate_key(key)?;

        let values = self
            .values
            .read()
            .map_err(|_poisoned| StorageError::LockPoisoned("read"))?;

        Ok(values.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        validate_key(key)?;

        let mut values = self
            .values
            .write()
            .map_err(|_poisoned| StorageError::LockPoisoned("write"))?;

        values.insert(key.to_string(), value.to_string());

        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        validate_key(key)?;

        let mut values = self
            .values
            .write()
            .map_err(|_poisoned| StorageError::LockPoisoned("write"))?;

        values.remove(key);

        Ok(())
    }
}
