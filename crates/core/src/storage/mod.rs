//! Storage
//!
//! String key/value persistence in the manner of browser local storage. The
//! cart and the local order log each live under a single well-known key.

use std::fmt::Debug;

use thiserror::Error;

mod file;
mod memory;

pub use file::FileStore;
pub use memory::InMemoryStore;

/// Key the cart is persisted under.
pub const CART_STORAGE_KEY: &str = "cartItems";

/// Key the local order log is persisted under.
pub const ORDERS_STORAGE_KEY: &str = "orders";

/// Storage layer failures.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Reading or writing the backing file failed.
    #[error("storage io error: {0}")]
    Io(#[from] std::io::Error),

    /// A shared map lock was poisoned by a panicking writer.
    #[error("storage lock poisoned during {0}")]
    LockPoisoned(&'static str),

    /// Key cannot be used as a storage name.
    #[error("invalid storage key: {0:?}")]
    InvalidKey(String),

    /// Value could not be serialized for writing.
    #[error("failed to serialize value: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Key/value store for serialized state.
///
/// All values are strings; callers own the encoding.
pub trait KeyValueStore: Debug + Send + Sync {
    /// Read the value stored under `key`.
    ///
    /// # Errors
    ///
    /// Returns a [`StorageError`] if the backend cannot be read.
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Store `value` under `key`, replacing any previous value.
    ///
    /// # Errors
    ///
    /// Returns a [`StorageError`] if the backend cannot be written.
    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Remove `key`. Removing an absent key succeeds.
    ///
    /// # Errors
    ///
    /// Returns a [`StorageError`] if the backend cannot be written.
    fn remove(&self, key: &str) -> Result<(), StorageError>;
}

pub(crate) fn validate_key(key: &str) -> Result<(), StorageError> {
    let valid = !key.is_empty()
        && key
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_'));

    if valid {
        Ok(())
    } else {
        Err(StorageError::InvalidKey(key.to_string()))
    }
}
