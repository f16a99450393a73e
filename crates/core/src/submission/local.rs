//! Local order log.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{info, warn};

use crate::{
    orders::{Order, OrderConfirmation},
    storage::{KeyValueStore, ORDERS_STORAGE_KEY, StorageError},
    submission::{OrderSubmitter, SubmissionError},
};

/// Submitter that appends orders to a JSON list in local storage.
///
/// Always succeeds unless the storage itself fails.
#[derive(Debug, Clone)]
pub struct LocalOrderLog {
    storage: Arc<dyn KeyValueStore>,
}

impl LocalOrderLog {
    /// Create a log over the given storage.
    pub fn new(storage: Arc<dyn KeyValueStore>) -> Self {
        Self { storage }
    }

    /// Previously placed orders, oldest first.
    ///
    /// An unreadable history is treated as empty.
    ///
    /// # Errors
    ///
    /// Returns a [`StorageError`] if the storage cannot be read.
    pub fn orders(&self) -> Result<Vec<Order>, StorageError> {
        let Some(raw) = self.storage.get(ORDERS_STORAGE_KEY)? else {
            return Ok(Vec::new());
        };

        match serde_json::from_str(&raw) {
            Ok(orders) => Ok(orders),
            Err(error) => {
                warn!("order history unreadable, showing none: {error}");

                Ok(Vec::new())
            }
        }
    }

    /// History to append to. Unlike [`LocalOrderLog::orders`], an unreadable
    /// history is an error so it is never overwritten.
    fn history(&self) -> Result<Vec<Order>, SubmissionError> {
        match self.storage.get(ORDERS_STORAGE_KEY)? {
            Some(raw) => serde_json::from_str(&raw).map_err(SubmissionError::UnreadableHistory),
            None => Ok(Vec::new()),
        }
    }
}

#[async_trait]
impl OrderSubmitter for LocalOrderLog {
    async fn submit(&self, order: &Order) -> Result<OrderConfirmation, SubmissionError> {
        let mut orders = self.history()?;
        orders.push(order.clone());

        let serialized = serde_json::to_string(&orders).map_err(StorageError::from)?;
        self.storage.set(ORDERS_STORAGE_KEY, &serialized)?;

        info!(order = %order.id(), count = orders.len(), "order recorded locally");

        Ok(OrderConfirmation {
            reference: order.id().to_string(),
            response: None,
        })
    }
}
