//! Order submission
//!
//! Checkout hands the order snapshot to a submitter that records it durably,
//! either on a remote order API or in the local order log.

use async_trait::async_trait;
use mockall::automock;
use thiserror::Error;

use crate::{
    orders::{Order, OrderConfirmation},
    storage::StorageError,
};

mod local;

pub use local::LocalOrderLog;

/// Errors raised while submitting an order.
#[derive(Debug, Error)]
pub enum SubmissionError {
    /// No credentials available for the order endpoint.
    #[error("not authenticated; log in to place an order")]
    Unauthenticated,

    /// The order endpoint refused the order.
    #[error("order rejected with status {status}: {message}")]
    Rejected {
        /// HTTP status code
        status: u16,

        /// Reason given by the server
        message: String,
    },

    /// The request could not be completed.
    #[error("order request failed")]
    Transport(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// The local order log holds data that is not an order list.
    #[error("existing order history is unreadable")]
    UnreadableHistory(#[source] serde_json::Error),

    /// The local order log could not be written.
    #[error("failed to record order")]
    Storage(#[from] StorageError),
}

/// Durable recorder of placed orders.
#[automock]
#[async_trait]
pub trait OrderSubmitter: Send + Sync {
    /// Record `order`, returning the collaborator's acknowledgement.
    async fn submit(&self, order: &Order) -> Result<OrderConfirmation, SubmissionError>;
}
