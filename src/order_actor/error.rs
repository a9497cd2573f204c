//! Error types for the Order actor.

use crate::framework::FrameworkError;
use crate::model::OrderId;
use thiserror::Error;

/// Errors that can occur while tracking orders.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum OrderError {
    /// The requested order is not tracked.
    #[error("Order not found: {0}")]
    NotFound(String),

    /// A server snapshot was applied to a different order.
    #[error("Snapshot for {got} applied to {expected}")]
    SnapshotMismatch { expected: OrderId, got: OrderId },

    /// An error occurred while communicating with the actor system.
    #[error("Actor communication error: {0}")]
    ActorCommunicationError(String),
}

impl From<String> for OrderError {
    fn from(msg: String) -> Self {
        OrderError::ActorCommunicationError(msg)
    }
}

impl From<FrameworkError> for OrderError {
    fn from(e: FrameworkError) -> Self {
        match e {
            FrameworkError::NotFound(id) => OrderError::NotFound(id),
            FrameworkError::EntityError(inner) => match inner.downcast::<OrderError>() {
                Ok(e) => *e,
                Err(other) => OrderError::ActorCommunicationError(other.to_string()),
            },
            other => OrderError::ActorCommunicationError(other.to_string()),
        }
    }
}
