//! Error types for the Cart actor.

use crate::framework::FrameworkError;
use crate::storage::StorageError;
use thiserror::Error;

/// Errors that can occur during cart operations.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum CartError {
    /// No cart is open under the given id.
    #[error("Cart not found: {0}")]
    NotFound(String),

    /// The cart snapshot could not be written to or removed from local storage.
    #[error("Cart storage error: {0}")]
    Storage(String),

    /// An error occurred while communicating with the actor system.
    #[error("Actor communication error: {0}")]
    ActorCommunicationError(String),
}

impl From<String> for CartError {
    fn from(msg: String) -> Self {
        CartError::ActorCommunicationError(msg)
    }
}

impl From<StorageError> for CartError {
    fn from(e: StorageError) -> Self {
        CartError::Storage(e.to_string())
    }
}

impl From<FrameworkError> for CartError {
    fn from(e: FrameworkError) -> Self {
        match e {
            FrameworkError::NotFound(id) => CartError::NotFound(id),
            // hooks report CartError; unwrap it so callers can match on it
            FrameworkError::EntityError(inner) => match inner.downcast::<CartError>() {
                Ok(e) => *e,
                Err(other) => CartError::ActorCommunicationError(other.to_string()),
            },
            other => CartError::ActorCommunicationError(other.to_string()),
        }
    }
}
