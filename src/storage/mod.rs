//! # Local Storage
//!
//! Device-local key-value persistence. Values are strings (JSON for structured
//! data), matching what the mobile client kept on the device, so the same keys
//! and payloads are used here.
//!
//! - [`LocalStore`] - async key-value trait
//! - [`MemoryStore`] - in-process store for tests and ephemeral sessions
//! - [`FileStore`] - JSON file on disk, rewritten on every change
//! - [`Session`] - typed accessors for the well-known keys

pub mod file;
pub mod memory;
pub mod session;

pub use file::FileStore;
pub use memory::MemoryStore;
pub use session::Session;

use async_trait::async_trait;
use thiserror::Error;

/// Well-known storage keys.
pub mod keys {
    pub const AUTH_TOKEN: &str = "userToken";
    pub const USER_PROFILE: &str = "userData";
    pub const RESTAURANT_PROFILE: &str = "restaurantData";
    pub const RESTAURANT_DOCUMENT_ID: &str = "restaurantDocumentId";
    pub const TABLE_DOCUMENT_ID: &str = "tableDocumentId";
    pub const PENDING_MENU_URL: &str = "pendingMenuURL";
    pub const CART: &str = crate::model::CART_STORAGE_KEY;

    /// Flag set once the feedback prompt for an order was shown.
    pub fn feedback_shown(order_document_id: &str) -> String {
        format!("feedback_shown_{}", order_document_id)
    }
}

/// Errors from local persistence.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Storage I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Storage encoding error: {0}")]
    Encoding(#[from] serde_json::Error),
}

/// Async key-value store.
#[async_trait]
pub trait LocalStore: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    async fn set(&self, key: &str, value: String) -> Result<(), StorageError>;

    /// Removing an absent key is not an error.
    async fn remove(&self, key: &str) -> Result<(), StorageError>;
}
