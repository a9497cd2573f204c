//! # Backend Client
//!
//! The REST content backend is the source of truth for orders, menus and feedback.
//! [`Backend`] is the seam the rest of the crate talks to:
//!
//! - [`HttpBackend`] - reqwest client for a live backend
//! - [`MemoryBackend`] - in-process double used by the poller and checkout tests

pub mod dto;
pub mod http;
pub mod memory;

pub use http::HttpBackend;
pub use memory::MemoryBackend;

use crate::model::{
    DiningTable, Feedback, MenuItem, OrderSnapshot, OrderStatus, RestaurantProfile, UserProfile,
    ValidMenuItem,
};
use async_trait::async_trait;
use thiserror::Error;

/// Errors from talking to the backend.
#[derive(Debug, Error)]
pub enum BackendError {
    #[error("Request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Non-2xx response; `message` is the backend's `error.message` when it sent one.
    #[error("Backend returned {status}: {message}")]
    Status { status: u16, message: String },

    #[error("Malformed response: {0}")]
    Malformed(String),
}

/// New order as submitted at checkout.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderDraft {
    pub user_id: u64,
    pub restaurant_document_id: String,
    pub table_document_id: String,
    pub total_price: f64,
    /// Opaque reference from the payment provider.
    pub payment_reference: String,
}

/// One order line, linked to its order and menu item.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderItemDraft {
    pub order_document_id: String,
    pub menu_document_id: String,
    pub quantity: u32,
    pub unit_price: f64,
    pub prep_time_minutes: u32,
}

/// The customer's most recent served order, as needed by the feedback prompt.
#[derive(Debug, Clone, PartialEq)]
pub struct ServedOrder {
    pub document_id: String,
    /// Feedback entries already attached to the order.
    pub feedback_count: usize,
    pub restaurant: Option<RestaurantProfile>,
}

/// Result of a successful login.
#[derive(Debug, Clone, PartialEq)]
pub struct LoginSession {
    pub token: String,
    pub user: UserProfile,
    /// Present for restaurant admins.
    pub restaurant: Option<RestaurantProfile>,
}

/// A new account, customer or restaurant admin.
#[derive(Debug, Clone, PartialEq)]
pub struct Registration {
    pub username: String,
    pub email: String,
    pub password: String,
    /// `customer` or `admin`.
    pub role: String,
}

/// Typed operations against the content backend.
#[async_trait]
pub trait Backend: Send + Sync {
    async fn login(&self, identifier: &str, password: &str) -> Result<LoginSession, BackendError>;

    async fn register(&self, registration: &Registration) -> Result<(), BackendError>;

    /// Unserved orders placed by a customer, items populated with their menu items.
    async fn fetch_customer_orders(&self, user_id: u64) -> Result<Vec<OrderSnapshot>, BackendError>;

    /// Unserved, non-empty orders of a restaurant.
    async fn fetch_restaurant_orders(
        &self,
        restaurant_document_id: &str,
    ) -> Result<Vec<OrderSnapshot>, BackendError>;

    async fn mark_order_served(&self, document_id: &str) -> Result<(), BackendError>;

    /// Creates an order and returns its document id.
    async fn create_order(&self, draft: &OrderDraft) -> Result<String, BackendError>;

    async fn create_order_item(&self, draft: &OrderItemDraft) -> Result<(), BackendError>;

    async fn fetch_menu(&self, restaurant_document_id: &str) -> Result<Vec<MenuItem>, BackendError>;

    /// Fetches the menu behind a scanned QR link.
    async fn fetch_menu_from_link(&self, url: &str) -> Result<Vec<MenuItem>, BackendError>;

    async fn create_menu_item(
        &self,
        restaurant_document_id: &str,
        item: &ValidMenuItem,
    ) -> Result<MenuItem, BackendError>;

    async fn update_menu_item(
        &self,
        document_id: &str,
        item: &ValidMenuItem,
    ) -> Result<MenuItem, BackendError>;

    async fn delete_menu_item(&self, document_id: &str) -> Result<(), BackendError>;

    async fn latest_served_order(&self, user_id: u64) -> Result<Option<ServedOrder>, BackendError>;

    async fn submit_feedback(&self, user_id: u64, feedback: &Feedback) -> Result<(), BackendError>;

    /// The restaurant's configured `number_of_tables`, `None` when unset or unknown.
    async fn fetch_table_count(&self, restaurant_document_id: &str) -> Result<Option<u32>, BackendError>;

    async fn fetch_tables(&self, restaurant_document_id: &str) -> Result<Vec<DiningTable>, BackendError>;

    async fn create_table(
        &self,
        restaurant_document_id: &str,
        table_number: u32,
        qr_code_url: &str,
    ) -> Result<DiningTable, BackendError>;

    async fn delete_table(&self, document_id: &str) -> Result<(), BackendError>;
}

/// Orders a customer still waits for.
pub fn customer_view(orders: Vec<OrderSnapshot>) -> Vec<OrderSnapshot> {
    orders
        .into_iter()
        .filter(|o| o.status != OrderStatus::Served)
        .collect()
}

/// Orders the kitchen still has to serve. Empty and zero-total orders are leftovers of
/// checkouts that failed halfway and are hidden.
pub fn restaurant_view(orders: Vec<OrderSnapshot>) -> Vec<OrderSnapshot> {
    orders
        .into_iter()
        .filter(|o| !o.items.is_empty() && o.total_price > 0.0 && o.status != OrderStatus::Served)
        .collect()
}
