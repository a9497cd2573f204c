//! Orders as seen by the customer and the kitchen.
//!
//! The backend is authoritative for an order's contents and for `served`; the status
//! shown on screen is the later of the server's status and the time-based projection
//! from [`StatusPolicy`](crate::status::StatusPolicy), so it never moves backwards.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt::Display;
use std::str::FromStr;

/// Lifecycle of an order. The derive order is the progression order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    Processing,
    Preparing,
    Prepared,
    Served,
}

impl OrderStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Processing => "processing",
            OrderStatus::Preparing => "preparing",
            OrderStatus::Prepared => "prepared",
            OrderStatus::Served => "served",
        }
    }
}

impl Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OrderStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "processing" => Ok(OrderStatus::Processing),
            "preparing" => Ok(OrderStatus::Preparing),
            "prepared" => Ok(OrderStatus::Prepared),
            "served" => Ok(OrderStatus::Served),
            other => Err(format!("unknown order status: {other}")),
        }
    }
}

/// Backend numeric id of an order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct OrderId(pub u64);

impl From<u32> for OrderId {
    fn from(id: u32) -> Self {
        Self(u64::from(id))
    }
}

impl Display for OrderId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "order_{}", self.0)
    }
}

/// One line of a placed order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderItem {
    /// Document id of the menu item, when the backend populated it.
    pub menu_ref: Option<String>,
    pub name: Option<String>,
    pub quantity: u32,
    pub prep_time_minutes: Option<u32>,
}

/// An order exactly as the backend returned it.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderSnapshot {
    pub id: OrderId,
    pub document_id: String,
    pub status: OrderStatus,
    pub total_price: f64,
    pub created_at: DateTime<Utc>,
    pub items: Vec<OrderItem>,
}

/// An order tracked locally for display.
#[derive(Debug, Clone, PartialEq)]
pub struct Order {
    pub id: OrderId,
    pub document_id: String,
    /// Status shown to the user; never regresses.
    pub status: OrderStatus,
    /// Status last reported by the backend.
    pub server_status: OrderStatus,
    pub total_price: f64,
    pub created_at: DateTime<Utc>,
    pub items: Vec<OrderItem>,
    pub progress_percent: u8,
    /// Time of the last evaluation.
    pub observed_at: DateTime<Utc>,
}

impl Order {
    /// Starts tracking a server snapshot; status is evaluated by the actor on create.
    pub fn from_snapshot(snapshot: OrderSnapshot, observed_at: DateTime<Utc>) -> Self {
        Self {
            id: snapshot.id,
            document_id: snapshot.document_id,
            status: snapshot.status,
            server_status: snapshot.status,
            total_price: snapshot.total_price,
            created_at: snapshot.created_at,
            items: snapshot.items,
            progress_percent: 0,
            observed_at,
        }
    }

    /// Overwrites the server-owned fields with a fresh snapshot.
    ///
    /// The displayed `status` is left alone here; re-evaluation decides it.
    pub fn overwrite(&mut self, snapshot: OrderSnapshot, observed_at: DateTime<Utc>) {
        self.document_id = snapshot.document_id;
        self.server_status = snapshot.status;
        self.total_price = snapshot.total_price;
        self.created_at = snapshot.created_at;
        self.items = snapshot.items;
        self.observed_at = self.observed_at.max(observed_at);
    }
}

/// Payload for starting to track an order.
#[derive(Debug, Clone)]
pub struct TrackOrder {
    pub snapshot: OrderSnapshot,
    pub now: DateTime<Utc>,
}

/// Payload for overwriting a tracked order with the server's view.
#[derive(Debug, Clone)]
pub struct OrderReconcile {
    pub snapshot: OrderSnapshot,
    pub now: DateTime<Utc>,
}
