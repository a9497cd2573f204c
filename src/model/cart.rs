//! The customer's shopping cart.
//!
//! # Actor Framework
//! [`Cart`] implements the [`ActorEntity`](crate::framework::ActorEntity) trait in
//! [`crate::cart_actor::entity`]; the methods below are the synchronous reducer the
//! actor drives. Totals are always recomputed from the lines, never cached.

use crate::model::MenuItem;
use serde::{Deserialize, Serialize};
use std::fmt::Display;

/// Prep time assumed for a menu item that does not declare one.
pub const DEFAULT_PREP_MINUTES: u32 = 30;

/// Storage key of the customer's cart snapshot.
pub const CART_STORAGE_KEY: &str = "user-cart-storage";

/// Identifier of a cart. Carts are keyed by the storage key they persist under.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CartId(pub String);

impl From<u32> for CartId {
    fn from(id: u32) -> Self {
        Self(format!("cart_{}", id))
    }
}

impl Display for CartId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// One distinct menu item and its selected quantity.
///
/// Field names on the wire follow the snapshot format the mobile client persisted,
/// so existing snapshots load unchanged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CartLine {
    #[serde(rename = "id")]
    pub item_id: u64,
    pub name: String,
    #[serde(rename = "price")]
    pub unit_price: f64,
    pub quantity: u32,
    #[serde(rename = "time_for_preparation", default = "default_prep")]
    pub prep_time_minutes: u32,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(rename = "documentId", default)]
    pub menu_reference_id: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

fn default_prep() -> u32 {
    DEFAULT_PREP_MINUTES
}

impl CartLine {
    fn from_menu_item(item: MenuItem) -> Self {
        Self {
            item_id: item.id,
            name: item.name,
            unit_price: item.price,
            quantity: 1,
            prep_time_minutes: item
                .prep_time_minutes
                .filter(|m| *m > 0)
                .unwrap_or(DEFAULT_PREP_MINUTES),
            category: item.category,
            menu_reference_id: item.document_id,
            description: item.description,
        }
    }

    pub fn subtotal(&self) -> f64 {
        self.unit_price * f64::from(self.quantity)
    }
}

/// Cart lines, unique by item id, in the order they were first added.
#[derive(Debug, Clone)]
pub struct Cart {
    pub id: CartId,
    /// Storage key the snapshot is written to after every mutation.
    pub storage_key: String,
    lines: Vec<CartLine>,
}

/// Payload for opening a cart.
#[derive(Debug, Clone)]
pub struct CartCreate {
    pub storage_key: String,
}

impl Default for CartCreate {
    fn default() -> Self {
        Self {
            storage_key: CART_STORAGE_KEY.to_string(),
        }
    }
}

/// Persisted form of a cart: `{"state":{"cartItems":[..]},"version":0}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CartSnapshot {
    pub state: CartSnapshotState,
    #[serde(default)]
    pub version: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartSnapshotState {
    pub cart_items: Vec<CartLine>,
}

impl Cart {
    /// Creates an empty cart persisting under `storage_key`.
    pub fn new(id: CartId, storage_key: impl Into<String>) -> Self {
        Self {
            id,
            storage_key: storage_key.into(),
            lines: Vec::new(),
        }
    }

    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    pub fn line(&self, item_id: u64) -> Option<&CartLine> {
        self.lines.iter().find(|l| l.item_id == item_id)
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Σ(unit_price × quantity) over all lines.
    pub fn total(&self) -> f64 {
        self.lines.iter().map(CartLine::subtotal).sum()
    }

    /// Total number of units across all lines.
    pub fn item_count(&self) -> u64 {
        self.lines.iter().map(|l| u64::from(l.quantity)).sum()
    }

    /// Increments the line for `item`, inserting it with quantity 1 on first add.
    pub fn add(&mut self, item: MenuItem) {
        match self.lines.iter_mut().find(|l| l.item_id == item.id) {
            // a line already at the cap stays there
            Some(line) => line.quantity = line.quantity.saturating_add(1),
            None => self.lines.push(CartLine::from_menu_item(item)),
        }
    }

    /// Sets the quantity of a line; zero or less removes it.
    pub fn update_quantity(&mut self, item_id: u64, quantity: i64) {
        if quantity <= 0 {
            self.remove(item_id);
            return;
        }
        let quantity = u32::try_from(quantity).unwrap_or(u32::MAX);
        if let Some(line) = self.lines.iter_mut().find(|l| l.item_id == item_id) {
            line.quantity = quantity;
        }
    }

    /// Removes a line; absent ids are ignored.
    pub fn remove(&mut self, item_id: u64) {
        self.lines.retain(|l| l.item_id != item_id);
    }

    pub fn clear(&mut self) {
        self.lines.clear();
    }

    pub fn snapshot(&self) -> CartSnapshot {
        CartSnapshot {
            state: CartSnapshotState {
                cart_items: self.lines.clone(),
            },
            version: 0,
        }
    }

    /// Replaces the lines with a persisted snapshot, dropping zero-quantity and
    /// duplicate lines a hand-edited file might contain.
    pub fn restore(&mut self, snapshot: CartSnapshot) {
        self.lines.clear();
        for line in snapshot.state.cart_items {
            if line.quantity == 0 || self.line(line.item_id).is_some() {
                continue;
            }
            self.lines.push(line);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(id: u64, price: f64) -> MenuItem {
        MenuItem {
            id,
            document_id: Some(format!("menu-{}", id)),
            name: format!("Item {}", id),
            price,
            category: None,
            description: None,
            prep_time_minutes: None,
        }
    }

    fn cart() -> Cart {
        Cart::new(CartId::from(1), CART_STORAGE_KEY)
    }

    #[test]
    fn repeated_adds_count_up_quantity() {
        let mut cart = cart();
        for _ in 0..7 {
            cart.add(item(3, 4.5));
        }
        assert_eq!(cart.lines().len(), 1);
        assert_eq!(cart.line(3).unwrap().quantity, 7);
    }

    #[test]
    fn add_twice_then_remove_empties_the_cart() {
        let mut cart = cart();
        cart.add(item(1, 10.0));
        cart.add(item(1, 10.0));
        assert_eq!(cart.total(), 20.0);
        assert_eq!(cart.line(1).unwrap().quantity, 2);

        cart.remove(1);
        assert!(cart.is_empty());
        assert_eq!(cart.total(), 0.0);
    }

    #[test]
    fn update_to_zero_matches_remove() {
        let mut updated = cart();
        let mut removed = cart();
        for c in [&mut updated, &mut removed] {
            c.add(item(1, 2.0));
            c.add(item(2, 3.0));
        }

        updated.update_quantity(1, 0);
        removed.remove(1);
        assert_eq!(updated.lines(), removed.lines());

        updated.update_quantity(2, -4);
        assert!(updated.line(2).is_none());
    }

    #[test]
    fn update_sets_quantity_and_ignores_unknown_items() {
        let mut cart = cart();
        cart.add(item(1, 2.5));
        cart.update_quantity(1, 4);
        cart.update_quantity(99, 4);
        assert_eq!(cart.lines().len(), 1);
        assert_eq!(cart.item_count(), 4);
        assert_eq!(cart.total(), 10.0);
    }

    #[test]
    fn quantity_saturates_at_the_cap() {
        let mut cart = cart();
        cart.add(item(1, 1.0));
        cart.add(item(2, 1.0));
        cart.update_quantity(1, i64::MAX);
        cart.update_quantity(2, i64::from(u32::MAX));

        cart.add(item(1, 1.0));
        assert_eq!(cart.line(1).unwrap().quantity, u32::MAX);
        assert_eq!(cart.item_count(), 2 * u64::from(u32::MAX));
    }

    #[test]
    fn missing_prep_time_defaults_to_thirty_minutes() {
        let mut cart = cart();
        cart.add(item(1, 1.0));
        let mut timed = item(2, 1.0);
        timed.prep_time_minutes = Some(12);
        cart.add(timed);

        assert_eq!(cart.line(1).unwrap().prep_time_minutes, DEFAULT_PREP_MINUTES);
        assert_eq!(cart.line(2).unwrap().prep_time_minutes, 12);
    }

    #[test]
    fn snapshot_uses_persisted_field_names() {
        let mut cart = cart();
        cart.add(item(5, 7.0));
        let json = serde_json::to_value(cart.snapshot()).unwrap();
        let line = &json["state"]["cartItems"][0];
        assert_eq!(line["id"], 5);
        assert_eq!(line["price"], 7.0);
        assert_eq!(line["documentId"], "menu-5");
        assert_eq!(line["time_for_preparation"], 30);
        assert_eq!(json["version"], 0);
    }

    #[test]
    fn restore_skips_duplicates_and_empty_lines() {
        let raw = r#"{"state":{"cartItems":[
            {"id":1,"name":"Tea","price":2.0,"quantity":2},
            {"id":1,"name":"Tea","price":2.0,"quantity":5},
            {"id":2,"name":"Bun","price":1.5,"quantity":0}
        ]},"version":0}"#;
        let snapshot: CartSnapshot = serde_json::from_str(raw).unwrap();

        let mut cart = cart();
        cart.restore(snapshot);
        assert_eq!(cart.lines().len(), 1);
        assert_eq!(cart.line(1).unwrap().quantity, 2);
        assert_eq!(cart.line(1).unwrap().prep_time_minutes, DEFAULT_PREP_MINUTES);
    }
}
