//! Custom actions for the Cart actor.
//!
//! Every action mutates the cart, persists the snapshot and answers with the cart as it
//! stands afterwards, so callers never need a second round trip to render totals.

use crate::model::MenuItem;

/// Cart mutations beyond plain CRUD.
#[derive(Debug, Clone)]
pub enum CartAction {
    /// Adds one unit of a menu item, inserting a line on first add.
    Add(MenuItem),
    /// Sets a line's quantity; zero or less removes the line.
    UpdateQuantity { item_id: u64, quantity: i64 },
    /// Removes a line if present.
    Remove(u64),
    /// Empties the cart and deletes the persisted snapshot.
    Clear,
}
