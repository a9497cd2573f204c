//! [`ActorEntity`] implementation for [`Cart`].
//!
//! The actor's context is the [`LocalStore`] the cart persists to. A snapshot is
//! loaded when the cart is opened and written back after every mutation.

use super::actions::CartAction;
use super::error::CartError;
use crate::framework::ActorEntity;
use crate::model::{Cart, CartCreate, CartId, CartSnapshot};
use crate::storage::LocalStore;
use async_trait::async_trait;
use std::sync::Arc;
use tracing::{debug, warn};

impl Cart {
    async fn persist(&self, store: &dyn LocalStore) -> Result<(), CartError> {
        let raw = serde_json::to_string(&self.snapshot())
            .map_err(|e| CartError::Storage(e.to_string()))?;
        store.set(&self.storage_key, raw).await?;
        debug!(key = %self.storage_key, lines = self.lines().len(), "Cart persisted");
        Ok(())
    }
}

#[async_trait]
impl ActorEntity for Cart {
    type Id = CartId;
    type Create = CartCreate;
    /// Replaces all lines with the given snapshot.
    type Update = CartSnapshot;
    type Action = CartAction;
    type ActionResult = Cart;
    type Context = Arc<dyn LocalStore>;
    type Error = CartError;

    fn assigned_id(params: &CartCreate) -> Option<CartId> {
        Some(CartId(params.storage_key.clone()))
    }

    fn from_create_params(id: CartId, params: CartCreate) -> Result<Self, CartError> {
        Ok(Cart::new(id, params.storage_key))
    }

    /// Restores the persisted snapshot, if any. A snapshot that no longer parses is
    /// logged and the cart starts empty.
    async fn on_create(&mut self, store: &Self::Context) -> Result<(), CartError> {
        let Some(raw) = store.get(&self.storage_key).await? else {
            return Ok(());
        };
        match serde_json::from_str::<CartSnapshot>(&raw) {
            Ok(snapshot) => {
                self.restore(snapshot);
                debug!(key = %self.storage_key, lines = self.lines().len(), "Cart restored");
            }
            Err(e) => {
                warn!(key = %self.storage_key, error = %e, "Ignoring corrupt cart snapshot");
            }
        }
        Ok(())
    }

    async fn on_update(&mut self, snapshot: CartSnapshot, store: &Self::Context) -> Result<(), CartError> {
        let mut next = self.clone();
        next.restore(snapshot);
        next.persist(store.as_ref()).await?;
        *self = next;
        Ok(())
    }

    /// The mutation is applied to a copy and committed only once storage accepted it, so
    /// a failed write leaves memory and disk agreeing on the previous cart.
    async fn handle_action(&mut self, action: CartAction, store: &Self::Context) -> Result<Cart, CartError> {
        let mut next = self.clone();
        let clearing = matches!(action, CartAction::Clear);
        match action {
            CartAction::Add(item) => next.add(item),
            CartAction::UpdateQuantity { item_id, quantity } => {
                next.update_quantity(item_id, quantity)
            }
            CartAction::Remove(item_id) => next.remove(item_id),
            CartAction::Clear => next.clear(),
        }
        if clearing {
            store.remove(&next.storage_key).await?;
        } else {
            next.persist(store.as_ref()).await?;
        }
        *self = next;
        Ok(self.clone())
    }
}
