//! # Cart Client
//!
//! High-level API for the Cart actor. Every mutator returns the cart as it stands after
//! the change, already persisted.

use crate::cart_actor::{CartAction, CartError};
use crate::framework::{ActorClient, FrameworkError, ResourceClient};
use crate::model::{Cart, CartCreate, CartId, CartSnapshot, MenuItem};
use async_trait::async_trait;
use tracing::{debug, instrument};

/// Client for interacting with the Cart actor.
#[derive(Clone)]
pub struct CartClient {
    inner: ResourceClient<Cart>,
}

impl CartClient {
    pub fn new(inner: ResourceClient<Cart>) -> Self {
        Self { inner }
    }

    /// Opens the cart persisted under `params.storage_key`, restoring its snapshot.
    ///
    /// Opening a cart that is already open returns its id.
    #[instrument(skip(self))]
    pub async fn open(&self, params: CartCreate) -> Result<CartId, CartError> {
        let key = params.storage_key.clone();
        match self.inner.create(params).await {
            Ok(id) => Ok(id),
            Err(FrameworkError::AlreadyExists(_)) => {
                debug!(key = %key, "Cart already open");
                Ok(CartId(key))
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn act(&self, id: &CartId, action: CartAction) -> Result<Cart, CartError> {
        Ok(self.inner.perform_action(id.clone(), action).await?)
    }

    #[instrument(skip(self, item), fields(item_id = item.id))]
    pub async fn add_to_cart(&self, id: &CartId, item: MenuItem) -> Result<Cart, CartError> {
        self.act(id, CartAction::Add(item)).await
    }

    #[instrument(skip(self))]
    pub async fn update_quantity(
        &self,
        id: &CartId,
        item_id: u64,
        quantity: i64,
    ) -> Result<Cart, CartError> {
        self.act(id, CartAction::UpdateQuantity { item_id, quantity })
            .await
    }

    #[instrument(skip(self))]
    pub async fn remove_from_cart(&self, id: &CartId, item_id: u64) -> Result<Cart, CartError> {
        self.act(id, CartAction::Remove(item_id)).await
    }

    #[instrument(skip(self))]
    pub async fn clear_cart(&self, id: &CartId) -> Result<Cart, CartError> {
        self.act(id, CartAction::Clear).await
    }

    /// Replaces the cart's lines with `snapshot` and persists it.
    #[instrument(skip(self, snapshot))]
    pub async fn replace(&self, id: &CartId, snapshot: CartSnapshot) -> Result<Cart, CartError> {
        Ok(self.inner.update(id.clone(), snapshot).await?)
    }

    /// Current contents of the cart.
    pub async fn cart(&self, id: &CartId) -> Result<Cart, CartError> {
        self.get(id.clone())
            .await?
            .ok_or_else(|| CartError::NotFound(id.to_string()))
    }

    /// Σ(unit_price × quantity), computed from the current lines.
    pub async fn total(&self, id: &CartId) -> Result<f64, CartError> {
        Ok(self.cart(id).await?.total())
    }
}

#[async_trait]
impl ActorClient<Cart> for CartClient {
    type Error = CartError;

    fn inner(&self) -> &ResourceClient<Cart> {
        &self.inner
    }

    fn map_error(e: FrameworkError) -> Self::Error {
        e.into()
    }
}
