//! # Checkout
//!
//! Turns the cart into a backend order: one order record carrying the total and the
//! payment reference, then one order item per cart line. The cart is cleared only
//! after every item was written.

use crate::backend::{Backend, BackendError, OrderDraft, OrderItemDraft};
use crate::cart_actor::CartError;
use crate::clients::CartClient;
use crate::model::CartId;
use crate::storage::{Session, StorageError};
use thiserror::Error;
use tracing::{info, instrument, warn};

#[derive(Debug, Error)]
pub enum CheckoutError {
    #[error("Your cart is empty")]
    EmptyCart,

    /// The signed-in user, the restaurant or the table is unknown.
    #[error("Missing {0}; scan the table's QR code and sign in again")]
    MissingData(&'static str),

    #[error(transparent)]
    Cart(#[from] CartError),

    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error("Order creation failed: {0}")]
    Backend(#[from] BackendError),
}

/// Outcome of a successful checkout.
#[derive(Debug, Clone, PartialEq)]
pub struct CheckoutReceipt {
    pub order_document_id: String,
    pub total_price: f64,
    pub items_created: usize,
    /// Cart lines without a menu reference, which could not be linked to the order.
    pub skipped_item_ids: Vec<u64>,
}

/// Places the order for the cart `cart_id` and clears the cart.
///
/// `payment_reference` is the opaque id returned by the payment provider.
#[instrument(skip(backend, carts, session))]
pub async fn checkout(
    backend: &dyn Backend,
    carts: &CartClient,
    cart_id: &CartId,
    session: &Session,
    payment_reference: &str,
) -> Result<CheckoutReceipt, CheckoutError> {
    let cart = carts.cart(cart_id).await?;
    if cart.is_empty() {
        return Err(CheckoutError::EmptyCart);
    }

    let user = session.user().await?.ok_or(CheckoutError::MissingData("user"))?;
    let (restaurant, table) = session.dining_location().await?;
    let restaurant = restaurant.ok_or(CheckoutError::MissingData("restaurant"))?;
    let table = table.ok_or(CheckoutError::MissingData("table"))?;

    let total_price = cart.total();
    let order_document_id = backend
        .create_order(&OrderDraft {
            user_id: user.id,
            restaurant_document_id: restaurant,
            table_document_id: table,
            total_price,
            payment_reference: payment_reference.to_string(),
        })
        .await?;
    info!(order = %order_document_id, total_price, "Order created");

    let mut items_created = 0;
    let mut skipped_item_ids = Vec::new();
    for line in cart.lines() {
        let Some(menu_document_id) = line.menu_reference_id.clone() else {
            warn!(item_id = line.item_id, name = %line.name, "Skipping cart line without menu reference");
            skipped_item_ids.push(line.item_id);
            continue;
        };
        backend
            .create_order_item(&OrderItemDraft {
                order_document_id: order_document_id.clone(),
                menu_document_id,
                quantity: line.quantity,
                unit_price: line.unit_price,
                prep_time_minutes: line.prep_time_minutes,
            })
            .await?;
        items_created += 1;
    }

    carts.clear_cart(cart_id).await?;
    info!(order = %order_document_id, items_created, "Checkout complete");

    Ok(CheckoutReceipt {
        order_document_id,
        total_price,
        items_created,
        skipped_item_ids,
    })
}
