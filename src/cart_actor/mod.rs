//! # Cart Actor
//!
//! The customer's cart as a resource actor. One actor task owns every open cart, so
//! concurrent taps on "add" from different tasks are applied one after another and the
//! persisted snapshot always matches the last mutation.
//!
//! - [`entity`] - [`ActorEntity`](crate::framework::ActorEntity) implementation for [`Cart`]
//! - [`actions`] - [`CartAction`]
//! - [`error`] - [`CartError`]
//!
//! ## Usage
//!
//! ```rust,ignore
//! let (actor, inner) = cart_actor::new();
//! tokio::spawn(actor.run(store.clone()));
//!
//! let carts = CartClient::new(inner);
//! let cart = carts.open(CartCreate::default()).await?;
//! carts.add_to_cart(&cart, item).await?;
//! ```

pub mod actions;
pub mod entity;
pub mod error;

pub use actions::*;
pub use error::*;

use crate::framework::{ResourceActor, ResourceClient};
use crate::model::Cart;

/// Creates a new Cart actor and its client.
pub fn new() -> (ResourceActor<Cart>, ResourceClient<Cart>) {
    ResourceActor::new(32)
}
