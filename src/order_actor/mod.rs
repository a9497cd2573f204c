//! # Order Actor
//!
//! Local board of the orders returned by the backend. Each tracked [`Order`] is keyed by
//! its backend id; the actor's context is the [`StatusPolicy`](crate::status::StatusPolicy)
//! used to project display status.
//!
//! - [`entity`] - [`ActorEntity`](crate::framework::ActorEntity) implementation for [`Order`]
//! - [`actions`] - [`OrderAction`]
//! - [`error`] - [`OrderError`]

pub mod actions;
pub mod entity;
pub mod error;

pub use actions::*;
pub use error::*;

use crate::framework::{ResourceActor, ResourceClient};
use crate::model::Order;

/// Creates a new Order actor and its client.
pub fn new() -> (ResourceActor<Order>, ResourceClient<Order>) {
    ResourceActor::new(32)
}
