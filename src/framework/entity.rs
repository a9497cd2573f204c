//! # ActorEntity Trait
//!
//! The contract every resource (a cart, a tracked order, ...) implements to be managed by
//! the generic [`ResourceActor`](crate::framework::ResourceActor). Associated types pin down
//! the identifier, the DTOs, the custom actions, the injected context and the error type,
//! so a cart action can never be sent to the order actor.
//!
//! # Provided Methods (Hooks)
//! - [`ActorEntity::assigned_id`]: lets an entity carry its identity in the create payload
//!   (backend ids, storage keys) instead of taking one from the actor's counter.
//! - [`ActorEntity::on_create`]
//! - [`ActorEntity::on_delete`]
//!
//! The default implementations do nothing.

use async_trait::async_trait;
use std::fmt::{Debug, Display};
use std::hash::Hash;

/// Trait that any resource entity must implement to be managed by ResourceActor.
///
/// # Async & Context
/// Hooks are `#[async_trait]` so they can await I/O (local storage, other actors).
/// The `Context` is handed to `run()` and injected into every hook, which keeps
/// dependencies out of the constructor.
#[async_trait]
pub trait ActorEntity: Clone + Send + Sync + 'static {
    /// The unique identifier for this entity.
    /// Must be convertible from u32 for automatic ID generation.
    type Id: Eq + Hash + Clone + Send + Sync + Display + Debug + From<u32>;

    /// The data required to create a new instance.
    type Create: Send + Sync + Debug;

    /// The data required to update an existing instance.
    type Update: Send + Sync + Debug;

    /// Resource-specific operations (e.g. `AddItem`, `Refresh`).
    type Action: Send + Sync + Debug;

    /// The result type returned by custom actions.
    type ActionResult: Send + Sync + Debug;

    /// The runtime context (dependencies) injected into the actor.
    /// Use `()` if no dependencies are needed.
    type Context: Send + Sync;

    /// One error enum per actor; every hook reports through it.
    type Error: std::error::Error + Send + Sync + 'static;

    /// Identity carried by the create payload itself.
    ///
    /// Returning `Some` makes the actor use that id instead of its counter. Creating an
    /// id that is already stored fails with
    /// [`FrameworkError::AlreadyExists`](crate::framework::FrameworkError::AlreadyExists).
    fn assigned_id(_params: &Self::Create) -> Option<Self::Id> {
        None
    }

    /// Construct the full Entity from the ID and Payload.
    /// This is called synchronously before `on_create`.
    fn from_create_params(id: Self::Id, params: Self::Create) -> Result<Self, Self::Error>;

    // --- Lifecycle Hooks (Async) ---

    /// Called after the entity is constructed and before it is stored.
    async fn on_create(&mut self, _ctx: &Self::Context) -> Result<(), Self::Error> {
        Ok(())
    }

    /// Called when an update request is received.
    async fn on_update(
        &mut self,
        update: Self::Update,
        _ctx: &Self::Context,
    ) -> Result<(), Self::Error>;

    /// Called immediately before the entity is removed from the store.
    async fn on_delete(&self, _ctx: &Self::Context) -> Result<(), Self::Error> {
        Ok(())
    }

    // --- Action Handler (Async) ---

    /// Handle a custom resource-specific action.
    async fn handle_action(
        &mut self,
        action: Self::Action,
        _ctx: &Self::Context,
    ) -> Result<Self::ActionResult, Self::Error>;
}
