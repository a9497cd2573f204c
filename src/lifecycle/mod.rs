//! # System Lifecycle & Orchestration
//!
//! - [`OrderSystem`] - creates the actors, injects their context, shuts them down
//! - [`OrderPoller`] - background task keeping the order board in sync with the backend
//! - [`setup_tracing`] - structured logging for the whole process
//!
//! ## Dependency Injection via Context
//!
//! Actors are created without dependencies and receive them in `run(context)`:
//!
//! ```rust,ignore
//! impl ActorEntity for Cart {
//!     type Context = Arc<dyn LocalStore>;
//! }
//!
//! impl ActorEntity for Order {
//!     type Context = StatusPolicy;
//! }
//! ```
//!
//! ## Graceful Shutdown
//!
//! 1. Stop pollers, which hold clones of the order client
//! 2. Drop all clients; each actor's `recv()` returns `None`
//! 3. Actors log their final size and exit
//! 4. Await the actor tasks

pub mod order_system;
pub mod poller;
pub mod tracing;

pub use order_system::*;
pub use poller::*;
pub use self::tracing::setup_tracing;
