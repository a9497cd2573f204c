//! # qr-order
//!
//! Client-side core of a QR-menu restaurant ordering system. Customers reach a
//! restaurant's menu by scanning the QR code on their table, fill a cart and check out;
//! the kitchen watches incoming orders and marks them served. Orders, menus and
//! feedback live in a REST content backend; this crate owns the state that lives on the
//! device and the rules around it.
//!
//! ## 🚀 Core Components
//!
//! - **[framework]**: generic [`ResourceActor`](framework::ResourceActor) and the
//!   [`ActorEntity`](framework::ActorEntity) trait. Every stateful component is a single
//!   actor task, so mutations are serialized without locks.
//! - **[model]**: pure data ([`Cart`](model::Cart), [`Order`](model::Order),
//!   [`MenuItem`](model::MenuItem), ...).
//! - **[status]**: the order status reducer (processing → preparing → prepared).
//! - **[cart_actor]** / **[order_actor]**: entity implementations, actions and errors.
//! - **[clients]**: typed wrappers such as [`CartClient`](clients::CartClient).
//! - **[backend]**: the [`Backend`](backend::Backend) trait with HTTP and in-memory
//!   implementations.
//! - **[storage]**: device-local key-value persistence and the typed session on top.
//! - **[lifecycle]**: actor orchestration, the order poller and tracing setup.
//!
//! Flows built on those: [`auth`], [`qr`], [`checkout`], [`feedback`], [`admin`].
//!
//! ## Status Rules
//!
//! An order's displayed status is the later of what the backend reports and what the
//! elapsed time projects, so it never moves backwards between polls. `served` only
//! ever comes from the backend and takes the order off the board.
//!
//! ## 🧪 Testing
//!
//! See [`framework::mock`] for testing clients without spawning actors, and
//! [`backend::MemoryBackend`] for driving flows without a server.

pub mod admin;
pub mod auth;
pub mod backend;
pub mod cart_actor;
pub mod checkout;
pub mod clients;
pub mod config;
pub mod feedback;
pub mod framework;
pub mod lifecycle;
pub mod model;
pub mod order_actor;
pub mod qr;
pub mod status;
pub mod storage;
