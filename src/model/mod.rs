//! Pure data structures; [`Cart`] and [`Order`] implement the
//! [`ActorEntity`](crate::framework::ActorEntity) trait.

pub mod cart;
pub mod menu;
pub mod order;
pub mod profile;

pub use cart::*;
pub use menu::*;
pub use order::*;
pub use profile::*;
