//! Client-side domain models and the raw DTOs they are normalized from.
//!
//! The backend grew several historical payload spellings (snake_case
//! variants, nullable fields, renamed keys). Raw DTO types absorb those
//! with serde aliases; pure `normalize` functions map each DTO into one
//! canonical record. Nothing in this module holds state.

pub mod cart;
pub mod material;
pub mod order;
pub mod ticket;
pub mod user;

pub use cart::{Cart, CartLine};
pub use material::{Material, MaterialPage};
pub use order::{Order, OrderItem};
pub use ticket::{Ticket, TicketMessage};
pub use user::User;
