//! # Data Transfer Objects (DTOs)
//!
//! Structures exchanged with API clients that are not entity records.
//! Entity create/update payloads live next to the entities in
//! [`crate::model::store::models`].

pub mod auth;
pub mod chain;
pub mod inventory;

pub use auth::*;
pub use chain::*;
pub use inventory::*;
