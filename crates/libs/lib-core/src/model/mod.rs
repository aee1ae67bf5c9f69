//! # Domain Model
//!
//! Entity enums plus the SQLite store and its repositories.

pub mod enums;
pub mod store;

pub use enums::{PartType, RelationshipType, Role, ShipmentStatus, TransactionStatus, TransactionType};
pub use store::models::{
    Part, PartForCreate, PartForUpdate, Shipment, ShipmentEvent, ShipmentForCreate,
    ShipmentForUpdate, Transaction, TransactionForCreate, TransactionForUpdate, User,
    UserForCreate, UserForUpdate, Vendor, VendorForCreate, VendorForUpdate,
};
pub use store::{DbPool, Scope};
