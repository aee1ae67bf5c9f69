//! # Services Layer
//!
//! Business logic between the HTTP handlers and the store / chain clients:
//!
//! ```text
//! Handlers (HTTP) → Services → Repositories / ChainOrderClient / WalletClient
//! ```
//!
//! - [`data`] - cached, scope-aware dataset loading with demo fallback
//! - [`inventory`] - transaction lifecycle and stock adjustments
//! - [`orders`] - chain orders tied to the caller's wallet and transactions
//! - [`session`] - per-user session contexts with debounced snapshot sync
//!
//! Services return `Result<T, AppError>`.

pub mod data;
pub mod inventory;
pub mod orders;
pub mod session;

pub use data::DataService;
pub use inventory::InventoryService;
pub use orders::{ChainShipment, ChainShipments, OrderService};
pub use session::{SessionContext, SessionStore};
