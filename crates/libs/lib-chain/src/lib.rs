//! # Chain Library
//!
//! Thin client for the external order contract: a JSON-RPC transport seam,
//! the ABI subset the contract exposes, the order client with its explicit
//! live/demo/fallback modes, and the wallet client.

pub mod abi;
pub mod demo;
pub mod error;
pub mod mock;
pub mod orders;
pub mod rpc;
pub mod types;
pub mod wallet;

// Re-export commonly used types from root for convenience
pub use error::ChainError;
pub use orders::ChainOrderClient;
pub use rpc::{HttpTransport, RpcTransport};
pub use types::{ChainOrder, CountRead, Entity, EntityRead, OrderRead, OrderReceipt, OrdersRead, RegisteredRead, Source};
pub use wallet::{ProviderInfo, WalletClient, WalletInfo, WalletState};
