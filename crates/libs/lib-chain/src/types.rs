//! Values returned by the chain clients.

use lib_core::model::{Role, ShipmentStatus};
use serde::{Deserialize, Serialize};

/// Where a result came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Source {
    /// Read from or written to the contract.
    Chain,
    /// Generated locally because the client runs in demo mode or the chain call failed.
    Simulated,
}

/// Order record as stored by the contract.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChainOrder {
    pub order_id: u64,
    pub buyer: String,
    pub seller: String,
    pub part_name: String,
    pub quantity: u64,
    /// Contract status code: 0 created, 1 approved, 2 completed.
    pub status: u8,
    /// Unix seconds.
    pub created_at: u64,
}

impl ChainOrder {
    pub fn shipment_status(&self) -> ShipmentStatus {
        ShipmentStatus::from_order_status(self.status)
    }

    pub fn involves(&self, address: &str) -> bool {
        self.buyer.eq_ignore_ascii_case(address) || self.seller.eq_ignore_ascii_case(address)
    }
}

/// Registered business entity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entity {
    pub address: String,
    pub name: String,
    pub role: Option<Role>,
    pub registered: bool,
}

/// Outcome of a write.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderReceipt {
    /// New order id for `createOrder`, the target id for approve/complete,
    /// `None` for entity registration or when the receipt never arrived.
    pub order_id: Option<u64>,
    pub tx_hash: String,
    pub etherscan_url: String,
    pub source: Source,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderRead {
    pub order: ChainOrder,
    pub source: Source,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrdersRead {
    pub orders: Vec<ChainOrder>,
    pub source: Source,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CountRead {
    pub count: u64,
    pub source: Source,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntityRead {
    pub entity: Entity,
    pub source: Source,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegisteredRead {
    pub address: String,
    pub registered: bool,
    pub source: Source,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}
