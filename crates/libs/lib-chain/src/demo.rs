//! Simulated chain data. Everything produced here is labelled
//! [`Source::Simulated`](crate::types::Source::Simulated) by the callers.

use chrono::Utc;
use lib_core::model::Role;
use rand::Rng;

use crate::types::{ChainOrder, Entity};

pub const ZERO_ADDRESS: &str = "0x0000000000000000000000000000000000000000";

const DEMO_SELLER: &str = "0x5e11e700000000000000000000000000000000d0";
const DEMO_PARTS: [&str; 5] = ["Brake Pad", "Engine Block", "Wiring Harness", "Front Axle", "Steel Sheet"];

pub fn random_order_id() -> u64 {
    rand::thread_rng().gen_range(1_000..=999_999)
}

/// 32 random bytes as a `0x`-prefixed hash.
pub fn random_tx_hash() -> String {
    let bytes: [u8; 32] = rand::thread_rng().gen();
    format!("0x{}", hex::encode(bytes))
}

/// Deterministic sample order owned by `viewer`.
pub fn demo_order(order_id: u64, viewer: Option<&str>) -> ChainOrder {
    ChainOrder {
        order_id,
        buyer: viewer.unwrap_or(ZERO_ADDRESS).to_lowercase(),
        seller: DEMO_SELLER.to_string(),
        part_name: DEMO_PARTS[(order_id % DEMO_PARTS.len() as u64) as usize].to_string(),
        quantity: order_id % 50 + 1,
        status: (order_id % 3) as u8,
        created_at: Utc::now().timestamp().max(0) as u64 - order_id % 86_400,
    }
}

/// A handful of sample orders for `viewer`, newest first.
pub fn demo_orders(viewer: Option<&str>) -> Vec<ChainOrder> {
    (1..=5).rev().map(|id| demo_order(id, viewer)).collect()
}

pub fn demo_entity(address: &str) -> Entity {
    Entity {
        address: address.to_lowercase(),
        name: "Demo Manufacturer".to_string(),
        role: Some(Role::Manufacturer),
        registered: true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_random_hash_shape() {
        let hash = random_tx_hash();
        assert_eq!(hash.len(), 66);
        assert!(hash.starts_with("0x"));
        assert_ne!(hash, random_tx_hash());
    }

    #[test]
    fn test_demo_order_keyed_to_viewer() {
        let viewer = "0xABCDEFabcdefABCDEFabcdefABCDEFabcdefABCD";
        let order = demo_order(7, Some(viewer));
        assert!(order.involves(viewer));
        assert_eq!(order.order_id, 7);
        assert_eq!(demo_order(7, None).buyer, ZERO_ADDRESS);
    }

    #[test]
    fn test_random_order_id_range() {
        for _ in 0..50 {
            let id = random_order_id();
            assert!((1_000..=999_999).contains(&id));
        }
    }
}
