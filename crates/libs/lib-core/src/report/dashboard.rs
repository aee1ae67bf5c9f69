//! Per-role dashboard view.

use serde::Serialize;

use crate::dataset::{DataSource, Dataset};
use crate::model::{Part, Role, Shipment, Transaction, TransactionStatus};

use super::vendors::{partition_for_role, VendorPartition};

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Dashboard {
    pub role: Role,
    pub parts: Vec<Part>,
    pub transactions: Vec<Transaction>,
    pub shipments: Vec<Shipment>,
    pub vendors: VendorPartition,
    pub low_stock_count: usize,
    pub pending_count: usize,
    pub source: DataSource,
}

/// Build the dashboard for `role` from an already scoped dataset.
///
/// Admins see every vendor; other roles only the vendors that serve them.
pub fn build_dashboard(data: &Dataset, role: Role) -> Dashboard {
    let vendors = if role == Role::Admin {
        let (vendors, customers) = data
            .vendors
            .iter()
            .cloned()
            .partition(|v| v.relationship_type == crate::model::RelationshipType::Vendor);
        VendorPartition { role, vendors, customers }
    } else {
        partition_for_role(&data.vendors, role)
    };

    Dashboard {
        role,
        low_stock_count: data.parts.iter().filter(|p| p.is_low_stock()).count(),
        pending_count: data
            .transactions
            .iter()
            .filter(|t| t.status == TransactionStatus::Pending)
            .count(),
        parts: data.parts.clone(),
        transactions: data.transactions.clone(),
        shipments: data.shipments.clone(),
        vendors,
        source: data.source,
    }
}
