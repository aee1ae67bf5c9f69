//! System-wide aggregation for the admin dashboard.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::dataset::{DataSource, Dataset};
use crate::model::{Role, ShipmentStatus, TransactionStatus, TransactionType};

const TOP_VENDORS: usize = 5;

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct StockAlert {
    pub part_id: i64,
    pub name: String,
    pub quantity: i64,
    pub reorder_point: i64,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct VendorScore {
    pub vendor_id: i64,
    pub name: String,
    pub rating: f64,
    pub fulfillment_rate: f64,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct AdminSummary {
    pub part_count: usize,
    pub inventory_units: i64,
    pub transaction_count: usize,
    pub transactions_by_status: BTreeMap<TransactionStatus, usize>,
    pub transactions_by_type: BTreeMap<TransactionType, usize>,
    pub transactions_by_role: BTreeMap<Role, usize>,
    pub units_supplied: i64,
    pub units_demanded: i64,
    pub pending_approvals: usize,
    pub low_stock: Vec<StockAlert>,
    pub shipments_by_status: BTreeMap<ShipmentStatus, usize>,
    pub vendor_count: usize,
    pub top_vendors: Vec<VendorScore>,
    pub source: DataSource,
}

pub fn admin_summary(data: &Dataset) -> AdminSummary {
    let mut transactions_by_status = BTreeMap::new();
    let mut transactions_by_type = BTreeMap::new();
    let mut transactions_by_role = BTreeMap::new();
    // Totals saturate rather than wrap on extreme quantities.
    let mut units_supplied: i64 = 0;
    let mut units_demanded: i64 = 0;

    for tx in &data.transactions {
        *transactions_by_status.entry(tx.status).or_insert(0) += 1;
        *transactions_by_type.entry(tx.tx_type).or_insert(0) += 1;
        *transactions_by_role.entry(tx.role).or_insert(0) += 1;
        match tx.tx_type {
            TransactionType::Supply => units_supplied = units_supplied.saturating_add(tx.quantity),
            TransactionType::Demand => units_demanded = units_demanded.saturating_add(tx.quantity),
        }
    }

    let mut shipments_by_status = BTreeMap::new();
    for shipment in &data.shipments {
        *shipments_by_status.entry(shipment.status).or_insert(0) += 1;
    }

    let low_stock = data
        .parts
        .iter()
        .filter(|p| p.is_low_stock())
        .map(|p| StockAlert {
            part_id: p.id,
            name: p.name.clone(),
            quantity: p.quantity,
            reorder_point: p.reorder_point,
        })
        .collect();

    let mut top_vendors: Vec<VendorScore> = data
        .vendors
        .iter()
        .map(|v| VendorScore {
            vendor_id: v.id,
            name: v.name.clone(),
            rating: v.rating,
            fulfillment_rate: v.fulfillment_rate,
        })
        .collect();
    top_vendors.sort_by(|a, b| {
        b.rating
            .total_cmp(&a.rating)
            .then(b.fulfillment_rate.total_cmp(&a.fulfillment_rate))
    });
    top_vendors.truncate(TOP_VENDORS);

    AdminSummary {
        part_count: data.parts.len(),
        inventory_units: data.parts.iter().fold(0i64, |acc, p| acc.saturating_add(p.quantity)),
        transaction_count: data.transactions.len(),
        pending_approvals: transactions_by_status
            .get(&TransactionStatus::Pending)
            .copied()
            .unwrap_or(0),
        transactions_by_status,
        transactions_by_type,
        transactions_by_role,
        units_supplied,
        units_demanded,
        low_stock,
        shipments_by_status,
        vendor_count: data.vendors.len(),
        top_vendors,
        source: data.source,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::demo;

    #[test]
    fn test_counts_add_up() {
        let data = demo::dataset();
        let summary = admin_summary(&data);

        let by_status: usize = summary.transactions_by_status.values().sum();
        let by_type: usize = summary.transactions_by_type.values().sum();
        assert_eq!(by_status, data.transactions.len());
        assert_eq!(by_type, data.transactions.len());
        assert_eq!(summary.pending_approvals, 3);
        assert_eq!(summary.units_supplied, 700);
    }

    #[test]
    fn test_top_vendors_sorted_and_capped() {
        let summary = admin_summary(&demo::dataset());

        assert_eq!(summary.top_vendors.len(), TOP_VENDORS);
        assert_eq!(summary.top_vendors[0].name, "Summit Assembly");
        assert!(summary
            .top_vendors
            .windows(2)
            .all(|w| w[0].rating >= w[1].rating));
    }

    #[test]
    fn test_summary_serializes_enum_keys() {
        let summary = admin_summary(&demo::dataset());
        let json = serde_json::to_value(&summary).unwrap();
        assert_eq!(json["transactions_by_status"]["pending"], 3);
        assert_eq!(json["source"], "demo");
    }

    #[test]
    fn test_totals_saturate_on_extreme_quantities() {
        let mut data = demo::dataset();
        let demand = data
            .transactions
            .iter()
            .find(|t| t.tx_type == TransactionType::Demand)
            .cloned()
            .unwrap();
        for id in [-900, -901] {
            let mut tx = demand.clone();
            tx.id = id;
            tx.quantity = i64::MAX;
            data.transactions.push(tx);
        }
        data.parts[0].quantity = i64::MAX;

        let summary = admin_summary(&data);
        assert_eq!(summary.units_demanded, i64::MAX);
        assert_eq!(summary.inventory_units, i64::MAX);
        assert_eq!(summary.units_supplied, 700);
    }
}
