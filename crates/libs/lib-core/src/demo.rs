//! Bundled sample data for empty installations and demo mode.
//!
//! Ids are negative so they can never collide with stored rows.

use chrono::{Duration, NaiveDate, Utc};

use crate::dataset::{DataSource, Dataset};
use crate::model::{
    Part, PartType, RelationshipType, Role, Shipment, ShipmentEvent, ShipmentStatus, Transaction,
    TransactionStatus, TransactionType, Vendor,
};

pub fn dataset() -> Dataset {
    Dataset {
        parts: parts(),
        transactions: transactions(),
        shipments: shipments(),
        vendors: vendors(),
        source: DataSource::Demo,
        fetched_at: Utc::now(),
    }
}

pub fn parts() -> Vec<Part> {
    let now = Utc::now();
    let rows: [(&str, i64, i64, i64, PartType, Option<&str>, Option<i64>); 8] = [
        ("Steel Sheet", 1200, 300, 2000, PartType::Raw, Some("Northline Metals"), Some(7)),
        ("Aluminum Ingot", 180, 200, 900, PartType::Raw, Some("Northline Metals"), Some(10)),
        ("Brake Pad", 640, 150, 800, PartType::Wip, Some("Apex Friction"), Some(5)),
        ("Brake Caliper", 95, 120, 500, PartType::Wip, Some("Apex Friction"), Some(12)),
        ("Wiring Harness", 410, 100, 350, PartType::Wip, Some("Voltline Electric"), Some(9)),
        ("Engine Block", 60, 40, 150, PartType::Finished, None, Some(21)),
        ("Transmission", 35, 30, 120, PartType::Finished, None, Some(28)),
        ("Front Axle", 22, 25, 100, PartType::Finished, None, Some(14)),
    ];

    rows.into_iter()
        .enumerate()
        .map(|(i, (name, quantity, reorder_point, max_stock, part_type, source, lead))| Part {
            id: -(i as i64 + 1),
            user_id: None,
            name: name.to_string(),
            quantity,
            reorder_point,
            max_stock,
            part_type,
            source: source.map(str::to_string),
            lead_time_days: lead,
            backorders: if quantity < reorder_point { Some(reorder_point - quantity) } else { None },
            created_at: now,
            updated_at: now,
        })
        .collect()
}

pub fn transactions() -> Vec<Transaction> {
    let now = Utc::now();
    let today = now.date_naive();
    let rows: [(&str, TransactionType, i64, i64, &str, &str, Role, TransactionStatus); 7] = [
        ("Steel Sheet", TransactionType::Supply, 500, 9, "Northline Metals", "Assembly Plant A", Role::Manufacturer, TransactionStatus::Completed),
        ("Brake Pad", TransactionType::Supply, 200, 7, "Apex Friction", "Assembly Plant A", Role::Manufacturer, TransactionStatus::Completed),
        ("Engine Block", TransactionType::Demand, 20, 5, "Assembly Plant A", "Metro Auto Dealers", Role::Manufacturer, TransactionStatus::Approved),
        ("Transmission", TransactionType::Demand, 45, 3, "Assembly Plant A", "Metro Auto Dealers", Role::Distributor, TransactionStatus::Pending),
        ("Front Axle", TransactionType::Demand, 10, 2, "Assembly Plant A", "Coastal Fleet Services", Role::Distributor, TransactionStatus::Pending),
        ("Front Axle", TransactionType::Demand, 10, 2, "Assembly Plant A", "Coastal Fleet Services", Role::Distributor, TransactionStatus::Pending),
        ("Wiring Harness", TransactionType::Demand, 60, 1, "Assembly Plant A", "Voltline Electric", Role::Supplier, TransactionStatus::Rejected),
    ];

    rows.into_iter()
        .enumerate()
        .map(|(i, (part, tx_type, quantity, days_ago, from, to, role, status))| {
            let date: NaiveDate = today - Duration::days(days_ago);
            let approved = matches!(status, TransactionStatus::Approved | TransactionStatus::Rejected);
            Transaction {
                id: -(i as i64 + 1),
                user_id: None,
                part_name: part.to_string(),
                tx_type,
                quantity,
                date,
                from_party: from.to_string(),
                to_party: to.to_string(),
                role,
                status,
                from_wallet: None,
                to_wallet: None,
                invoice_number: format!("INV-{}-{:06}", date.format("%Y%m%d"), 900_001 + i),
                blockchain_order_id: None,
                blockchain_tx_hash: None,
                approved_by: approved.then(|| "admin@autotrace.demo".to_string()),
                approved_at: approved.then_some(now),
                rejection_reason: (status == TransactionStatus::Rejected)
                    .then(|| "Supplier capacity exceeded".to_string()),
                created_at: now,
                updated_at: now,
            }
        })
        .collect()
}

pub fn shipments() -> Vec<Shipment> {
    let now = Utc::now();
    let rows: [(Option<i64>, &str, i64, &str, &str, ShipmentStatus); 4] = [
        (Some(-1), "Steel Sheet", 500, "Northline Metals", "Assembly Plant A", ShipmentStatus::Delivered),
        (Some(-2), "Brake Pad", 200, "Apex Friction", "Assembly Plant A", ShipmentStatus::InTransit),
        (Some(-3), "Engine Block", 18, "Assembly Plant A", "Metro Auto Dealers", ShipmentStatus::Delayed),
        (None, "Wiring Harness", 120, "Voltline Electric", "Assembly Plant A", ShipmentStatus::Pending),
    ];

    rows.into_iter()
        .enumerate()
        .map(|(i, (transaction_id, part, quantity, from, to, status))| Shipment {
            id: -(i as i64 + 1),
            user_id: None,
            transaction_id,
            part_name: part.to_string(),
            quantity,
            from_party: from.to_string(),
            to_party: to.to_string(),
            status,
            history: vec![
                ShipmentEvent {
                    status: ShipmentStatus::Pending,
                    note: Some("Shipment created".to_string()),
                    at: now - Duration::days(3),
                },
                ShipmentEvent { status, note: None, at: now },
            ],
            blockchain_order_id: None,
            blockchain_tx_hash: None,
            created_at: now,
            updated_at: now,
        })
        .collect()
}

pub fn vendors() -> Vec<Vendor> {
    let now = Utc::now();
    let rows: [(&str, &str, RelationshipType, Vec<Role>, f64, f64, Vec<&str>); 6] = [
        ("Northline Metals", "Raw Materials", RelationshipType::Vendor, vec![Role::Manufacturer, Role::Supplier], 4.6, 97.5, vec!["Steel Sheet", "Aluminum Ingot"]),
        ("Apex Friction", "Brake Systems", RelationshipType::Vendor, vec![Role::Manufacturer], 4.2, 93.0, vec!["Brake Pad", "Brake Caliper"]),
        ("Voltline Electric", "Electrical", RelationshipType::Vendor, vec![Role::Manufacturer, Role::Distributor], 3.8, 88.0, vec!["Wiring Harness"]),
        ("Metro Auto Dealers", "Retail", RelationshipType::Customer, vec![Role::Manufacturer, Role::Distributor], 4.4, 95.0, vec![]),
        ("Coastal Fleet Services", "Fleet", RelationshipType::Customer, vec![Role::Distributor], 4.0, 91.0, vec![]),
        ("Summit Assembly", "OEM", RelationshipType::Customer, vec![Role::Supplier], 4.8, 98.5, vec![]),
    ];

    rows.into_iter()
        .enumerate()
        .map(|(i, (name, category, relationship_type, roles, rating, fulfillment_rate, supplied))| Vendor {
            id: -(i as i64 + 1),
            name: name.to_string(),
            category: category.to_string(),
            relationship_type,
            roles,
            wallet_address: Some(format!("0x{:040x}", 0xa770_0000u64 + i as u64)),
            rating,
            fulfillment_rate,
            supplied_parts: supplied.into_iter().map(str::to_string).collect(),
            created_at: now,
            updated_at: now,
        })
        .collect()
}
