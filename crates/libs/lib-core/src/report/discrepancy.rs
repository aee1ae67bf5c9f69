//! Inventory and ledger consistency checks.
//!
//! Every check is a linear scan or a single grouping pass over the dataset.

use std::collections::{BTreeMap, HashMap, HashSet};

use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;

use crate::dataset::Dataset;
use crate::model::{TransactionStatus, TransactionType};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DiscrepancyKind {
    /// Quantity at or below the reorder point.
    LowStock,
    /// Quantity above a configured `max_stock`.
    Overstock,
    /// Pending demand for a part exceeds what is on hand.
    DemandExceedsStock,
    /// Two or more transactions with the same part, type, quantity, parties and date.
    DuplicateTransaction,
    /// Transaction for a part name that is not in inventory.
    UnknownPart,
    /// Shipment quantity differs from its linked transaction.
    ShipmentQuantityMismatch,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Discrepancy {
    pub kind: DiscrepancyKind,
    pub part_name: String,
    pub message: String,
    /// Ids of the records involved (parts, transactions or shipments depending on `kind`).
    pub record_ids: Vec<i64>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct DiscrepancyReport {
    pub generated_at: DateTime<Utc>,
    pub total: usize,
    pub counts: BTreeMap<DiscrepancyKind, usize>,
    pub items: Vec<Discrepancy>,
}

pub fn find_discrepancies(data: &Dataset) -> DiscrepancyReport {
    let mut items = Vec::new();

    stock_levels(data, &mut items);
    demand_vs_stock(data, &mut items);
    duplicate_transactions(data, &mut items);
    unknown_parts(data, &mut items);
    shipment_mismatches(data, &mut items);

    let mut counts = BTreeMap::new();
    for item in &items {
        *counts.entry(item.kind).or_insert(0) += 1;
    }

    DiscrepancyReport {
        generated_at: Utc::now(),
        total: items.len(),
        counts,
        items,
    }
}

fn stock_levels(data: &Dataset, out: &mut Vec<Discrepancy>) {
    for part in &data.parts {
        if part.is_low_stock() {
            out.push(Discrepancy {
                kind: DiscrepancyKind::LowStock,
                part_name: part.name.clone(),
                message: format!(
                    "{} on hand, reorder point {}",
                    part.quantity, part.reorder_point
                ),
                record_ids: vec![part.id],
            });
        }
        if part.is_overstocked() {
            out.push(Discrepancy {
                kind: DiscrepancyKind::Overstock,
                part_name: part.name.clone(),
                message: format!("{} on hand, max stock {}", part.quantity, part.max_stock),
                record_ids: vec![part.id],
            });
        }
    }
}

fn demand_vs_stock(data: &Dataset, out: &mut Vec<Discrepancy>) {
    let mut on_hand: HashMap<&str, i64> = HashMap::new();
    for part in &data.parts {
        let stock = on_hand.entry(part.name.as_str()).or_insert(0);
        *stock = stock.saturating_add(part.quantity);
    }

    let mut pending: BTreeMap<&str, (i64, Vec<i64>)> = BTreeMap::new();
    for tx in &data.transactions {
        if tx.tx_type == TransactionType::Demand && tx.status == TransactionStatus::Pending {
            let entry = pending.entry(tx.part_name.as_str()).or_default();
            entry.0 = entry.0.saturating_add(tx.quantity);
            entry.1.push(tx.id);
        }
    }

    for (part_name, (demand, ids)) in pending {
        // Unknown parts are reported separately.
        let Some(&stock) = on_hand.get(part_name) else {
            continue;
        };
        if demand > stock {
            out.push(Discrepancy {
                kind: DiscrepancyKind::DemandExceedsStock,
                part_name: part_name.to_string(),
                message: format!("{} units pending demand, {} on hand", demand, stock),
                record_ids: ids,
            });
        }
    }
}

fn duplicate_transactions(data: &Dataset, out: &mut Vec<Discrepancy>) {
    type Key<'a> = (&'a str, TransactionType, i64, &'a str, &'a str, NaiveDate);

    let mut groups: BTreeMap<Key<'_>, Vec<i64>> = BTreeMap::new();
    for tx in &data.transactions {
        let key = (
            tx.part_name.as_str(),
            tx.tx_type,
            tx.quantity,
            tx.from_party.as_str(),
            tx.to_party.as_str(),
            tx.date,
        );
        groups.entry(key).or_default().push(tx.id);
    }

    for ((part_name, tx_type, quantity, from, to, date), ids) in groups {
        if ids.len() > 1 {
            out.push(Discrepancy {
                kind: DiscrepancyKind::DuplicateTransaction,
                part_name: part_name.to_string(),
                message: format!(
                    "{} identical {} transactions of {} from {} to {} on {}",
                    ids.len(),
                    tx_type,
                    quantity,
                    from,
                    to,
                    date
                ),
                record_ids: ids,
            });
        }
    }
}

fn unknown_parts(data: &Dataset, out: &mut Vec<Discrepancy>) {
    let known: HashSet<&str> = data.parts.iter().map(|p| p.name.as_str()).collect();

    for tx in &data.transactions {
        if !known.contains(tx.part_name.as_str()) {
            out.push(Discrepancy {
                kind: DiscrepancyKind::UnknownPart,
                part_name: tx.part_name.clone(),
                message: format!("Transaction {} references a part not in inventory", tx.invoice_number),
                record_ids: vec![tx.id],
            });
        }
    }
}

fn shipment_mismatches(data: &Dataset, out: &mut Vec<Discrepancy>) {
    let by_id: HashMap<i64, i64> = data.transactions.iter().map(|t| (t.id, t.quantity)).collect();

    for shipment in &data.shipments {
        let Some(tx_id) = shipment.transaction_id else {
            continue;
        };
        if let Some(&expected) = by_id.get(&tx_id) {
            if expected != shipment.quantity {
                out.push(Discrepancy {
                    kind: DiscrepancyKind::ShipmentQuantityMismatch,
                    part_name: shipment.part_name.clone(),
                    message: format!(
                        "Shipment carries {} units, transaction {} ordered {}",
                        shipment.quantity, tx_id, expected
                    ),
                    record_ids: vec![shipment.id, tx_id],
                });
            }
        }
    }
}
