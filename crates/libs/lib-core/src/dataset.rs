//! The four entity collections a dashboard works from, tagged with where
//! they came from.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::model::{Part, Shipment, Transaction, Vendor};

/// Origin of a dataset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DataSource {
    /// Read from the store.
    Live,
    /// Bundled sample data, substituted because the store looked empty.
    Demo,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Dataset {
    pub parts: Vec<Part>,
    pub transactions: Vec<Transaction>,
    pub shipments: Vec<Shipment>,
    pub vendors: Vec<Vendor>,
    pub source: DataSource,
    pub fetched_at: DateTime<Utc>,
}

impl Dataset {
    pub fn live(
        parts: Vec<Part>,
        transactions: Vec<Transaction>,
        shipments: Vec<Shipment>,
        vendors: Vec<Vendor>,
    ) -> Self {
        Self {
            parts,
            transactions,
            shipments,
            vendors,
            source: DataSource::Live,
            fetched_at: Utc::now(),
        }
    }

    /// Whether the collections look unusable and should be replaced by demo data:
    /// no parts, no vendors, or no part with a configured `max_stock`.
    pub fn needs_demo_fallback(&self) -> bool {
        self.parts.is_empty()
            || self.vendors.is_empty()
            || self.parts.iter().all(|p| p.max_stock == 0)
    }
}
