//! # Reporting
//!
//! Pure functions over in-memory collections: role dashboards, vendor
//! partitioning, CSV export, discrepancy detection and the admin summary.

pub mod csv;
pub mod dashboard;
pub mod discrepancy;
pub mod summary;
pub mod vendors;

pub use csv::{to_csv, CsvRecord};
pub use dashboard::{build_dashboard, Dashboard};
pub use discrepancy::{find_discrepancies, Discrepancy, DiscrepancyKind, DiscrepancyReport};
pub use summary::{admin_summary, AdminSummary};
pub use vendors::{filter_for_role, partition_for_role, VendorPartition};
