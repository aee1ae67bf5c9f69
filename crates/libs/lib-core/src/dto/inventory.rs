//! Request bodies and query strings for the inventory, transaction,
//! shipment and vendor endpoints that are not plain entity payloads.

use serde::{Deserialize, Serialize};

use crate::model::{RelationshipType, Role, ShipmentStatus};

/// `POST /api/admin/transactions/{id}/reject`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RejectRequest {
    #[serde(default)]
    pub reason: Option<String>,
}

/// `POST /api/shipments/{id}/status`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShipmentStatusRequest {
    pub status: ShipmentStatus,
    #[serde(default)]
    pub note: Option<String>,
}

/// `GET /api/vendors/for-role?role=&relationship=`
///
/// `role` defaults to the caller's role.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct VendorRoleQuery {
    pub role: Option<Role>,
    pub relationship: Option<RelationshipType>,
}

/// Body of a successful delete.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DeletedResponse {
    pub id: i64,
    pub deleted: bool,
}
