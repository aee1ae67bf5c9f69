//! Text-backed enums shared by the entities.
//!
//! Every enum serializes in `snake_case`, is stored as the same text in
//! SQLite and parses case-insensitively.

use serde::{Deserialize, Serialize};

macro_rules! text_enum {
    ($name:ident, $label:literal { $($variant:ident => $text:literal),+ $(,)? }) => {
        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            pub fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $text),+
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.pad(self.as_str())
            }
        }

        impl std::str::FromStr for $name {
            type Err = String;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let normalized = s.trim().to_lowercase().replace([' ', '-'], "_");
                match normalized.as_str() {
                    $($text => Ok($name::$variant),)+
                    _ => Err(format!("Invalid {}: {}", $label, s)),
                }
            }
        }

        impl TryFrom<String> for $name {
            type Error = String;

            fn try_from(s: String) -> Result<Self, Self::Error> {
                s.parse()
            }
        }
    };
}

/// Dashboard role of a user or a vendor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Manufacturer,
    Supplier,
    Distributor,
    Admin,
}

text_enum!(Role, "role" {
    Manufacturer => "manufacturer",
    Supplier => "supplier",
    Distributor => "distributor",
    Admin => "admin",
});

impl Role {
    /// Numeric id the order contract uses for entity roles.
    pub fn chain_code(&self) -> u8 {
        match self {
            Role::Manufacturer => 0,
            Role::Supplier => 1,
            Role::Distributor => 2,
            Role::Admin => 3,
        }
    }

    pub fn from_chain_code(code: u8) -> Option<Self> {
        match code {
            0 => Some(Role::Manufacturer),
            1 => Some(Role::Supplier),
            2 => Some(Role::Distributor),
            3 => Some(Role::Admin),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PartType {
    Raw,
    Wip,
    Finished,
}

text_enum!(PartType, "part type" {
    Raw => "raw",
    Wip => "wip",
    Finished => "finished",
});

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionType {
    /// Inbound stock, applied to inventory when recorded.
    Supply,
    /// Outbound request, waits for approval.
    Demand,
}

text_enum!(TransactionType, "transaction type" {
    Supply => "supply",
    Demand => "demand",
});

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionStatus {
    Pending,
    Approved,
    Rejected,
    Completed,
}

text_enum!(TransactionStatus, "transaction status" {
    Pending => "pending",
    Approved => "approved",
    Rejected => "rejected",
    Completed => "completed",
});

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShipmentStatus {
    Pending,
    InTransit,
    Delivered,
    Delayed,
}

text_enum!(ShipmentStatus, "shipment status" {
    Pending => "pending",
    InTransit => "in_transit",
    Delivered => "delivered",
    Delayed => "delayed",
});

impl ShipmentStatus {
    /// Map the contract's order status code onto a shipment status.
    pub fn from_order_status(code: u8) -> Self {
        match code {
            0 => ShipmentStatus::Pending,
            1 => ShipmentStatus::InTransit,
            2 => ShipmentStatus::Delivered,
            _ => ShipmentStatus::Delayed,
        }
    }
}

/// Which side of the business a vendor record sits on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RelationshipType {
    Vendor,
    Customer,
}

text_enum!(RelationshipType, "relationship type" {
    Vendor => "vendor",
    Customer => "customer",
});

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_is_lenient() {
        assert_eq!("In Transit".parse::<ShipmentStatus>().unwrap(), ShipmentStatus::InTransit);
        assert_eq!("in-transit".parse::<ShipmentStatus>().unwrap(), ShipmentStatus::InTransit);
        assert_eq!("SUPPLIER".parse::<Role>().unwrap(), Role::Supplier);
    }

    #[test]
    fn test_parse_rejects_unknown() {
        let err = "wholesaler".parse::<Role>().unwrap_err();
        assert_eq!(err, "Invalid role: wholesaler");
    }

    #[test]
    fn test_display_matches_serde() {
        for status in ShipmentStatus::ALL {
            let json = serde_json::to_string(status).unwrap();
            assert_eq!(json, format!("\"{}\"", status));
        }
    }

    #[test]
    fn test_role_chain_codes_roundtrip() {
        for role in Role::ALL {
            assert_eq!(Role::from_chain_code(role.chain_code()), Some(*role));
        }
        assert_eq!(Role::from_chain_code(9), None);
    }
}
