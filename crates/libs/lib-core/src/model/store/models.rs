//! Entity records and their create/update payloads.
//!
//! `XForCreate` types double as request bodies. `XForUpdate` types only carry
//! the fields that should change; `None` leaves a column untouched.

use chrono::{DateTime, NaiveDate, Utc};
use lib_utils::validation::{
    validate_eth_address, validate_email, validate_not_empty, validate_positive, validate_stock_level,
};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::model::enums::{
    PartType, RelationshipType, Role, ShipmentStatus, TransactionStatus, TransactionType,
};

// region: --- User

/// User entity representing a complete user record from the database.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct User {
    pub id: i64,
    pub name: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    #[sqlx(try_from = "String")]
    pub role: Role,
    pub is_admin: bool,
    pub is_active: bool,
    pub wallet_address: Option<String>,
    pub wallet_connected_at: Option<DateTime<Utc>>,
    pub last_login: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Data structure for creating a new user.
///
/// Password should be hashed before creating.
#[derive(Debug, Clone)]
pub struct UserForCreate {
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub role: Role,
    pub is_admin: bool,
}

impl UserForCreate {
    pub fn new(name: String, email: String, password_hash: String, role: Role) -> Self {
        Self {
            name,
            email,
            password_hash,
            is_admin: role == Role::Admin,
            role,
        }
    }

    pub fn admin(mut self, is_admin: bool) -> Self {
        self.is_admin = is_admin;
        self
    }
}

/// Data structure for updating an existing user.
#[derive(Debug, Clone, Default)]
pub struct UserForUpdate {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password_hash: Option<String>,
    pub role: Option<Role>,
    pub is_admin: Option<bool>,
    pub is_active: Option<bool>,
    pub wallet_address: Option<String>,
}

impl UserForUpdate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn name(mut self, name: String) -> Self {
        self.name = Some(name);
        self
    }

    pub fn email(mut self, email: String) -> Self {
        self.email = Some(email);
        self
    }

    pub fn password_hash(mut self, password_hash: String) -> Self {
        self.password_hash = Some(password_hash);
        self
    }

    pub fn role(mut self, role: Role) -> Self {
        self.role = Some(role);
        self
    }

    pub fn is_admin(mut self, is_admin: bool) -> Self {
        self.is_admin = Some(is_admin);
        self
    }

    pub fn is_active(mut self, is_active: bool) -> Self {
        self.is_active = Some(is_active);
        self
    }

    pub fn wallet_address(mut self, wallet_address: String) -> Self {
        self.wallet_address = Some(wallet_address);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.email.is_none()
            && self.password_hash.is_none()
            && self.role.is_none()
            && self.is_admin.is_none()
            && self.is_active.is_none()
            && self.wallet_address.is_none()
    }
}

// endregion: --- User

// region: --- Part

/// Inventory line. `user_id == None` marks a system-wide part.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize, PartialEq)]
pub struct Part {
    pub id: i64,
    pub user_id: Option<i64>,
    pub name: String,
    pub quantity: i64,
    pub reorder_point: i64,
    pub max_stock: i64,
    #[sqlx(try_from = "String")]
    pub part_type: PartType,
    pub source: Option<String>,
    pub lead_time_days: Option<i64>,
    pub backorders: Option<i64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Part {
    pub fn is_low_stock(&self) -> bool {
        self.quantity <= self.reorder_point
    }

    /// Parts without a configured ceiling are never over-stocked.
    pub fn is_overstocked(&self) -> bool {
        self.max_stock > 0 && self.quantity > self.max_stock
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PartForCreate {
    pub name: String,
    #[serde(default)]
    pub quantity: i64,
    #[serde(default)]
    pub reorder_point: i64,
    #[serde(default)]
    pub max_stock: i64,
    #[serde(default = "default_part_type")]
    pub part_type: PartType,
    #[serde(default)]
    pub source: Option<String>,
    #[serde(default)]
    pub lead_time_days: Option<i64>,
    #[serde(default)]
    pub backorders: Option<i64>,
}

fn default_part_type() -> PartType {
    PartType::Raw
}

impl PartForCreate {
    pub fn new(name: impl Into<String>, quantity: i64) -> Self {
        Self {
            name: name.into(),
            quantity,
            reorder_point: 0,
            max_stock: 0,
            part_type: PartType::Raw,
            source: None,
            lead_time_days: None,
            backorders: None,
        }
    }

    pub fn validate(&self) -> Result<(), String> {
        validate_not_empty(&self.name, "Part name")?;
        validate_stock_level(self.quantity, "Quantity")?;
        validate_stock_level(self.reorder_point, "Reorder point")?;
        validate_stock_level(self.max_stock, "Max stock")
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PartForUpdate {
    pub name: Option<String>,
    pub quantity: Option<i64>,
    pub reorder_point: Option<i64>,
    pub max_stock: Option<i64>,
    pub part_type: Option<PartType>,
    pub source: Option<String>,
    pub lead_time_days: Option<i64>,
    pub backorders: Option<i64>,
}

impl PartForUpdate {
    pub fn validate(&self) -> Result<(), String> {
        if let Some(ref name) = self.name {
            validate_not_empty(name, "Part name")?;
        }
        if let Some(quantity) = self.quantity {
            validate_stock_level(quantity, "Quantity")?;
        }
        if let Some(reorder_point) = self.reorder_point {
            validate_stock_level(reorder_point, "Reorder point")?;
        }
        if let Some(max_stock) = self.max_stock {
            validate_stock_level(max_stock, "Max stock")?;
        }
        Ok(())
    }
}

// endregion: --- Part

// region: --- Transaction

/// A supply or demand movement of a part between two parties.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize, PartialEq)]
pub struct Transaction {
    pub id: i64,
    pub user_id: Option<i64>,
    pub part_name: String,
    #[serde(rename = "type")]
    #[sqlx(try_from = "String")]
    pub tx_type: TransactionType,
    pub quantity: i64,
    pub date: NaiveDate,
    #[serde(rename = "from")]
    pub from_party: String,
    #[serde(rename = "to")]
    pub to_party: String,
    #[sqlx(try_from = "String")]
    pub role: Role,
    #[sqlx(try_from = "String")]
    pub status: TransactionStatus,
    pub from_wallet: Option<String>,
    pub to_wallet: Option<String>,
    pub invoice_number: String,
    pub blockchain_order_id: Option<String>,
    pub blockchain_tx_hash: Option<String>,
    pub approved_by: Option<String>,
    pub approved_at: Option<DateTime<Utc>>,
    pub rejection_reason: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TransactionForCreate {
    pub part_name: String,
    #[serde(rename = "type")]
    pub tx_type: TransactionType,
    pub quantity: i64,
    #[serde(default)]
    pub date: Option<NaiveDate>,
    #[serde(rename = "from")]
    pub from_party: String,
    #[serde(rename = "to")]
    pub to_party: String,
    /// Defaults to the creating user's role.
    #[serde(default)]
    pub role: Option<Role>,
    #[serde(default)]
    pub from_wallet: Option<String>,
    #[serde(default)]
    pub to_wallet: Option<String>,
    /// Generated when absent.
    #[serde(default)]
    pub invoice_number: Option<String>,
    #[serde(default)]
    pub blockchain_order_id: Option<String>,
    #[serde(default)]
    pub blockchain_tx_hash: Option<String>,
}

impl TransactionForCreate {
    pub fn validate(&self) -> Result<(), String> {
        validate_not_empty(&self.part_name, "Part name")?;
        validate_positive(self.quantity, "Quantity")?;
        validate_not_empty(&self.from_party, "From")?;
        validate_not_empty(&self.to_party, "To")?;
        for wallet in [&self.from_wallet, &self.to_wallet].into_iter().flatten() {
            validate_eth_address(wallet)?;
        }
        Ok(())
    }
}

/// Editable transaction fields. Status changes go through the approval flow.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TransactionForUpdate {
    pub part_name: Option<String>,
    pub quantity: Option<i64>,
    pub date: Option<NaiveDate>,
    #[serde(rename = "from")]
    pub from_party: Option<String>,
    #[serde(rename = "to")]
    pub to_party: Option<String>,
    pub from_wallet: Option<String>,
    pub to_wallet: Option<String>,
    pub invoice_number: Option<String>,
    pub blockchain_order_id: Option<String>,
    pub blockchain_tx_hash: Option<String>,
}

impl TransactionForUpdate {
    pub fn validate(&self) -> Result<(), String> {
        if let Some(quantity) = self.quantity {
            validate_positive(quantity, "Quantity")?;
        }
        for wallet in [&self.from_wallet, &self.to_wallet].into_iter().flatten() {
            validate_eth_address(wallet)?;
        }
        Ok(())
    }
}

// endregion: --- Transaction

// region: --- Shipment

/// One entry in a shipment's status history.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ShipmentEvent {
    pub status: ShipmentStatus,
    pub note: Option<String>,
    pub at: DateTime<Utc>,
}

#[derive(Debug, Clone, FromRow, Serialize, Deserialize, PartialEq)]
pub struct Shipment {
    pub id: i64,
    pub user_id: Option<i64>,
    pub transaction_id: Option<i64>,
    pub part_name: String,
    pub quantity: i64,
    #[serde(rename = "from")]
    pub from_party: String,
    #[serde(rename = "to")]
    pub to_party: String,
    #[sqlx(try_from = "String")]
    pub status: ShipmentStatus,
    #[sqlx(json)]
    pub history: Vec<ShipmentEvent>,
    pub blockchain_order_id: Option<String>,
    pub blockchain_tx_hash: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ShipmentForCreate {
    #[serde(default)]
    pub transaction_id: Option<i64>,
    pub part_name: String,
    pub quantity: i64,
    #[serde(rename = "from")]
    pub from_party: String,
    #[serde(rename = "to")]
    pub to_party: String,
    #[serde(default)]
    pub status: Option<ShipmentStatus>,
    #[serde(default)]
    pub blockchain_order_id: Option<String>,
    #[serde(default)]
    pub blockchain_tx_hash: Option<String>,
}

impl ShipmentForCreate {
    pub fn validate(&self) -> Result<(), String> {
        validate_not_empty(&self.part_name, "Part name")?;
        validate_positive(self.quantity, "Quantity")?;
        validate_not_empty(&self.from_party, "From")?;
        validate_not_empty(&self.to_party, "To")?;
        Ok(())
    }
}

/// Editable shipment fields. Status changes go through the status endpoint.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ShipmentForUpdate {
    pub transaction_id: Option<i64>,
    pub part_name: Option<String>,
    pub quantity: Option<i64>,
    #[serde(rename = "from")]
    pub from_party: Option<String>,
    #[serde(rename = "to")]
    pub to_party: Option<String>,
    pub blockchain_order_id: Option<String>,
    pub blockchain_tx_hash: Option<String>,
}

// endregion: --- Shipment

// region: --- Vendor

/// Counterparty business record, shared across all users.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize, PartialEq)]
pub struct Vendor {
    pub id: i64,
    pub name: String,
    pub category: String,
    #[sqlx(try_from = "String")]
    pub relationship_type: RelationshipType,
    #[sqlx(json)]
    pub roles: Vec<Role>,
    pub wallet_address: Option<String>,
    pub rating: f64,
    pub fulfillment_rate: f64,
    #[sqlx(json)]
    pub supplied_parts: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Vendor {
    pub fn serves(&self, role: Role) -> bool {
        self.roles.contains(&role)
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct VendorForCreate {
    pub name: String,
    pub category: String,
    pub relationship_type: RelationshipType,
    #[serde(default)]
    pub roles: Vec<Role>,
    #[serde(default)]
    pub wallet_address: Option<String>,
    #[serde(default)]
    pub rating: f64,
    #[serde(default)]
    pub fulfillment_rate: f64,
    #[serde(default)]
    pub supplied_parts: Vec<String>,
}

impl VendorForCreate {
    pub fn validate(&self) -> Result<(), String> {
        validate_not_empty(&self.name, "Vendor name")?;
        validate_not_empty(&self.category, "Category")?;
        validate_scores(Some(self.rating), Some(self.fulfillment_rate))?;
        if let Some(ref wallet) = self.wallet_address {
            validate_eth_address(wallet)?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct VendorForUpdate {
    pub name: Option<String>,
    pub category: Option<String>,
    pub relationship_type: Option<RelationshipType>,
    pub roles: Option<Vec<Role>>,
    pub wallet_address: Option<String>,
    pub rating: Option<f64>,
    pub fulfillment_rate: Option<f64>,
    pub supplied_parts: Option<Vec<String>>,
}

impl VendorForUpdate {
    pub fn validate(&self) -> Result<(), String> {
        validate_scores(self.rating, self.fulfillment_rate)?;
        if let Some(ref wallet) = self.wallet_address {
            validate_eth_address(wallet)?;
        }
        Ok(())
    }
}

fn validate_scores(rating: Option<f64>, fulfillment_rate: Option<f64>) -> Result<(), String> {
    if let Some(rating) = rating {
        if !(0.0..=5.0).contains(&rating) {
            return Err("Rating must be between 0 and 5".to_string());
        }
    }
    if let Some(rate) = fulfillment_rate {
        if !(0.0..=100.0).contains(&rate) {
            return Err("Fulfillment rate must be between 0 and 100".to_string());
        }
    }
    Ok(())
}

// endregion: --- Vendor

/// Validate the fields a signup or admin create request carries.
pub fn validate_new_user(name: &str, email: &str) -> Result<(), String> {
    validate_not_empty(name, "Name")?;
    validate_email(email)
}
