//! Request bodies for the order, entity and wallet endpoints.

use serde::{Deserialize, Serialize};

use crate::model::Role;

/// `POST /api/orders`
///
/// When `transaction_id` is set, the resulting order id and hash are written
/// back onto that transaction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateOrderRequest {
    pub seller: String,
    pub part_name: String,
    pub quantity: u64,
    #[serde(default)]
    pub transaction_id: Option<i64>,
}

/// `POST /api/entities/register`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisterEntityRequest {
    pub name: String,
    pub role: Role,
}

/// `POST /api/wallet/connect` and `POST /api/wallet/reconnect`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WalletConnectRequest {
    /// Preferred account when the provider exposes several.
    #[serde(default)]
    pub address: Option<String>,
}

/// `POST /api/wallet/sign`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SignMessageRequest {
    pub message: String,
}

/// `GET /api/orders/{order_id}?viewer=`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OrderQuery {
    pub viewer: Option<String>,
}
