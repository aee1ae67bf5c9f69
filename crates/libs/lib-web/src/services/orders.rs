//! # Order Service
//!
//! Glue between the chain-order client, the caller's wallet and the local
//! transaction records.

use std::sync::Arc;

use lib_chain::demo::ZERO_ADDRESS;
use lib_chain::{abi, ChainOrder, ChainOrderClient, OrderReceipt, Source};
use lib_core::config::ChainMode;
use lib_core::dto::{CreateOrderRequest, RegisterEntityRequest};
use lib_core::model::store::{TransactionRepository, UserRepository};
use lib_core::model::ShipmentStatus;
use lib_core::{AppError, DbPool};
use serde::Serialize;
use tracing::{info, instrument};

use crate::ctx::Ctx;
use crate::services::data::DataService;
use crate::services::session::SessionStore;

/// A shipment as reconstructed from an on-chain order.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ChainShipment {
    pub order_id: u64,
    pub part_name: String,
    pub quantity: u64,
    pub from: String,
    pub to: String,
    pub status: ShipmentStatus,
    pub created_at: u64,
}

impl From<&ChainOrder> for ChainShipment {
    fn from(order: &ChainOrder) -> Self {
        Self {
            order_id: order.order_id,
            part_name: order.part_name.clone(),
            quantity: order.quantity,
            from: order.seller.clone(),
            to: order.buyer.clone(),
            status: order.shipment_status(),
            created_at: order.created_at,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ChainShipments {
    pub viewer: Option<String>,
    pub shipments: Vec<ChainShipment>,
    pub source: Source,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

pub struct OrderService {
    db: DbPool,
    chain: Arc<ChainOrderClient>,
    sessions: Arc<SessionStore>,
    data: Arc<DataService>,
}

impl OrderService {
    pub fn new(
        db: DbPool,
        chain: Arc<ChainOrderClient>,
        sessions: Arc<SessionStore>,
        data: Arc<DataService>,
    ) -> Self {
        Self { db, chain, sessions, data }
    }

    pub fn chain(&self) -> &ChainOrderClient {
        &self.chain
    }

    /// The account writes are sent from: the session wallet, else the wallet
    /// stored on the user. Demo mode signs as the zero address.
    pub async fn sender(&self, ctx: &Ctx) -> Result<String, AppError> {
        if let Some(address) = self.sessions.wallet(ctx.user_id).await.and_then(|w| w.address) {
            return Ok(address);
        }

        if let Some(address) = UserRepository::find_by_id(&self.db, ctx.user_id)
            .await?
            .and_then(|user| user.wallet_address)
        {
            return Ok(address);
        }

        if self.chain.mode() == ChainMode::Demo {
            return Ok(ZERO_ADDRESS.to_string());
        }

        Err(AppError::InvalidInput(
            "Connect a wallet before sending chain transactions".to_string(),
        ))
    }

    /// The address reads are filtered by when the caller gives none.
    pub async fn viewer(&self, ctx: &Ctx, requested: Option<String>) -> Option<String> {
        if let Some(viewer) = requested.filter(|v| !v.trim().is_empty()) {
            return Some(viewer.to_lowercase());
        }
        self.sessions.wallet(ctx.user_id).await.and_then(|w| w.address)
    }

    #[instrument(skip(self, ctx, req), fields(user_id = ctx.user_id, part = %req.part_name))]
    pub async fn create_order(
        &self,
        ctx: &Ctx,
        req: CreateOrderRequest,
    ) -> Result<OrderReceipt, AppError> {
        if req.quantity == 0 {
            return Err(AppError::InvalidInput("quantity must be greater than zero".to_string()));
        }
        if req.part_name.trim().is_empty() {
            return Err(AppError::InvalidInput("part_name cannot be empty".to_string()));
        }
        abi::parse_address(&req.seller).map_err(|e| AppError::InvalidInput(e.to_string()))?;

        if let Some(transaction_id) = req.transaction_id {
            let transaction = TransactionRepository::get(&self.db, transaction_id)
                .await?
                .ok_or_else(|| AppError::NotFound(format!("Transaction {} not found", transaction_id)))?;
            ctx.ensure_write(transaction.user_id)?;
        }

        let from = self.sender(ctx).await?;
        let receipt = self
            .chain
            .create_order(&from, &req.seller, &req.part_name, req.quantity)
            .await?;

        if let (Some(transaction_id), Some(order_id)) = (req.transaction_id, receipt.order_id) {
            TransactionRepository::set_chain_refs(
                &self.db,
                transaction_id,
                &order_id.to_string(),
                &receipt.tx_hash,
            )
            .await?;
            self.data.invalidate_all().await;
            info!("[ORDERS] transaction {} linked to order {}", transaction_id, order_id);
        }

        Ok(receipt)
    }

    pub async fn approve_order(&self, ctx: &Ctx, order_id: u64) -> Result<OrderReceipt, AppError> {
        let from = self.sender(ctx).await?;
        Ok(self.chain.approve_order(&from, order_id).await?)
    }

    pub async fn complete_order(&self, ctx: &Ctx, order_id: u64) -> Result<OrderReceipt, AppError> {
        let from = self.sender(ctx).await?;
        Ok(self.chain.complete_order(&from, order_id).await?)
    }

    pub async fn register_entity(
        &self,
        ctx: &Ctx,
        req: RegisterEntityRequest,
    ) -> Result<OrderReceipt, AppError> {
        if req.name.trim().is_empty() {
            return Err(AppError::InvalidInput("name cannot be empty".to_string()));
        }
        let from = self.sender(ctx).await?;

        let registered = self.chain.is_entity_registered(&from).await?;
        if registered.source == Source::Chain && registered.registered {
            return Err(AppError::Conflict(format!("{} is already registered", from)));
        }

        Ok(self.chain.register_wallet(&from, req.name.trim(), req.role).await?)
    }

    /// Shipments derived from the recent orders that involve `viewer`.
    pub async fn chain_shipments(&self, viewer: Option<String>) -> Result<ChainShipments, AppError> {
        let read = self.chain.list_orders(viewer.as_deref()).await?;
        Ok(ChainShipments {
            shipments: read.orders.iter().map(ChainShipment::from).collect(),
            viewer,
            source: read.source,
            note: read.note,
        })
    }
}
