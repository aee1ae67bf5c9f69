//! # Inventory Service
//!
//! Transaction lifecycle and its effect on stock levels.
//!
//! - A **supply** transaction is recorded as `completed` and adds its quantity
//!   to the matching part right away.
//! - A **demand** transaction is recorded as `pending` and leaves stock alone
//!   until an admin approves it and it is completed.
//! - A shipment marked `delivered` adds its quantity to the owner's part.
//!
//! Recording a transaction and adjusting the part are two separate writes.

use std::sync::Arc;

use chrono::Utc;
use lib_core::model::store::transaction_repository::StatusStamp;
use lib_core::model::store::{PartRepository, ShipmentRepository, TransactionRepository};
use lib_core::model::{
    Part, Shipment, ShipmentStatus, Transaction, TransactionForCreate, TransactionForUpdate,
    TransactionStatus, TransactionType,
};
use lib_core::{AppError, DbPool};
use tracing::{info, instrument, warn};

use crate::ctx::Ctx;
use crate::services::data::DataService;

pub struct InventoryService {
    db: DbPool,
    data: Arc<DataService>,
}

impl InventoryService {
    pub fn new(db: DbPool, data: Arc<DataService>) -> Self {
        Self { db, data }
    }

    // region: --- Transactions

    #[instrument(skip(self, ctx, data), fields(user_id = ctx.user_id, part = %data.part_name))]
    pub async fn record_transaction(
        &self,
        ctx: &Ctx,
        data: TransactionForCreate,
    ) -> Result<Transaction, AppError> {
        data.validate().map_err(AppError::InvalidInput)?;

        let role = data.role.unwrap_or(ctx.role);
        let date = data.date.unwrap_or_else(|| Utc::now().date_naive());
        let invoice_number = match data.invoice_number.as_deref().map(str::trim) {
            Some(invoice) if !invoice.is_empty() => invoice.to_string(),
            _ => TransactionRepository::next_invoice_number(&self.db, date).await?,
        };

        let tx_type = data.tx_type;
        let part_name = data.part_name.clone();
        let quantity = data.quantity;

        let status = match tx_type {
            TransactionType::Supply => TransactionStatus::Completed,
            TransactionType::Demand => TransactionStatus::Pending,
        };

        // Stock is booked first so a refused adjustment leaves no ledger row.
        let booked = match tx_type {
            TransactionType::Supply => self.adjust_part(Some(ctx.user_id), &part_name, quantity).await?,
            TransactionType::Demand => None,
        };

        let created = TransactionRepository::create(
            &self.db,
            Some(ctx.user_id),
            role,
            status,
            date,
            invoice_number,
            data,
        )
        .await;

        let transaction = match created {
            Ok(transaction) => transaction,
            Err(e) => {
                if let Some(part) = booked {
                    warn!("[INVENTORY] reverting {} x{} after failed insert", part.name, quantity);
                    PartRepository::adjust_quantity(&self.db, part.id, -quantity).await?;
                    self.data.invalidate_all().await;
                }
                return Err(e.into());
            }
        };

        info!(
            "[INVENTORY] {} {} x{} recorded as {} ({})",
            tx_type, part_name, quantity, transaction.status, transaction.invoice_number
        );
        self.data.invalidate_all().await;
        Ok(transaction)
    }

    pub async fn get_transaction(&self, ctx: &Ctx, id: i64) -> Result<Transaction, AppError> {
        let transaction = TransactionRepository::get(&self.db, id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Transaction {} not found", id)))?;
        ctx.ensure_read(transaction.user_id)?;
        Ok(transaction)
    }

    /// Edit a transaction's details. Only pending transactions can change.
    pub async fn update_transaction(
        &self,
        ctx: &Ctx,
        id: i64,
        data: TransactionForUpdate,
    ) -> Result<Transaction, AppError> {
        data.validate().map_err(AppError::InvalidInput)?;

        let existing = self.get_transaction(ctx, id).await?;
        ctx.ensure_write(existing.user_id)?;
        if existing.status != TransactionStatus::Pending {
            return Err(AppError::Conflict(format!(
                "Transaction {} is {} and can no longer be edited",
                id, existing.status
            )));
        }

        let updated = TransactionRepository::update(&self.db, id, data)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Transaction {} not found", id)))?;
        self.data.invalidate_all().await;
        Ok(updated)
    }

    pub async fn delete_transaction(&self, ctx: &Ctx, id: i64) -> Result<(), AppError> {
        let existing = self.get_transaction(ctx, id).await?;
        ctx.ensure_write(existing.user_id)?;

        TransactionRepository::delete(&self.db, id).await?;
        self.data.invalidate_all().await;
        Ok(())
    }

    /// Admin approval of a pending transaction.
    #[instrument(skip(self, ctx), fields(admin = %ctx.name))]
    pub async fn approve(&self, ctx: &Ctx, id: i64) -> Result<Transaction, AppError> {
        ctx.require_admin()?;
        self.ensure_pending(id).await?;

        let stamp = StatusStamp {
            approved_by: Some(ctx.name.clone()),
            approved_at: Some(Utc::now()),
            rejection_reason: None,
        };
        let transaction = self.set_status(id, TransactionStatus::Approved, stamp).await?;

        info!("[APPROVAL] transaction {} approved by {}", id, ctx.name);
        Ok(transaction)
    }

    /// Admin rejection of a pending transaction.
    #[instrument(skip(self, ctx, reason), fields(admin = %ctx.name))]
    pub async fn reject(
        &self,
        ctx: &Ctx,
        id: i64,
        reason: Option<String>,
    ) -> Result<Transaction, AppError> {
        ctx.require_admin()?;
        self.ensure_pending(id).await?;

        let stamp = StatusStamp {
            approved_by: Some(ctx.name.clone()),
            approved_at: Some(Utc::now()),
            rejection_reason: reason.filter(|r| !r.trim().is_empty()),
        };
        let transaction = self.set_status(id, TransactionStatus::Rejected, stamp).await?;

        info!("[APPROVAL] transaction {} rejected by {}", id, ctx.name);
        Ok(transaction)
    }

    /// Fulfil an approved transaction. A demand draws its quantity from stock,
    /// never below zero.
    #[instrument(skip(self, ctx), fields(user_id = ctx.user_id))]
    pub async fn complete(&self, ctx: &Ctx, id: i64) -> Result<Transaction, AppError> {
        let existing = self.get_transaction(ctx, id).await?;
        ctx.ensure_write(existing.user_id)?;

        if existing.status != TransactionStatus::Approved {
            return Err(AppError::Conflict(format!(
                "Transaction {} is {}; only approved transactions can be completed",
                id, existing.status
            )));
        }

        let transaction = self
            .set_status(id, TransactionStatus::Completed, StatusStamp::default())
            .await?;

        if existing.tx_type == TransactionType::Demand {
            self.adjust_part(existing.user_id, &existing.part_name, -existing.quantity)
                .await?;
        }

        info!("[INVENTORY] transaction {} completed", id);
        Ok(transaction)
    }

    async fn ensure_pending(&self, id: i64) -> Result<(), AppError> {
        let existing = TransactionRepository::get(&self.db, id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Transaction {} not found", id)))?;

        if existing.status != TransactionStatus::Pending {
            return Err(AppError::Conflict(format!(
                "Transaction {} is {}; only pending transactions can be approved or rejected",
                id, existing.status
            )));
        }
        Ok(())
    }

    async fn set_status(
        &self,
        id: i64,
        status: TransactionStatus,
        stamp: StatusStamp,
    ) -> Result<Transaction, AppError> {
        let transaction = TransactionRepository::set_status(&self.db, id, status, stamp)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Transaction {} not found", id)))?;
        self.data.invalidate_all().await;
        Ok(transaction)
    }

    // endregion: --- Transactions

    // region: --- Shipments

    /// Move a shipment to `status`, appending to its history. Only the first
    /// transition to `delivered` in the history books the quantity into the
    /// owner's stock.
    #[instrument(skip(self, ctx, note), fields(user_id = ctx.user_id))]
    pub async fn set_shipment_status(
        &self,
        ctx: &Ctx,
        id: i64,
        status: ShipmentStatus,
        note: Option<String>,
    ) -> Result<Shipment, AppError> {
        let existing = ShipmentRepository::get(&self.db, id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Shipment {} not found", id)))?;
        ctx.ensure_write(existing.user_id)?;

        let delivered_before = existing
            .history
            .iter()
            .any(|event| event.status == ShipmentStatus::Delivered);
        if status == ShipmentStatus::Delivered && !delivered_before {
            self.adjust_part(existing.user_id, &existing.part_name, existing.quantity)
                .await?;
        }

        let shipment = ShipmentRepository::update_status(&self.db, id, status, note)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Shipment {} not found", id)))?;

        info!("[SHIPMENT] {} {} -> {}", id, existing.status, status);
        self.data.invalidate_all().await;
        Ok(shipment)
    }

    // endregion: --- Shipments

    /// Apply `delta` to the owner's part named `part_name`, falling back to a
    /// system part of that name. A missing part is logged, not an error.
    async fn adjust_part(
        &self,
        owner: Option<i64>,
        part_name: &str,
        delta: i64,
    ) -> Result<Option<Part>, AppError> {
        let mut part = PartRepository::find_by_name(&self.db, owner, part_name).await?;
        if part.is_none() && owner.is_some() {
            part = PartRepository::find_by_name(&self.db, None, part_name).await?;
        }

        let Some(part) = part else {
            warn!("[INVENTORY] no part named '{}' to adjust by {}", part_name, delta);
            return Ok(None);
        };

        // The part exists, so a missing row here means the sum would overflow.
        let updated = PartRepository::adjust_quantity(&self.db, part.id, delta)
            .await?
            .ok_or_else(|| {
                AppError::InvalidInput(format!(
                    "Adding {} to {} ({} on hand) exceeds the stock limit",
                    delta, part.name, part.quantity
                ))
            })?;
        info!(
            "[INVENTORY] {} quantity {} -> {}",
            updated.name, part.quantity, updated.quantity
        );
        Ok(Some(updated))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lib_core::memory_pool;
    use lib_core::model::{PartForCreate, Role, ShipmentForCreate};
    use std::time::Duration;

    fn user(id: i64) -> Ctx {
        Ctx { user_id: id, name: format!("user{}", id), role: Role::Manufacturer, is_admin: false }
    }

    fn admin() -> Ctx {
        Ctx { user_id: 99, name: "Ada Admin".into(), role: Role::Admin, is_admin: true }
    }

    async fn service() -> (InventoryService, DbPool) {
        let pool = memory_pool().await.unwrap();
        let data = Arc::new(DataService::new(pool.clone(), Duration::from_secs(300)));
        (InventoryService::new(pool.clone(), data), pool)
    }

    fn tx(tx_type: TransactionType, part: &str, quantity: i64) -> TransactionForCreate {
        serde_json::from_value(serde_json::json!({
            "part_name": part,
            "type": tx_type.as_str(),
            "quantity": quantity,
            "from": "Northline Metals",
            "to": "Assembly Plant A",
        }))
        .unwrap()
    }

    async fn part(pool: &DbPool, owner: i64, name: &str, quantity: i64) -> Part {
        PartRepository::create(pool, Some(owner), PartForCreate::new(name, quantity))
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_supply_increases_stock_by_quantity() {
        let (service, pool) = service().await;
        let steel = part(&pool, 1, "Steel Sheet", 100).await;

        let recorded = service
            .record_transaction(&user(1), tx(TransactionType::Supply, "Steel Sheet", 250))
            .await
            .unwrap();

        assert_eq!(recorded.status, TransactionStatus::Completed);
        assert!(recorded.invoice_number.starts_with("INV-"));
        let after = PartRepository::get(&pool, steel.id).await.unwrap().unwrap();
        assert_eq!(after.quantity, 350);
    }

    #[tokio::test]
    async fn test_supply_for_unknown_part_is_still_recorded() {
        let (service, _) = service().await;
        let recorded = service
            .record_transaction(&user(1), tx(TransactionType::Supply, "Gasket", 5))
            .await
            .unwrap();
        assert_eq!(recorded.part_name, "Gasket");
    }

    #[tokio::test]
    async fn test_demand_leaves_stock_untouched() {
        let (service, pool) = service().await;
        let axle = part(&pool, 1, "Front Axle", 20).await;

        let recorded = service
            .record_transaction(&user(1), tx(TransactionType::Demand, "Front Axle", 8))
            .await
            .unwrap();

        assert_eq!(recorded.status, TransactionStatus::Pending);
        let after = PartRepository::get(&pool, axle.id).await.unwrap().unwrap();
        assert_eq!(after.quantity, 20);
    }

    #[tokio::test]
    async fn test_approve_stamps_and_requires_pending() {
        let (service, _) = service().await;
        let demand = service
            .record_transaction(&user(1), tx(TransactionType::Demand, "Front Axle", 8))
            .await
            .unwrap();

        let approved = service.approve(&admin(), demand.id).await.unwrap();
        assert_eq!(approved.status, TransactionStatus::Approved);
        assert_eq!(approved.approved_by.as_deref(), Some("Ada Admin"));
        assert!(approved.approved_at.is_some());

        let again = service.approve(&admin(), demand.id).await;
        assert!(matches!(again, Err(AppError::Conflict(_))));
        let reject = service.reject(&admin(), demand.id, None).await;
        assert!(matches!(reject, Err(AppError::Conflict(_))));
    }

    #[tokio::test]
    async fn test_reject_records_reason() {
        let (service, _) = service().await;
        let demand = service
            .record_transaction(&user(1), tx(TransactionType::Demand, "Front Axle", 8))
            .await
            .unwrap();

        let rejected = service
            .reject(&admin(), demand.id, Some("Duplicate order".into()))
            .await
            .unwrap();
        assert_eq!(rejected.status, TransactionStatus::Rejected);
        assert_eq!(rejected.rejection_reason.as_deref(), Some("Duplicate order"));
        assert!(rejected.approved_at.is_some());
    }

    #[tokio::test]
    async fn test_non_admin_cannot_approve() {
        let (service, _) = service().await;
        let demand = service
            .record_transaction(&user(1), tx(TransactionType::Demand, "Front Axle", 8))
            .await
            .unwrap();

        let result = service.approve(&user(1), demand.id).await;
        assert!(matches!(result, Err(AppError::Forbidden(_))));
    }

    #[tokio::test]
    async fn test_complete_demand_clamps_at_zero() {
        let (service, pool) = service().await;
        let axle = part(&pool, 1, "Front Axle", 5).await;
        let demand = service
            .record_transaction(&user(1), tx(TransactionType::Demand, "Front Axle", 8))
            .await
            .unwrap();

        let early = service.complete(&user(1), demand.id).await;
        assert!(matches!(early, Err(AppError::Conflict(_))));

        service.approve(&admin(), demand.id).await.unwrap();
        let done = service.complete(&user(1), demand.id).await.unwrap();
        assert_eq!(done.status, TransactionStatus::Completed);

        let after = PartRepository::get(&pool, axle.id).await.unwrap().unwrap();
        assert_eq!(after.quantity, 0);
    }

    #[tokio::test]
    async fn test_other_users_transactions_are_hidden() {
        let (service, _) = service().await;
        let demand = service
            .record_transaction(&user(1), tx(TransactionType::Demand, "Front Axle", 8))
            .await
            .unwrap();

        let result = service.get_transaction(&user(2), demand.id).await;
        assert!(matches!(result, Err(AppError::Forbidden(_))));
        assert!(service.get_transaction(&admin(), demand.id).await.is_ok());
    }

    #[tokio::test]
    async fn test_only_pending_transactions_are_editable() {
        let (service, _) = service().await;
        let supply = service
            .record_transaction(&user(1), tx(TransactionType::Supply, "Steel Sheet", 5))
            .await
            .unwrap();

        let update = TransactionForUpdate { quantity: Some(6), ..Default::default() };
        let result = service.update_transaction(&user(1), supply.id, update).await;
        assert!(matches!(result, Err(AppError::Conflict(_))));
    }

    #[tokio::test]
    async fn test_delivery_books_stock_once() {
        let (service, pool) = service().await;
        let block = part(&pool, 1, "Engine Block", 10).await;
        let shipment = ShipmentRepository::create(
            &pool,
            Some(1),
            serde_json::from_value::<ShipmentForCreate>(serde_json::json!({
                "part_name": "Engine Block",
                "quantity": 4,
                "from": "Foundry",
                "to": "Plant",
            }))
            .unwrap(),
        )
        .await
        .unwrap();

        let ctx = user(1);
        service
            .set_shipment_status(&ctx, shipment.id, ShipmentStatus::InTransit, None)
            .await
            .unwrap();
        let delivered = service
            .set_shipment_status(&ctx, shipment.id, ShipmentStatus::Delivered, Some("Dock 3".into()))
            .await
            .unwrap();
        service
            .set_shipment_status(&ctx, shipment.id, ShipmentStatus::Delivered, None)
            .await
            .unwrap();

        assert_eq!(delivered.history.len(), 3);
        let after = PartRepository::get(&pool, block.id).await.unwrap().unwrap();
        assert_eq!(after.quantity, 14);
    }

    #[tokio::test]
    async fn test_redelivery_does_not_book_twice() {
        let (service, pool) = service().await;
        let block = part(&pool, 1, "Engine Block", 10).await;
        let shipment = ShipmentRepository::create(
            &pool,
            Some(1),
            serde_json::from_value::<ShipmentForCreate>(serde_json::json!({
                "part_name": "Engine Block",
                "quantity": 4,
                "from": "Foundry",
                "to": "Plant",
            }))
            .unwrap(),
        )
        .await
        .unwrap();

        let ctx = user(1);
        for status in [ShipmentStatus::Delivered, ShipmentStatus::Delayed, ShipmentStatus::Delivered] {
            service.set_shipment_status(&ctx, shipment.id, status, None).await.unwrap();
        }

        let after = PartRepository::get(&pool, block.id).await.unwrap().unwrap();
        assert_eq!(after.quantity, 14);
    }

    #[tokio::test]
    async fn test_oversized_supply_is_rejected() {
        let (service, pool) = service().await;
        let pad = part(&pool, 1, "Brake Pad", 40).await;

        let result = service
            .record_transaction(&user(1), tx(TransactionType::Supply, "Brake Pad", i64::MAX))
            .await;
        assert!(matches!(result, Err(AppError::InvalidInput(_))));

        let after = PartRepository::get(&pool, pad.id).await.unwrap().unwrap();
        assert_eq!(after.quantity, 40);
        assert_eq!(TransactionRepository::count(&pool).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_supply_past_stock_limit_leaves_no_ledger_row() {
        let (service, pool) = service().await;
        let full = part(&pool, 1, "Rivet", i64::MAX - 5).await;

        let result = service
            .record_transaction(&user(1), tx(TransactionType::Supply, "Rivet", 10))
            .await;
        assert!(matches!(result, Err(AppError::InvalidInput(_))));

        let after = PartRepository::get(&pool, full.id).await.unwrap().unwrap();
        assert_eq!(after.quantity, i64::MAX - 5);
        assert_eq!(TransactionRepository::count(&pool).await.unwrap(), 0);

        let parts = PartRepository::list(&pool, lib_core::Scope::User(1)).await.unwrap();
        assert_eq!(parts.len(), 1);
    }
}
