//! # Shipment Repository
//!
//! Shipments keep their status history as a JSON array column.

use super::models::{Shipment, ShipmentEvent, ShipmentForCreate, ShipmentForUpdate};
use super::{DbPool, Scope};
use crate::model::enums::ShipmentStatus;
use chrono::Utc;
use sqlx::types::Json;
use sqlx::{query_as, QueryBuilder, Sqlite};

pub struct ShipmentRepository;

impl ShipmentRepository {
    pub async fn list(pool: &DbPool, scope: Scope) -> Result<Vec<Shipment>, sqlx::Error> {
        match scope {
            Scope::User(user_id) => {
                query_as::<_, Shipment>("SELECT * FROM shipments WHERE user_id = ? ORDER BY id DESC")
                    .bind(user_id)
                    .fetch_all(pool)
                    .await
            }
            Scope::System => {
                query_as::<_, Shipment>("SELECT * FROM shipments ORDER BY id DESC")
                    .fetch_all(pool)
                    .await
            }
        }
    }

    pub async fn get(pool: &DbPool, id: i64) -> Result<Option<Shipment>, sqlx::Error> {
        query_as::<_, Shipment>("SELECT * FROM shipments WHERE id = ?")
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Insert a shipment with a single history entry for its initial status.
    pub async fn create(
        pool: &DbPool,
        user_id: Option<i64>,
        data: ShipmentForCreate,
    ) -> Result<Shipment, sqlx::Error> {
        let now = Utc::now();
        let status = data.status.unwrap_or(ShipmentStatus::Pending);
        let history = vec![ShipmentEvent {
            status,
            note: Some("Shipment created".to_string()),
            at: now,
        }];

        query_as::<_, Shipment>(
            "INSERT INTO shipments (user_id, transaction_id, part_name, quantity, from_party, \
             to_party, status, history, blockchain_order_id, blockchain_tx_hash, created_at, updated_at) \
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?) RETURNING *",
        )
        .bind(user_id)
        .bind(data.transaction_id)
        .bind(data.part_name)
        .bind(data.quantity)
        .bind(data.from_party)
        .bind(data.to_party)
        .bind(status.as_str())
        .bind(Json(history))
        .bind(data.blockchain_order_id)
        .bind(data.blockchain_tx_hash)
        .bind(now)
        .bind(now)
        .fetch_one(pool)
        .await
    }

    pub async fn update(
        pool: &DbPool,
        id: i64,
        data: ShipmentForUpdate,
    ) -> Result<Option<Shipment>, sqlx::Error> {
        let mut qb = QueryBuilder::<Sqlite>::new("UPDATE shipments SET ");
        let mut set = qb.separated(", ");

        if let Some(transaction_id) = data.transaction_id {
            set.push("transaction_id = ").push_bind_unseparated(transaction_id);
        }
        if let Some(part_name) = data.part_name {
            set.push("part_name = ").push_bind_unseparated(part_name);
        }
        if let Some(quantity) = data.quantity {
            set.push("quantity = ").push_bind_unseparated(quantity);
        }
        if let Some(from_party) = data.from_party {
            set.push("from_party = ").push_bind_unseparated(from_party);
        }
        if let Some(to_party) = data.to_party {
            set.push("to_party = ").push_bind_unseparated(to_party);
        }
        if let Some(order_id) = data.blockchain_order_id {
            set.push("blockchain_order_id = ").push_bind_unseparated(order_id);
        }
        if let Some(tx_hash) = data.blockchain_tx_hash {
            set.push("blockchain_tx_hash = ").push_bind_unseparated(tx_hash);
        }
        set.push("updated_at = ").push_bind_unseparated(Utc::now());

        qb.push(" WHERE id = ").push_bind(id).push(" RETURNING *");

        qb.build_query_as::<Shipment>().fetch_optional(pool).await
    }

    /// Change the status and append the matching history entry.
    ///
    /// Read-modify-write: concurrent status changes on the same shipment are last-write-wins.
    pub async fn update_status(
        pool: &DbPool,
        id: i64,
        status: ShipmentStatus,
        note: Option<String>,
    ) -> Result<Option<Shipment>, sqlx::Error> {
        let Some(shipment) = Self::get(pool, id).await? else {
            return Ok(None);
        };

        let now = Utc::now();
        let mut history = shipment.history;
        history.push(ShipmentEvent { status, note, at: now });

        query_as::<_, Shipment>(
            "UPDATE shipments SET status = ?, history = ?, updated_at = ? WHERE id = ? RETURNING *",
        )
        .bind(status.as_str())
        .bind(Json(history))
        .bind(now)
        .bind(id)
        .fetch_optional(pool)
        .await
    }

    pub async fn delete(pool: &DbPool, id: i64) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM shipments WHERE id = ?")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn count(pool: &DbPool) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar("SELECT COUNT(*) FROM shipments")
            .fetch_one(pool)
            .await
    }

    pub async fn count_orphaned(pool: &DbPool) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar(
            "SELECT COUNT(*) FROM shipments WHERE user_id IS NOT NULL \
             AND user_id NOT IN (SELECT id FROM users)",
        )
        .fetch_one(pool)
        .await
    }

    pub async fn delete_orphaned(pool: &DbPool) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(
            "DELETE FROM shipments WHERE user_id IS NOT NULL AND user_id NOT IN (SELECT id FROM users)",
        )
        .execute(pool)
        .await?;
        Ok(result.rows_affected())
    }
}
