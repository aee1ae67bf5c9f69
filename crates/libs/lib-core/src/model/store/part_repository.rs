//! # Part Repository
//!
//! Inventory rows. Quantity adjustments clamp at zero in SQL.

use super::models::{Part, PartForCreate, PartForUpdate};
use super::{DbPool, Scope};
use chrono::Utc;
use sqlx::{query_as, QueryBuilder, Sqlite};

pub struct PartRepository;

impl PartRepository {
    pub async fn list(pool: &DbPool, scope: Scope) -> Result<Vec<Part>, sqlx::Error> {
        match scope {
            Scope::User(user_id) => {
                query_as::<_, Part>("SELECT * FROM parts WHERE user_id = ? ORDER BY name, id")
                    .bind(user_id)
                    .fetch_all(pool)
                    .await
            }
            Scope::System => {
                query_as::<_, Part>("SELECT * FROM parts ORDER BY name, id")
                    .fetch_all(pool)
                    .await
            }
        }
    }

    pub async fn get(pool: &DbPool, id: i64) -> Result<Option<Part>, sqlx::Error> {
        query_as::<_, Part>("SELECT * FROM parts WHERE id = ?")
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Find a part by exact name within one owner (or among system parts when `user_id` is `None`).
    pub async fn find_by_name(
        pool: &DbPool,
        user_id: Option<i64>,
        name: &str,
    ) -> Result<Option<Part>, sqlx::Error> {
        query_as::<_, Part>("SELECT * FROM parts WHERE user_id IS ? AND name = ? ORDER BY id LIMIT 1")
            .bind(user_id)
            .bind(name)
            .fetch_optional(pool)
            .await
    }

    pub async fn create(
        pool: &DbPool,
        user_id: Option<i64>,
        data: PartForCreate,
    ) -> Result<Part, sqlx::Error> {
        let now = Utc::now();
        query_as::<_, Part>(
            "INSERT INTO parts (user_id, name, quantity, reorder_point, max_stock, part_type, \
             source, lead_time_days, backorders, created_at, updated_at) \
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?) RETURNING *",
        )
        .bind(user_id)
        .bind(data.name)
        .bind(data.quantity.max(0))
        .bind(data.reorder_point)
        .bind(data.max_stock)
        .bind(data.part_type.as_str())
        .bind(data.source)
        .bind(data.lead_time_days)
        .bind(data.backorders)
        .bind(now)
        .bind(now)
        .fetch_one(pool)
        .await
    }

    /// Update the provided fields. Returns `None` when the part does not exist.
    pub async fn update(
        pool: &DbPool,
        id: i64,
        data: PartForUpdate,
    ) -> Result<Option<Part>, sqlx::Error> {
        let mut qb = QueryBuilder::<Sqlite>::new("UPDATE parts SET ");
        let mut set = qb.separated(", ");

        if let Some(name) = data.name {
            set.push("name = ").push_bind_unseparated(name);
        }
        if let Some(quantity) = data.quantity {
            set.push("quantity = ").push_bind_unseparated(quantity.max(0));
        }
        if let Some(reorder_point) = data.reorder_point {
            set.push("reorder_point = ").push_bind_unseparated(reorder_point);
        }
        if let Some(max_stock) = data.max_stock {
            set.push("max_stock = ").push_bind_unseparated(max_stock);
        }
        if let Some(part_type) = data.part_type {
            set.push("part_type = ").push_bind_unseparated(part_type.as_str());
        }
        if let Some(source) = data.source {
            set.push("source = ").push_bind_unseparated(source);
        }
        if let Some(lead_time_days) = data.lead_time_days {
            set.push("lead_time_days = ").push_bind_unseparated(lead_time_days);
        }
        if let Some(backorders) = data.backorders {
            set.push("backorders = ").push_bind_unseparated(backorders);
        }
        set.push("updated_at = ").push_bind_unseparated(Utc::now());

        qb.push(" WHERE id = ").push_bind(id).push(" RETURNING *");

        qb.build_query_as::<Part>().fetch_optional(pool).await
    }

    /// Add `delta` (possibly negative) to a part's quantity, never going below zero.
    ///
    /// Returns `None` when the part does not exist or the new quantity would not
    /// fit in an `i64`; the row is left untouched in both cases.
    pub async fn adjust_quantity(
        pool: &DbPool,
        id: i64,
        delta: i64,
    ) -> Result<Option<Part>, sqlx::Error> {
        // Stored quantities are never negative, so only growth can overflow.
        let ceiling = i64::MAX - delta.max(0);
        query_as::<_, Part>(
            "UPDATE parts SET quantity = MAX(0, quantity + ?), updated_at = ? \
             WHERE id = ? AND quantity <= ? RETURNING *",
        )
        .bind(delta)
        .bind(Utc::now())
        .bind(id)
        .bind(ceiling)
        .fetch_optional(pool)
        .await
    }

    pub async fn delete(pool: &DbPool, id: i64) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM parts WHERE id = ?")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn count(pool: &DbPool) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar("SELECT COUNT(*) FROM parts")
            .fetch_one(pool)
            .await
    }

    /// Parts owned by users that no longer exist.
    pub async fn count_orphaned(pool: &DbPool) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar(
            "SELECT COUNT(*) FROM parts WHERE user_id IS NOT NULL \
             AND user_id NOT IN (SELECT id FROM users)",
        )
        .fetch_one(pool)
        .await
    }

    pub async fn delete_orphaned(pool: &DbPool) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(
            "DELETE FROM parts WHERE user_id IS NOT NULL AND user_id NOT IN (SELECT id FROM users)",
        )
        .execute(pool)
        .await?;
        Ok(result.rows_affected())
    }
}
