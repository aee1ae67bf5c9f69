//! # Vendor Repository
//!
//! Vendors are system-wide; `roles` and `supplied_parts` are JSON arrays.

use super::models::{Vendor, VendorForCreate, VendorForUpdate};
use super::DbPool;
use chrono::Utc;
use sqlx::types::Json;
use sqlx::{query_as, QueryBuilder, Sqlite};

pub struct VendorRepository;

impl VendorRepository {
    pub async fn list(pool: &DbPool) -> Result<Vec<Vendor>, sqlx::Error> {
        query_as::<_, Vendor>("SELECT * FROM vendors ORDER BY name, id")
            .fetch_all(pool)
            .await
    }

    pub async fn get(pool: &DbPool, id: i64) -> Result<Option<Vendor>, sqlx::Error> {
        query_as::<_, Vendor>("SELECT * FROM vendors WHERE id = ?")
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    pub async fn create(pool: &DbPool, data: VendorForCreate) -> Result<Vendor, sqlx::Error> {
        let now = Utc::now();
        query_as::<_, Vendor>(
            "INSERT INTO vendors (name, category, relationship_type, roles, wallet_address, rating, \
             fulfillment_rate, supplied_parts, created_at, updated_at) \
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?) RETURNING *",
        )
        .bind(data.name)
        .bind(data.category)
        .bind(data.relationship_type.as_str())
        .bind(Json(data.roles))
        .bind(data.wallet_address)
        .bind(data.rating)
        .bind(data.fulfillment_rate)
        .bind(Json(data.supplied_parts))
        .bind(now)
        .bind(now)
        .fetch_one(pool)
        .await
    }

    pub async fn update(
        pool: &DbPool,
        id: i64,
        data: VendorForUpdate,
    ) -> Result<Option<Vendor>, sqlx::Error> {
        let mut qb = QueryBuilder::<Sqlite>::new("UPDATE vendors SET ");
        let mut set = qb.separated(", ");

        if let Some(name) = data.name {
            set.push("name = ").push_bind_unseparated(name);
        }
        if let Some(category) = data.category {
            set.push("category = ").push_bind_unseparated(category);
        }
        if let Some(relationship_type) = data.relationship_type {
            set.push("relationship_type = ")
                .push_bind_unseparated(relationship_type.as_str());
        }
        if let Some(roles) = data.roles {
            set.push("roles = ").push_bind_unseparated(Json(roles));
        }
        if let Some(wallet_address) = data.wallet_address {
            set.push("wallet_address = ").push_bind_unseparated(wallet_address);
        }
        if let Some(rating) = data.rating {
            set.push("rating = ").push_bind_unseparated(rating);
        }
        if let Some(fulfillment_rate) = data.fulfillment_rate {
            set.push("fulfillment_rate = ").push_bind_unseparated(fulfillment_rate);
        }
        if let Some(supplied_parts) = data.supplied_parts {
            set.push("supplied_parts = ").push_bind_unseparated(Json(supplied_parts));
        }
        set.push("updated_at = ").push_bind_unseparated(Utc::now());

        qb.push(" WHERE id = ").push_bind(id).push(" RETURNING *");

        qb.build_query_as::<Vendor>().fetch_optional(pool).await
    }

    pub async fn delete(pool: &DbPool, id: i64) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM vendors WHERE id = ?")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn count(pool: &DbPool) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar("SELECT COUNT(*) FROM vendors")
            .fetch_one(pool)
            .await
    }
}
