//! # Session Snapshot Repository
//!
//! One JSON snapshot per non-admin user. Writes are last-write-wins.

use super::DbPool;
use chrono::{DateTime, Utc};
use serde_json::Value;
use sqlx::types::Json;
use sqlx::FromRow;

#[derive(Debug, Clone, FromRow)]
pub struct SessionSnapshot {
    pub user_id: i64,
    pub payload: Json<Value>,
    pub updated_at: DateTime<Utc>,
}

pub struct SessionRepository;

impl SessionRepository {
    pub async fn get(pool: &DbPool, user_id: i64) -> Result<Option<SessionSnapshot>, sqlx::Error> {
        sqlx::query_as::<_, SessionSnapshot>("SELECT * FROM session_snapshots WHERE user_id = ?")
            .bind(user_id)
            .fetch_optional(pool)
            .await
    }

    /// Insert or replace the snapshot for `user_id`.
    pub async fn upsert(pool: &DbPool, user_id: i64, payload: &Value) -> Result<(), sqlx::Error> {
        sqlx::query(
            "INSERT INTO session_snapshots (user_id, payload, updated_at) VALUES (?, ?, ?) \
             ON CONFLICT(user_id) DO UPDATE SET payload = excluded.payload, updated_at = excluded.updated_at",
        )
        .bind(user_id)
        .bind(Json(payload))
        .bind(Utc::now())
        .execute(pool)
        .await?;
        Ok(())
    }

    pub async fn delete(pool: &DbPool, user_id: i64) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM session_snapshots WHERE user_id = ?")
            .bind(user_id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn count(pool: &DbPool) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar("SELECT COUNT(*) FROM session_snapshots")
            .fetch_one(pool)
            .await
    }

    /// Snapshots whose user has been deleted.
    pub async fn count_orphaned(pool: &DbPool) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar(
            "SELECT COUNT(*) FROM session_snapshots WHERE user_id NOT IN (SELECT id FROM users)",
        )
        .fetch_one(pool)
        .await
    }

    pub async fn delete_orphaned(pool: &DbPool) -> Result<u64, sqlx::Error> {
        let result =
            sqlx::query("DELETE FROM session_snapshots WHERE user_id NOT IN (SELECT id FROM users)")
                .execute(pool)
                .await?;
        Ok(result.rows_affected())
    }
}
