//! # User Repository
//!
//! Provides database access layer for user accounts.
//!
//! ## Example
//!
//! ```rust,no_run
//! # use lib_core::model::store::{memory_pool, UserRepository, models::UserForCreate};
//! # use lib_core::model::Role;
//! # async fn example() -> anyhow::Result<()> {
//! let pool = memory_pool().await?;
//!
//! let user = UserRepository::create(
//!     &pool,
//!     UserForCreate::new("Alice".into(), "alice@example.com".into(), "hash".into(), Role::Supplier),
//! ).await?;
//!
//! let found = UserRepository::find_by_email(&pool, "alice@example.com").await?;
//! assert!(found.is_some());
//! # Ok(())
//! # }
//! ```

use super::models::{User, UserForCreate, UserForUpdate};
use super::DbPool;
use crate::model::enums::Role;
use chrono::Utc;
use sqlx::query_as;

/// User repository for database operations.
pub struct UserRepository;

impl UserRepository {
    /// Find a user by their email address.
    ///
    /// # Returns
    ///
    /// * `Ok(Some(User))` - User found with matching email
    /// * `Ok(None)` - No user found with that email
    /// * `Err(sqlx::Error)` - Database error occurred
    pub async fn find_by_email(pool: &DbPool, email: &str) -> Result<Option<User>, sqlx::Error> {
        query_as::<_, User>("SELECT * FROM users WHERE email = ?")
            .bind(email)
            .fetch_optional(pool)
            .await
    }

    pub async fn find_by_id(pool: &DbPool, id: i64) -> Result<Option<User>, sqlx::Error> {
        query_as::<_, User>("SELECT * FROM users WHERE id = ?")
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    pub async fn find_by_wallet(pool: &DbPool, wallet_address: &str) -> Result<Option<User>, sqlx::Error> {
        query_as::<_, User>("SELECT * FROM users WHERE lower(wallet_address) = lower(?)")
            .bind(wallet_address)
            .fetch_optional(pool)
            .await
    }

    /// List users, newest first, optionally restricted to one role.
    pub async fn list(
        pool: &DbPool,
        role: Option<Role>,
        limit: Option<i64>,
    ) -> Result<Vec<User>, sqlx::Error> {
        // SQLite treats a negative LIMIT as "no limit".
        let limit = limit.unwrap_or(-1);
        match role {
            Some(role) => {
                query_as::<_, User>("SELECT * FROM users WHERE role = ? ORDER BY id DESC LIMIT ?")
                    .bind(role.as_str())
                    .bind(limit)
                    .fetch_all(pool)
                    .await
            }
            None => {
                query_as::<_, User>("SELECT * FROM users ORDER BY id DESC LIMIT ?")
                    .bind(limit)
                    .fetch_all(pool)
                    .await
            }
        }
    }

    /// Create a new user.
    ///
    /// # Errors
    ///
    /// Returns `sqlx::Error` if the email already exists (UNIQUE constraint violation)
    /// or the database connection fails.
    pub async fn create(pool: &DbPool, user_data: UserForCreate) -> Result<User, sqlx::Error> {
        let now = Utc::now();
        query_as::<_, User>(
            "INSERT INTO users (name, email, password_hash, role, is_admin, created_at, updated_at) \
             VALUES (?, ?, ?, ?, ?, ?, ?) RETURNING *",
        )
        .bind(&user_data.name)
        .bind(&user_data.email)
        .bind(&user_data.password_hash)
        .bind(user_data.role.as_str())
        .bind(user_data.is_admin)
        .bind(now)
        .bind(now)
        .fetch_one(pool)
        .await
    }

    /// Update the provided fields of a user.
    ///
    /// Setting a wallet address also stamps `wallet_connected_at`.
    pub async fn update(
        pool: &DbPool,
        id: i64,
        user_data: UserForUpdate,
    ) -> Result<User, sqlx::Error> {
        let mut updates = Vec::new();

        if user_data.name.is_some() {
            updates.push("name = ?");
        }
        if user_data.email.is_some() {
            updates.push("email = ?");
        }
        if user_data.password_hash.is_some() {
            updates.push("password_hash = ?");
        }
        if user_data.role.is_some() {
            updates.push("role = ?");
        }
        if user_data.is_admin.is_some() {
            updates.push("is_admin = ?");
        }
        if user_data.is_active.is_some() {
            updates.push("is_active = ?");
        }
        if user_data.wallet_address.is_some() {
            updates.push("wallet_address = ?");
            updates.push("wallet_connected_at = ?");
        }

        if updates.is_empty() {
            return query_as::<_, User>("SELECT * FROM users WHERE id = ?")
                .bind(id)
                .fetch_one(pool)
                .await;
        }

        updates.push("updated_at = ?");
        let query_str = format!("UPDATE users SET {} WHERE id = ? RETURNING *", updates.join(", "));
        let now = Utc::now();

        let mut query = query_as::<_, User>(&query_str);

        if let Some(ref name) = user_data.name {
            query = query.bind(name);
        }
        if let Some(ref email) = user_data.email {
            query = query.bind(email);
        }
        if let Some(ref password_hash) = user_data.password_hash {
            query = query.bind(password_hash);
        }
        if let Some(role) = user_data.role {
            query = query.bind(role.as_str());
        }
        if let Some(is_admin) = user_data.is_admin {
            query = query.bind(is_admin);
        }
        if let Some(is_active) = user_data.is_active {
            query = query.bind(is_active);
        }
        if let Some(ref wallet_address) = user_data.wallet_address {
            query = query.bind(wallet_address).bind(now);
        }

        query.bind(now).bind(id).fetch_one(pool).await
    }

    pub async fn update_last_login(pool: &DbPool, id: i64) -> Result<(), sqlx::Error> {
        sqlx::query("UPDATE users SET last_login = ? WHERE id = ?")
            .bind(Utc::now())
            .bind(id)
            .execute(pool)
            .await?;
        Ok(())
    }

    /// Delete a user by id. Returns whether a row was removed.
    pub async fn delete(pool: &DbPool, id: i64) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM users WHERE id = ?")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn count(pool: &DbPool) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar("SELECT COUNT(*) FROM users")
            .fetch_one(pool)
            .await
    }

    /// Number of users per role, in role order.
    pub async fn count_by_role(pool: &DbPool) -> Result<Vec<(String, i64)>, sqlx::Error> {
        sqlx::query_as::<_, (String, i64)>(
            "SELECT role, COUNT(*) FROM users GROUP BY role ORDER BY role",
        )
        .fetch_all(pool)
        .await
    }
}
