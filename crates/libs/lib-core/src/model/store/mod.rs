//! # Database Store
//!
//! Database connection pool and repository implementations.
//!
//! Repositories are unit structs with associated async functions taking a
//! `&DbPool`. Each call is an independent statement; callers that touch two
//! tables do so with two writes.

// region: --- Modules
pub mod models;
pub mod part_repository;
pub mod session_repository;
pub mod shipment_repository;
pub mod transaction_repository;
pub mod user_repository;
pub mod vendor_repository;
// endregion: --- Modules

// region: --- Re-exports
pub use part_repository::PartRepository;
pub use session_repository::{SessionRepository, SessionSnapshot};
pub use shipment_repository::ShipmentRepository;
pub use transaction_repository::TransactionRepository;
pub use user_repository::UserRepository;
pub use vendor_repository::VendorRepository;
// endregion: --- Re-exports

// region: --- Types and Functions
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;
use std::str::FromStr;

/// Type alias for SQLite connection pool.
pub type DbPool = SqlitePool;

/// Whose rows a list query returns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Scope {
    /// Rows owned by one user.
    User(i64),
    /// Every row, regardless of owner.
    System,
}

impl Scope {
    pub fn user_id(&self) -> Option<i64> {
        match self {
            Scope::User(id) => Some(*id),
            Scope::System => None,
        }
    }
}

impl std::fmt::Display for Scope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Scope::User(id) => write!(f, "user:{}", id),
            Scope::System => write!(f, "system"),
        }
    }
}

/// Create a new SQLite connection pool, creating the file (and its parent
/// directory) if needed.
pub async fn create_pool(database_url: &str) -> anyhow::Result<DbPool> {
    let options = SqliteConnectOptions::from_str(database_url)?.create_if_missing(true);

    if let Some(parent) = options.get_filename().parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            std::fs::create_dir_all(parent)?;
        }
    }

    let pool = SqlitePool::connect_with(options).await?;

    Ok(pool)
}

/// Apply the embedded schema migrations.
pub async fn run_migrations(pool: &DbPool) -> anyhow::Result<()> {
    sqlx::migrate!("./migrations").run(pool).await?;
    Ok(())
}

/// Single-connection in-memory database with the schema applied.
///
/// One connection only: every new `:memory:` connection would open an empty database.
pub async fn memory_pool() -> anyhow::Result<DbPool> {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect("sqlite::memory:")
        .await?;
    run_migrations(&pool).await?;
    Ok(pool)
}
// endregion: --- Types and Functions
