//! Subcommand options and the database work behind them.

use std::fmt;

use anyhow::{anyhow, bail};
use clap::Args;
use lib_auth::{generate_temporary_password, hash_password};
use lib_core::model::store::models::validate_new_user;
use lib_core::model::store::{
    PartRepository, SessionRepository, ShipmentRepository, TransactionRepository, UserRepository,
    VendorRepository,
};
use lib_core::model::{Role, User, UserForCreate, UserForUpdate};
use lib_core::DbPool;

// region: --- Options

#[derive(Args, Debug, Default)]
pub struct ListUsersArgs {
    #[arg(long)]
    pub role: Option<Role>,
    #[arg(long)]
    pub limit: Option<i64>,
}

#[derive(Args, Debug)]
pub struct DeleteUserArgs {
    #[arg(long)]
    pub email: String,
    /// Skip the confirmation prompt
    #[arg(long)]
    pub yes: bool,
}

#[derive(Args, Debug, Default)]
pub struct UpdateUserArgs {
    #[arg(long)]
    pub email: String,
    #[arg(long)]
    pub name: Option<String>,
    #[arg(long)]
    pub role: Option<Role>,
    #[arg(long)]
    pub admin: Option<bool>,
    #[arg(long)]
    pub active: Option<bool>,
    #[arg(long)]
    pub wallet: Option<String>,
}

#[derive(Args, Debug)]
pub struct CreateUserArgs {
    #[arg(long)]
    pub email: String,
    #[arg(long)]
    pub name: String,
    #[arg(long)]
    pub password: String,
    #[arg(long, default_value = "manufacturer")]
    pub role: Role,
    /// Defaults to true for the admin role
    #[arg(long)]
    pub admin: Option<bool>,
}

#[derive(Args, Debug)]
pub struct CleanupArgs {
    /// Report what would be removed without deleting
    #[arg(long)]
    pub dry_run: bool,
}

#[derive(Args, Debug)]
pub struct ResetPasswordArgs {
    #[arg(long)]
    pub email: String,
    /// A temporary password is generated and printed when omitted
    #[arg(long)]
    pub password: Option<String>,
}

// endregion: --- Options

// region: --- Stats

#[derive(Debug, PartialEq)]
pub struct Stats {
    pub users: i64,
    pub users_by_role: Vec<(String, i64)>,
    pub parts: i64,
    pub transactions: i64,
    pub shipments: i64,
    pub vendors: i64,
    pub sessions: i64,
}

impl fmt::Display for Stats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "users         {}", self.users)?;
        for (role, count) in &self.users_by_role {
            writeln!(f, "  {:<12}{}", role, count)?;
        }
        writeln!(f, "parts         {}", self.parts)?;
        writeln!(f, "transactions  {}", self.transactions)?;
        writeln!(f, "shipments     {}", self.shipments)?;
        writeln!(f, "vendors       {}", self.vendors)?;
        write!(f, "sessions      {}", self.sessions)
    }
}

pub async fn stats(pool: &DbPool) -> anyhow::Result<Stats> {
    Ok(Stats {
        users: UserRepository::count(pool).await?,
        users_by_role: UserRepository::count_by_role(pool).await?,
        parts: PartRepository::count(pool).await?,
        transactions: TransactionRepository::count(pool).await?,
        shipments: ShipmentRepository::count(pool).await?,
        vendors: VendorRepository::count(pool).await?,
        sessions: SessionRepository::count(pool).await?,
    })
}

// endregion: --- Stats

// region: --- Users

const TEMP_PASSWORD_LEN: usize = 16;

pub async fn list_users(pool: &DbPool, args: &ListUsersArgs) -> anyhow::Result<Vec<User>> {
    Ok(UserRepository::list(pool, args.role, args.limit).await?)
}

async fn require_user(pool: &DbPool, email: &str) -> anyhow::Result<User> {
    UserRepository::find_by_email(pool, email)
        .await?
        .ok_or_else(|| anyhow!("No user with email {}", email))
}

pub async fn delete_user(pool: &DbPool, email: &str) -> anyhow::Result<()> {
    let user = require_user(pool, email).await?;
    SessionRepository::delete(pool, user.id).await?;
    UserRepository::delete(pool, user.id).await?;
    Ok(())
}

pub async fn update_user(pool: &DbPool, args: UpdateUserArgs) -> anyhow::Result<User> {
    let user = require_user(pool, &args.email).await?;

    let mut changes = UserForUpdate::new();
    if let Some(name) = args.name {
        lib_utils::validate_not_empty(&name, "Name").map_err(|e| anyhow!(e))?;
        changes = changes.name(name);
    }
    if let Some(role) = args.role {
        changes = changes.role(role);
    }
    if let Some(admin) = args.admin {
        changes = changes.is_admin(admin);
    }
    if let Some(active) = args.active {
        changes = changes.is_active(active);
    }
    if let Some(wallet) = args.wallet {
        lib_utils::validate_eth_address(&wallet).map_err(|e| anyhow!(e))?;
        changes = changes.wallet_address(wallet.to_lowercase());
    }

    if changes.is_empty() {
        bail!("Nothing to update; pass at least one of --name, --role, --admin, --active, --wallet");
    }

    Ok(UserRepository::update(pool, user.id, changes).await?)
}

pub async fn create_user(pool: &DbPool, args: CreateUserArgs) -> anyhow::Result<User> {
    validate_new_user(&args.name, &args.email).map_err(|e| anyhow!(e))?;
    if UserRepository::find_by_email(pool, &args.email).await?.is_some() {
        bail!("Email already registered: {}", args.email);
    }

    let hash = hash_password(&args.password).map_err(|e| anyhow!(e))?;
    let is_admin = args.admin.unwrap_or(args.role == Role::Admin);
    let data = UserForCreate::new(args.name.trim().to_string(), args.email, hash, args.role).admin(is_admin);

    Ok(UserRepository::create(pool, data).await?)
}

/// Returns the password that was set.
pub async fn reset_password(pool: &DbPool, email: &str, password: Option<String>) -> anyhow::Result<String> {
    let user = require_user(pool, email).await?;
    let password = password.unwrap_or_else(|| generate_temporary_password(TEMP_PASSWORD_LEN));
    let hash = hash_password(&password).map_err(|e| anyhow!(e))?;
    UserRepository::update(pool, user.id, UserForUpdate::new().password_hash(hash)).await?;
    Ok(password)
}

// endregion: --- Users

// region: --- Cleanup

#[derive(Debug, Default, PartialEq)]
pub struct CleanupReport {
    pub orphaned_sessions: u64,
    pub orphaned_parts: u64,
    pub orphaned_transactions: u64,
    pub orphaned_shipments: u64,
    pub non_positive_transactions: u64,
}

impl CleanupReport {
    pub fn total(&self) -> u64 {
        self.orphaned_sessions
            + self.orphaned_parts
            + self.orphaned_transactions
            + self.orphaned_shipments
            + self.non_positive_transactions
    }
}

impl fmt::Display for CleanupReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "orphaned session snapshots  {}", self.orphaned_sessions)?;
        writeln!(f, "orphaned parts              {}", self.orphaned_parts)?;
        writeln!(f, "orphaned transactions       {}", self.orphaned_transactions)?;
        writeln!(f, "orphaned shipments          {}", self.orphaned_shipments)?;
        writeln!(f, "non-positive transactions   {}", self.non_positive_transactions)?;
        write!(f, "total                       {}", self.total())
    }
}

/// Orphans are rows owned by a user id that no longer exists.
pub async fn cleanup(pool: &DbPool, dry_run: bool) -> anyhow::Result<CleanupReport> {
    if dry_run {
        return Ok(CleanupReport {
            orphaned_sessions: SessionRepository::count_orphaned(pool).await? as u64,
            orphaned_parts: PartRepository::count_orphaned(pool).await? as u64,
            orphaned_transactions: TransactionRepository::count_orphaned(pool).await? as u64,
            orphaned_shipments: ShipmentRepository::count_orphaned(pool).await? as u64,
            non_positive_transactions: TransactionRepository::count_non_positive(pool).await? as u64,
        });
    }

    Ok(CleanupReport {
        orphaned_sessions: SessionRepository::delete_orphaned(pool).await?,
        orphaned_parts: PartRepository::delete_orphaned(pool).await?,
        orphaned_transactions: TransactionRepository::delete_orphaned(pool).await?,
        orphaned_shipments: ShipmentRepository::delete_orphaned(pool).await?,
        non_positive_transactions: TransactionRepository::delete_non_positive(pool).await?,
    })
}

// endregion: --- Cleanup
