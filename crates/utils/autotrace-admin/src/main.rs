//! # AutoTrace Admin Utility
//!
//! Maintenance commands run directly against the database named by
//! `DATABASE_URL` (default `sqlite:data/autotrace.db`).
//!
//! ## Usage
//!
//! ```bash
//! cargo run --package autotrace-admin -- stats
//! cargo run --package autotrace-admin -- list-users --role supplier
//! cargo run --package autotrace-admin -- create-user --email ada@example.com --name Ada --password '...' --role admin --admin true
//! cargo run --package autotrace-admin -- cleanup --dry-run
//! ```
//!
//! `delete-user` asks for confirmation unless `--yes` is given.

mod commands;

use std::io::{self, Write};

use anyhow::Context;
use clap::{Parser, Subcommand};
use lib_core::{create_pool, run_migrations};

use commands::{
    CleanupArgs, CreateUserArgs, DeleteUserArgs, ListUsersArgs, ResetPasswordArgs, UpdateUserArgs,
};

#[derive(Parser)]
#[command(name = "autotrace-admin", about = "AutoTrace database administration", version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Record counts per collection and users per role
    Stats,
    /// List users, newest first
    ListUsers(ListUsersArgs),
    /// Delete a user and their session snapshot
    DeleteUser(DeleteUserArgs),
    /// Change a user's details
    UpdateUser(UpdateUserArgs),
    /// Create a user, including admins
    CreateUser(CreateUserArgs),
    /// Remove orphaned rows and non-positive transactions
    Cleanup(CleanupArgs),
    /// Set a new password for a user
    ResetPassword(ResetPasswordArgs),
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let database_url = lib_utils::get_env_or("DATABASE_URL", "sqlite:data/autotrace.db");
    let pool = create_pool(&database_url)
        .await
        .with_context(|| format!("failed to open {}", database_url))?;
    run_migrations(&pool).await?;

    match cli.command {
        Commands::Stats => {
            let stats = commands::stats(&pool).await?;
            println!("{}", stats);
        }
        Commands::ListUsers(args) => {
            let users = commands::list_users(&pool, &args).await?;
            if users.is_empty() {
                println!("No users found.");
            }
            for user in users {
                println!(
                    "{:>4}  {:<28} {:<20} {:<12} admin={:<5} active={:<5} wallet={}",
                    user.id,
                    user.email,
                    user.name,
                    user.role,
                    user.is_admin,
                    user.is_active,
                    user.wallet_address.as_deref().unwrap_or("-")
                );
            }
        }
        Commands::DeleteUser(args) => {
            if !args.yes && !confirm(&format!("Delete {} and their session snapshot?", args.email))? {
                println!("Operation cancelled.");
                return Ok(());
            }
            commands::delete_user(&pool, &args.email).await?;
            println!("Deleted {}.", args.email);
        }
        Commands::UpdateUser(args) => {
            let user = commands::update_user(&pool, args).await?;
            println!("Updated {} (role {}, admin {}, active {}).", user.email, user.role, user.is_admin, user.is_active);
        }
        Commands::CreateUser(args) => {
            let user = commands::create_user(&pool, args).await?;
            println!("Created {} (id {}, role {}, admin {}).", user.email, user.id, user.role, user.is_admin);
        }
        Commands::Cleanup(args) => {
            let report = commands::cleanup(&pool, args.dry_run).await?;
            if args.dry_run {
                println!("Dry run, nothing deleted:");
            }
            println!("{}", report);
        }
        Commands::ResetPassword(args) => {
            let generated = args.password.is_none();
            let password = commands::reset_password(&pool, &args.email, args.password).await?;
            println!("Password reset for {}.", args.email);
            if generated {
                println!("Temporary password: {}", password);
            }
        }
    }

    Ok(())
}

fn confirm(question: &str) -> anyhow::Result<bool> {
    print!("{} (yes/no): ", question);
    io::stdout().flush()?;

    let mut answer = String::new();
    io::stdin().read_line(&mut answer)?;
    let answer = answer.trim().to_lowercase();
    Ok(answer == "yes" || answer == "y")
}
