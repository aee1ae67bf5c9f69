//! # HTTP Request Handlers
//!
//! Axum handlers grouped by feature area. Handlers extract the caller's
//! [`Ctx`](crate::ctx::Ctx) from the request extensions, delegate to the
//! services in [`crate::services`] or to the repositories directly for plain
//! CRUD, and answer with `Result<Json<T>, AppError>`.
//!
//! - [`auth`]: signup, login, logout
//! - [`users`]: admin user management
//! - [`parts`], [`transactions`], [`vendors`], [`shipments`]: inventory records
//! - [`orders`]: on-chain orders and entity registration
//! - [`wallet`]: wallet connection, balance and signing
//! - [`session`]: the caller's session context
//! - [`reports`]: dashboard, CSV export, discrepancy report
//! - [`admin`]: approvals, system summary and dataset
//!
//! Every write calls [`AppState::touched`] so cached datasets are dropped
//! and the caller's session is re-synced.

use axum::extract::State;
use axum::Json;
use lib_core::AppError;
use serde_json::{json, Value};

use crate::server::AppState;

pub mod admin;
pub mod auth;
pub mod orders;
pub mod parts;
pub mod reports;
pub mod session;
pub mod shipments;
pub mod transactions;
pub mod users;
pub mod vendors;
pub mod wallet;

#[cfg(test)]
mod tests;

pub async fn health(State(state): State<AppState>) -> Json<Value> {
    Json(json!({
        "status": "ok",
        "chain_mode": state.config.chain.mode.to_string(),
        "active_sessions": state.sessions.active_count().await,
    }))
}

pub async fn not_found() -> AppError {
    AppError::NotFound("Route not found".to_string())
}
