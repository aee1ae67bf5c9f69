//! # Admin Handlers
//!
//! Approval queue and system-wide reporting. Mounted behind `require_admin`.

use axum::{
    extract::{Json, Path, State},
    Extension,
};
use lib_core::dto::RejectRequest;
use lib_core::model::Transaction;
use lib_core::report::{admin_summary, AdminSummary};
use lib_core::{AppError, Dataset, Scope};

use crate::ctx::Ctx;
use crate::server::AppState;

pub async fn approve(
    State(state): State<AppState>,
    Extension(ctx): Extension<Ctx>,
    Path(id): Path<i64>,
) -> Result<Json<Transaction>, AppError> {
    let transaction = state.inventory.approve(&ctx, id).await?;
    state.touched(ctx.user_id).await;
    Ok(Json(transaction))
}

pub async fn reject(
    State(state): State<AppState>,
    Extension(ctx): Extension<Ctx>,
    Path(id): Path<i64>,
    Json(req): Json<RejectRequest>,
) -> Result<Json<Transaction>, AppError> {
    let transaction = state.inventory.reject(&ctx, id, req.reason).await?;
    state.touched(ctx.user_id).await;
    Ok(Json(transaction))
}

pub async fn summary(State(state): State<AppState>) -> Result<Json<AdminSummary>, AppError> {
    let dataset = state.data.dataset(Scope::System).await?;
    Ok(Json(admin_summary(&dataset)))
}

/// Every collection across all users.
pub async fn dataset(State(state): State<AppState>) -> Result<Json<Dataset>, AppError> {
    Ok(Json(state.data.dataset(Scope::System).await?))
}
