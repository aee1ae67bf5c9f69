//! # Transaction Handlers
//!
//! Thin wrappers over [`InventoryService`](crate::services::InventoryService),
//! which owns the status rules and the stock adjustments.

use axum::{
    extract::{Json, Path, State},
    http::StatusCode,
    Extension,
};
use lib_core::dto::DeletedResponse;
use lib_core::model::store::TransactionRepository;
use lib_core::model::{Transaction, TransactionForCreate, TransactionForUpdate};
use lib_core::AppError;

use crate::ctx::Ctx;
use crate::server::AppState;

pub async fn list(
    State(state): State<AppState>,
    Extension(ctx): Extension<Ctx>,
) -> Result<Json<Vec<Transaction>>, AppError> {
    let transactions = TransactionRepository::list(&state.db, ctx.scope()).await?;
    Ok(Json(transactions))
}

pub async fn get_one(
    State(state): State<AppState>,
    Extension(ctx): Extension<Ctx>,
    Path(id): Path<i64>,
) -> Result<Json<Transaction>, AppError> {
    Ok(Json(state.inventory.get_transaction(&ctx, id).await?))
}

pub async fn create(
    State(state): State<AppState>,
    Extension(ctx): Extension<Ctx>,
    Json(data): Json<TransactionForCreate>,
) -> Result<(StatusCode, Json<Transaction>), AppError> {
    let transaction = state.inventory.record_transaction(&ctx, data).await?;
    state.touched(ctx.user_id).await;
    Ok((StatusCode::CREATED, Json(transaction)))
}

pub async fn update(
    State(state): State<AppState>,
    Extension(ctx): Extension<Ctx>,
    Path(id): Path<i64>,
    Json(data): Json<TransactionForUpdate>,
) -> Result<Json<Transaction>, AppError> {
    let transaction = state.inventory.update_transaction(&ctx, id, data).await?;
    state.touched(ctx.user_id).await;
    Ok(Json(transaction))
}

pub async fn delete(
    State(state): State<AppState>,
    Extension(ctx): Extension<Ctx>,
    Path(id): Path<i64>,
) -> Result<Json<DeletedResponse>, AppError> {
    state.inventory.delete_transaction(&ctx, id).await?;
    state.touched(ctx.user_id).await;
    Ok(Json(DeletedResponse { id, deleted: true }))
}

/// `POST /api/transactions/{id}/complete`
pub async fn complete(
    State(state): State<AppState>,
    Extension(ctx): Extension<Ctx>,
    Path(id): Path<i64>,
) -> Result<Json<Transaction>, AppError> {
    let transaction = state.inventory.complete(&ctx, id).await?;
    state.touched(ctx.user_id).await;
    Ok(Json(transaction))
}
