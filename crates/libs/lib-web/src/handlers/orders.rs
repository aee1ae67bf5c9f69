//! # Chain Order Handlers
//!
//! Orders and entities on the external contract. Every response carries a
//! `source` of `chain` or `simulated`, plus a `note` when a fallback
//! replaced a failed call.

use axum::{
    extract::{Json, Path, Query, State},
    http::StatusCode,
    Extension,
};
use lib_chain::{abi, CountRead, EntityRead, OrderRead, OrderReceipt};
use lib_core::dto::{CreateOrderRequest, OrderQuery, RegisterEntityRequest};
use lib_core::AppError;
use tracing::instrument;

use crate::ctx::Ctx;
use crate::server::AppState;
use crate::services::ChainShipments;

#[instrument(skip(state, ctx, req), fields(user_id = ctx.user_id))]
pub async fn create(
    State(state): State<AppState>,
    Extension(ctx): Extension<Ctx>,
    Json(req): Json<CreateOrderRequest>,
) -> Result<(StatusCode, Json<OrderReceipt>), AppError> {
    let linked = req.transaction_id.is_some();
    let receipt = state.orders.create_order(&ctx, req).await?;
    if linked {
        state.touched(ctx.user_id).await;
    }
    Ok((StatusCode::CREATED, Json(receipt)))
}

pub async fn get_one(
    State(state): State<AppState>,
    Extension(ctx): Extension<Ctx>,
    Path(order_id): Path<u64>,
    Query(query): Query<OrderQuery>,
) -> Result<Json<OrderRead>, AppError> {
    let viewer = state.orders.viewer(&ctx, query.viewer).await;
    let read = state.orders.chain().get_order(order_id, viewer.as_deref()).await?;
    Ok(Json(read))
}

pub async fn count(State(state): State<AppState>) -> Result<Json<CountRead>, AppError> {
    Ok(Json(state.orders.chain().get_order_count().await?))
}

/// `GET /api/orders/shipments?viewer=`
///
/// Recent orders involving the viewer (default: the session wallet), shaped
/// as shipments.
pub async fn shipments(
    State(state): State<AppState>,
    Extension(ctx): Extension<Ctx>,
    Query(query): Query<OrderQuery>,
) -> Result<Json<ChainShipments>, AppError> {
    let viewer = state.orders.viewer(&ctx, query.viewer).await;
    Ok(Json(state.orders.chain_shipments(viewer).await?))
}

pub async fn approve(
    State(state): State<AppState>,
    Extension(ctx): Extension<Ctx>,
    Path(order_id): Path<u64>,
) -> Result<Json<OrderReceipt>, AppError> {
    Ok(Json(state.orders.approve_order(&ctx, order_id).await?))
}

pub async fn complete(
    State(state): State<AppState>,
    Extension(ctx): Extension<Ctx>,
    Path(order_id): Path<u64>,
) -> Result<Json<OrderReceipt>, AppError> {
    Ok(Json(state.orders.complete_order(&ctx, order_id).await?))
}

pub async fn register_entity(
    State(state): State<AppState>,
    Extension(ctx): Extension<Ctx>,
    Json(req): Json<RegisterEntityRequest>,
) -> Result<(StatusCode, Json<OrderReceipt>), AppError> {
    let receipt = state.orders.register_entity(&ctx, req).await?;
    Ok((StatusCode::CREATED, Json(receipt)))
}

pub async fn get_entity(
    State(state): State<AppState>,
    Path(address): Path<String>,
) -> Result<Json<EntityRead>, AppError> {
    abi::parse_address(&address).map_err(|e| AppError::InvalidInput(e.to_string()))?;
    Ok(Json(state.orders.chain().get_entity(&address).await?))
}
