//! # Shipment Handlers

use axum::{
    extract::{Json, Path, State},
    http::StatusCode,
    Extension,
};
use lib_core::dto::{DeletedResponse, ShipmentStatusRequest};
use lib_core::model::store::ShipmentRepository;
use lib_core::model::{Shipment, ShipmentForCreate, ShipmentForUpdate};
use lib_core::AppError;
use tracing::info;

use crate::ctx::Ctx;
use crate::server::AppState;

pub async fn list(
    State(state): State<AppState>,
    Extension(ctx): Extension<Ctx>,
) -> Result<Json<Vec<Shipment>>, AppError> {
    Ok(Json(ShipmentRepository::list(&state.db, ctx.scope()).await?))
}

pub async fn get_one(
    State(state): State<AppState>,
    Extension(ctx): Extension<Ctx>,
    Path(id): Path<i64>,
) -> Result<Json<Shipment>, AppError> {
    let shipment = load(&state, id).await?;
    ctx.ensure_read(shipment.user_id)?;
    Ok(Json(shipment))
}

pub async fn create(
    State(state): State<AppState>,
    Extension(ctx): Extension<Ctx>,
    Json(data): Json<ShipmentForCreate>,
) -> Result<(StatusCode, Json<Shipment>), AppError> {
    data.validate().map_err(AppError::InvalidInput)?;

    let shipment = ShipmentRepository::create(&state.db, Some(ctx.user_id), data).await?;
    info!(
        "[SHIPMENT] {} created: {} x{} {} -> {}",
        shipment.id, shipment.part_name, shipment.quantity, shipment.from_party, shipment.to_party
    );
    state.touched(ctx.user_id).await;

    Ok((StatusCode::CREATED, Json(shipment)))
}

/// Edit shipment details. Status moves go through [`set_status`] so the
/// history and stock stay consistent.
pub async fn update(
    State(state): State<AppState>,
    Extension(ctx): Extension<Ctx>,
    Path(id): Path<i64>,
    Json(data): Json<ShipmentForUpdate>,
) -> Result<Json<Shipment>, AppError> {
    ctx.ensure_write(load(&state, id).await?.user_id)?;

    let shipment = ShipmentRepository::update(&state.db, id, data)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Shipment {} not found", id)))?;
    state.touched(ctx.user_id).await;

    Ok(Json(shipment))
}

pub async fn delete(
    State(state): State<AppState>,
    Extension(ctx): Extension<Ctx>,
    Path(id): Path<i64>,
) -> Result<Json<DeletedResponse>, AppError> {
    ctx.ensure_write(load(&state, id).await?.user_id)?;

    ShipmentRepository::delete(&state.db, id).await?;
    state.touched(ctx.user_id).await;
    Ok(Json(DeletedResponse { id, deleted: true }))
}

/// `POST /api/shipments/{id}/status`
pub async fn set_status(
    State(state): State<AppState>,
    Extension(ctx): Extension<Ctx>,
    Path(id): Path<i64>,
    Json(req): Json<ShipmentStatusRequest>,
) -> Result<Json<Shipment>, AppError> {
    let shipment = state
        .inventory
        .set_shipment_status(&ctx, id, req.status, req.note)
        .await?;
    state.touched(ctx.user_id).await;
    Ok(Json(shipment))
}

async fn load(state: &AppState, id: i64) -> Result<Shipment, AppError> {
    ShipmentRepository::get(&state.db, id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Shipment {} not found", id)))
}
