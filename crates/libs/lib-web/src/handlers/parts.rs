//! # Part Handlers
//!
//! Inventory CRUD. Listing follows the caller's scope: admins see every
//! part, other roles see their own plus the shared system parts.

use axum::{
    extract::{Json, Path, State},
    http::StatusCode,
    Extension,
};
use lib_core::dto::DeletedResponse;
use lib_core::model::store::PartRepository;
use lib_core::model::{Part, PartForCreate, PartForUpdate};
use lib_core::AppError;
use tracing::{info, instrument};

use crate::ctx::Ctx;
use crate::server::AppState;

pub async fn list(
    State(state): State<AppState>,
    Extension(ctx): Extension<Ctx>,
) -> Result<Json<Vec<Part>>, AppError> {
    let parts = PartRepository::list(&state.db, ctx.scope()).await?;
    Ok(Json(parts))
}

pub async fn get_one(
    State(state): State<AppState>,
    Extension(ctx): Extension<Ctx>,
    Path(id): Path<i64>,
) -> Result<Json<Part>, AppError> {
    let part = load(&state, id).await?;
    ctx.ensure_read(part.user_id)?;
    Ok(Json(part))
}

#[instrument(skip(state, ctx, data), fields(user_id = ctx.user_id, part = %data.name))]
pub async fn create(
    State(state): State<AppState>,
    Extension(ctx): Extension<Ctx>,
    Json(data): Json<PartForCreate>,
) -> Result<(StatusCode, Json<Part>), AppError> {
    data.validate().map_err(AppError::InvalidInput)?;

    if PartRepository::find_by_name(&state.db, Some(ctx.user_id), data.name.trim())
        .await?
        .is_some()
    {
        return Err(AppError::Conflict(format!("Part '{}' already exists", data.name.trim())));
    }

    let part = PartRepository::create(&state.db, Some(ctx.user_id), data).await?;
    info!("[PARTS] created {} ({})", part.name, part.id);
    state.touched(ctx.user_id).await;

    Ok((StatusCode::CREATED, Json(part)))
}

pub async fn update(
    State(state): State<AppState>,
    Extension(ctx): Extension<Ctx>,
    Path(id): Path<i64>,
    Json(data): Json<PartForUpdate>,
) -> Result<Json<Part>, AppError> {
    data.validate().map_err(AppError::InvalidInput)?;
    ctx.ensure_write(load(&state, id).await?.user_id)?;

    let part = PartRepository::update(&state.db, id, data)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Part {} not found", id)))?;
    state.touched(ctx.user_id).await;

    Ok(Json(part))
}

pub async fn delete(
    State(state): State<AppState>,
    Extension(ctx): Extension<Ctx>,
    Path(id): Path<i64>,
) -> Result<Json<DeletedResponse>, AppError> {
    ctx.ensure_write(load(&state, id).await?.user_id)?;

    PartRepository::delete(&state.db, id).await?;
    info!("[PARTS] {} deleted part {}", ctx.name, id);
    state.touched(ctx.user_id).await;

    Ok(Json(DeletedResponse { id, deleted: true }))
}

async fn load(state: &AppState, id: i64) -> Result<Part, AppError> {
    PartRepository::get(&state.db, id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Part {} not found", id)))
}
