//! # Vendor Handlers
//!
//! Vendors and customers are a shared directory: every authenticated user
//! reads and maintains the same list.

use axum::{
    extract::{Json, Path, Query, State},
    http::StatusCode,
    Extension,
};
use lib_core::dto::{DeletedResponse, VendorRoleQuery};
use lib_core::model::store::VendorRepository;
use lib_core::model::{Vendor, VendorForCreate, VendorForUpdate};
use lib_core::report::{filter_for_role, partition_for_role, VendorPartition};
use lib_core::AppError;
use serde::Serialize;
use tracing::info;

use crate::ctx::Ctx;
use crate::server::AppState;

pub async fn list(State(state): State<AppState>) -> Result<Json<Vec<Vendor>>, AppError> {
    Ok(Json(VendorRepository::list(&state.db).await?))
}

pub async fn get_one(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<Vendor>, AppError> {
    let vendor = VendorRepository::get(&state.db, id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Vendor {} not found", id)))?;
    Ok(Json(vendor))
}

pub async fn create(
    State(state): State<AppState>,
    Extension(ctx): Extension<Ctx>,
    Json(data): Json<VendorForCreate>,
) -> Result<(StatusCode, Json<Vendor>), AppError> {
    data.validate().map_err(AppError::InvalidInput)?;

    let vendor = VendorRepository::create(&state.db, data).await?;
    info!("[VENDORS] {} added {} ({})", ctx.name, vendor.name, vendor.relationship_type);
    state.touched(ctx.user_id).await;

    Ok((StatusCode::CREATED, Json(vendor)))
}

pub async fn update(
    State(state): State<AppState>,
    Extension(ctx): Extension<Ctx>,
    Path(id): Path<i64>,
    Json(data): Json<VendorForUpdate>,
) -> Result<Json<Vendor>, AppError> {
    data.validate().map_err(AppError::InvalidInput)?;

    let vendor = VendorRepository::update(&state.db, id, data)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Vendor {} not found", id)))?;
    state.touched(ctx.user_id).await;

    Ok(Json(vendor))
}

pub async fn delete(
    State(state): State<AppState>,
    Extension(ctx): Extension<Ctx>,
    Path(id): Path<i64>,
) -> Result<Json<DeletedResponse>, AppError> {
    if !VendorRepository::delete(&state.db, id).await? {
        return Err(AppError::NotFound(format!("Vendor {} not found", id)));
    }
    state.touched(ctx.user_id).await;
    Ok(Json(DeletedResponse { id, deleted: true }))
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum VendorsForRole {
    Filtered(Vec<Vendor>),
    Partitioned(VendorPartition),
}

/// `GET /api/vendors/for-role?role=&relationship=`
///
/// Without `relationship` the matches come back split into vendors and
/// customers. The role defaults to the caller's.
pub async fn for_role(
    State(state): State<AppState>,
    Extension(ctx): Extension<Ctx>,
    Query(query): Query<VendorRoleQuery>,
) -> Result<Json<VendorsForRole>, AppError> {
    let role = query.role.unwrap_or(ctx.role);
    let dataset = state.data.dataset(ctx.scope()).await?;

    let body = match query.relationship {
        Some(relationship) => {
            VendorsForRole::Filtered(filter_for_role(&dataset.vendors, role, Some(relationship)))
        }
        None => VendorsForRole::Partitioned(partition_for_role(&dataset.vendors, role)),
    };
    Ok(Json(body))
}
