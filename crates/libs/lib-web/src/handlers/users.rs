//! # User Management Handlers (admin only)

use axum::{
    extract::{Json, Path, Query, State},
    http::StatusCode,
    Extension,
};
use lib_auth::hash_password;
use lib_core::dto::{CreateUserRequest, DeletedResponse, UpdateUserRequest, UserInfo};
use lib_core::model::store::models::validate_new_user;
use lib_core::model::store::UserRepository;
use lib_core::model::{Role, UserForCreate, UserForUpdate};
use lib_core::AppError;
use serde::Deserialize;
use tracing::info;

use crate::ctx::Ctx;
use crate::server::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct UserListQuery {
    pub role: Option<Role>,
    pub limit: Option<i64>,
}

pub async fn list(
    State(state): State<AppState>,
    Query(query): Query<UserListQuery>,
) -> Result<Json<Vec<UserInfo>>, AppError> {
    let users = UserRepository::list(&state.db, query.role, query.limit).await?;
    Ok(Json(users.iter().map(UserInfo::from).collect()))
}

pub async fn get_one(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<UserInfo>, AppError> {
    let user = UserRepository::find_by_id(&state.db, id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("User {} not found", id)))?;
    Ok(Json(UserInfo::from(&user)))
}

pub async fn create(
    State(state): State<AppState>,
    Extension(ctx): Extension<Ctx>,
    Json(req): Json<CreateUserRequest>,
) -> Result<(StatusCode, Json<UserInfo>), AppError> {
    validate_new_user(&req.name, &req.email).map_err(AppError::InvalidInput)?;

    if UserRepository::find_by_email(&state.db, &req.email).await?.is_some() {
        return Err(AppError::Conflict("Email already registered".to_string()));
    }

    let password_hash = hash_password(&req.password).map_err(AppError::InvalidInput)?;
    let mut data = UserForCreate::new(req.name.trim().to_string(), req.email, password_hash, req.role);
    if let Some(is_admin) = req.is_admin {
        data = data.admin(is_admin);
    }

    let user = UserRepository::create(&state.db, data).await?;
    info!("[USERS] {} created user {} ({})", ctx.name, user.email, user.role);

    Ok((StatusCode::CREATED, Json(UserInfo::from(&user))))
}

pub async fn update(
    State(state): State<AppState>,
    Extension(ctx): Extension<Ctx>,
    Path(id): Path<i64>,
    Json(req): Json<UpdateUserRequest>,
) -> Result<Json<UserInfo>, AppError> {
    let mut changes = UserForUpdate::new();
    if let Some(name) = req.name {
        lib_utils::validate_not_empty(&name, "Name").map_err(AppError::InvalidInput)?;
        changes = changes.name(name);
    }
    if let Some(email) = req.email {
        lib_utils::validate_email(&email).map_err(AppError::InvalidInput)?;
        changes = changes.email(email);
    }
    if let Some(password) = req.password {
        changes = changes.password_hash(hash_password(&password).map_err(AppError::InvalidInput)?);
    }
    if let Some(role) = req.role {
        changes = changes.role(role);
    }
    if let Some(is_admin) = req.is_admin {
        if id == ctx.user_id && !is_admin {
            return Err(AppError::Conflict("Admins cannot revoke their own admin flag".to_string()));
        }
        changes = changes.is_admin(is_admin);
    }
    if let Some(is_active) = req.is_active {
        changes = changes.is_active(is_active);
    }
    if let Some(wallet) = req.wallet_address {
        lib_utils::validate_eth_address(&wallet).map_err(AppError::InvalidInput)?;
        changes = changes.wallet_address(wallet);
    }

    if changes.is_empty() {
        return Err(AppError::InvalidInput("No fields to update".to_string()));
    }

    let user = UserRepository::update(&state.db, id, changes).await?;
    info!("[USERS] {} updated user {}", ctx.name, id);
    Ok(Json(UserInfo::from(&user)))
}

pub async fn delete(
    State(state): State<AppState>,
    Extension(ctx): Extension<Ctx>,
    Path(id): Path<i64>,
) -> Result<Json<DeletedResponse>, AppError> {
    if id == ctx.user_id {
        return Err(AppError::Conflict("Admins cannot delete their own account".to_string()));
    }

    if !UserRepository::delete(&state.db, id).await? {
        return Err(AppError::NotFound(format!("User {} not found", id)));
    }
    state.sessions.end(id).await?;
    info!("[USERS] {} deleted user {}", ctx.name, id);

    Ok(Json(DeletedResponse { id, deleted: true }))
}
