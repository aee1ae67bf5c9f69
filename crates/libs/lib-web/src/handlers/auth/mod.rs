//! # Authentication Handlers
//!
//! Email/password signup and login issuing JWT session tokens, and logout.
//!
//! Login starts the caller's session in the [`SessionStore`](crate::services::SessionStore);
//! logout tears it down, which flushes the snapshot for non-admin users.

use axum::{
    extract::{Json, State},
    http::StatusCode,
    Extension,
};
use lib_auth::{encode_jwt, hash_password, verify_password};
use lib_core::dto::{AuthResponse, LoginRequest, SignupRequest, UserInfo};
use lib_core::model::store::models::validate_new_user;
use lib_core::model::store::UserRepository;
use lib_core::model::{Role, User, UserForCreate};
use lib_core::AppError;
use serde_json::{json, Value};
use tracing::{debug, info, instrument, warn};

use crate::ctx::Ctx;
use crate::server::AppState;

/// Signup handler: creates a non-admin account and logs it in.
///
/// # Validation
///
/// - Name must not be empty
/// - Email must be well-formed and unique
/// - Password must be at least 8 characters
/// - The `admin` role cannot be self-assigned
#[instrument(skip(state, req), fields(email = %req.email, role = %req.role))]
pub async fn signup(
    State(state): State<AppState>,
    Json(req): Json<SignupRequest>,
) -> Result<(StatusCode, Json<AuthResponse>), AppError> {
    info!("[SIGNUP] New signup request");

    validate_new_user(&req.name, &req.email).map_err(AppError::InvalidInput)?;

    if req.role == Role::Admin {
        warn!("[SIGNUP] Rejected self-assigned admin role");
        return Err(AppError::Forbidden(
            "Admin accounts are created by an administrator".to_string(),
        ));
    }

    if UserRepository::find_by_email(&state.db, &req.email).await?.is_some() {
        warn!("[SIGNUP] Email already registered: {}", req.email);
        return Err(AppError::Conflict("Email already registered".to_string()));
    }

    debug!("[SIGNUP] Hashing password...");
    let password_hash = hash_password(&req.password).map_err(AppError::InvalidInput)?;

    let user = UserRepository::create(
        &state.db,
        UserForCreate::new(req.name.trim().to_string(), req.email, password_hash, req.role),
    )
    .await?;

    let token = issue_token(&state, &user)?;
    state.sessions.start(&ctx_for(&user)).await?;

    info!("[SIGNUP] User created: {} (id: {})", user.email, user.id);
    Ok((
        StatusCode::CREATED,
        Json(AuthResponse {
            user: UserInfo::from(&user),
            token,
            message: "Account created".to_string(),
        }),
    ))
}

/// Login handler: verifies credentials, stamps `last_login` and starts the session.
#[instrument(skip(state, req), fields(email = %req.email))]
pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<AuthResponse>, AppError> {
    info!("[LOGIN] Login attempt");

    let invalid = || AppError::Unauthorized("Invalid email or password".to_string());

    let user = UserRepository::find_by_email(&state.db, &req.email)
        .await?
        .ok_or_else(|| {
            warn!("[LOGIN] Unknown email: {}", req.email);
            invalid()
        })?;

    if !verify_password(&req.password, &user.password_hash).map_err(AppError::Internal)? {
        warn!("[LOGIN] Wrong password for {}", req.email);
        return Err(invalid());
    }

    if !user.is_active {
        warn!("[LOGIN] Disabled account: {}", req.email);
        return Err(AppError::Forbidden("Account is disabled".to_string()));
    }

    UserRepository::update_last_login(&state.db, user.id).await?;
    let token = issue_token(&state, &user)?;
    state.sessions.start(&ctx_for(&user)).await?;

    info!("[LOGIN] {} logged in as {}", user.email, user.role);
    Ok(Json(AuthResponse {
        user: UserInfo::from(&user),
        token,
        message: "Login successful".to_string(),
    }))
}

/// Logout handler: ends the caller's session.
pub async fn logout(
    State(state): State<AppState>,
    Extension(ctx): Extension<Ctx>,
) -> Result<Json<Value>, AppError> {
    let ended = state.sessions.end(ctx.user_id).await?;
    info!("[LOGOUT] user {} (session active: {})", ctx.user_id, ended);

    Ok(Json(json!({ "message": "Logged out", "session_ended": ended })))
}

fn issue_token(state: &AppState, user: &User) -> Result<String, AppError> {
    encode_jwt(
        user.id,
        user.name.clone(),
        user.role.as_str(),
        user.is_admin,
        &state.config.jwt_secret,
        state.config.jwt_expiration_hours,
    )
    .map_err(AppError::Internal)
}

fn ctx_for(user: &User) -> Ctx {
    Ctx {
        user_id: user.id,
        name: user.name.clone(),
        role: user.role,
        is_admin: user.is_admin,
    }
}

#[cfg(test)]
mod tests;
