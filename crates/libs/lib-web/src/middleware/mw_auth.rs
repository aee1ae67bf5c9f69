//! # Authentication Middleware
//!
//! Validates the `Authorization: Bearer <token>` header against the JWT
//! secret held in [`AppState`] and stores the caller's [`Ctx`] in the
//! request extensions. Handlers pick it up with `Extension<Ctx>`.
//!
//! [`require_admin`] runs after [`require_auth`] on admin-only routes.

use axum::{
    extract::{Request, State},
    http::header::AUTHORIZATION,
    middleware::Next,
    response::Response,
};
use lib_auth::decode_jwt;
use lib_core::AppError;
use tracing::{debug, warn};

use crate::ctx::Ctx;
use crate::server::AppState;

pub async fn require_auth(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let auth_header = req
        .headers()
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .ok_or_else(|| {
            warn!("[AUTH] Missing Authorization header");
            AppError::Unauthorized("Missing Authorization header".to_string())
        })?;

    let token = auth_header.strip_prefix("Bearer ").ok_or_else(|| {
        warn!("[AUTH] Invalid Authorization header format");
        AppError::Unauthorized("Expected a Bearer token".to_string())
    })?;

    let claims = decode_jwt(token, &state.config.jwt_secret).map_err(|e| {
        warn!("[AUTH] JWT validation failed: {}", e);
        AppError::Unauthorized("Invalid or expired token".to_string())
    })?;

    let ctx = Ctx::from_claims(&claims)?;
    debug!("[AUTH] Authenticated {} (id: {}, role: {})", ctx.name, ctx.user_id, ctx.role);

    req.extensions_mut().insert(ctx);
    Ok(next.run(req).await)
}

pub async fn require_admin(req: Request, next: Next) -> Result<Response, AppError> {
    let ctx = req
        .extensions()
        .get::<Ctx>()
        .ok_or_else(|| AppError::Unauthorized("Authentication required".to_string()))?;

    if !ctx.is_admin {
        warn!("[AUTH] {} (id: {}) denied admin route {}", ctx.name, ctx.user_id, req.uri().path());
        return Err(AppError::Forbidden("Admin access required".to_string()));
    }

    Ok(next.run(req).await)
}
