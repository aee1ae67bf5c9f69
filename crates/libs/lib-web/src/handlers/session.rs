//! Session context endpoints.

use axum::{
    extract::{Json, State},
    Extension,
};
use lib_core::AppError;

use crate::ctx::Ctx;
use crate::server::AppState;
use crate::services::SessionContext;

/// The caller's session, started on demand when the server restarted since login.
pub async fn get_session(
    State(state): State<AppState>,
    Extension(ctx): Extension<Ctx>,
) -> Result<Json<SessionContext>, AppError> {
    Ok(Json(state.sessions.get_or_start(&ctx).await?))
}

/// Reload the collections and persist the snapshot now, skipping the debounce.
pub async fn sync(
    State(state): State<AppState>,
    Extension(ctx): Extension<Ctx>,
) -> Result<Json<SessionContext>, AppError> {
    state.sessions.get_or_start(&ctx).await?;
    let context = state
        .sessions
        .sync_now(ctx.user_id)
        .await?
        .ok_or_else(|| AppError::NotFound("No active session".to_string()))?;
    Ok(Json(context))
}
