//! # Wallet Handlers
//!
//! Connection state is kept in the caller's session. With a JSON-RPC
//! provider configured the account comes from the provider; without one,
//! `connect` accepts the address the client reports.
//!
//! A connected address is also stored on the user record so chain writes
//! can fall back to it after a restart.

use axum::{
    extract::{Json, State},
    Extension,
};
use chrono::{DateTime, Utc};
use lib_chain::{abi, ProviderInfo, WalletInfo, WalletState};
use lib_core::dto::{SignMessageRequest, WalletConnectRequest};
use lib_core::model::store::UserRepository;
use lib_core::model::UserForUpdate;
use lib_core::AppError;
use serde::Serialize;
use serde_json::{json, Value};
use tracing::{info, instrument};

use crate::ctx::Ctx;
use crate::server::AppState;

#[derive(Debug, Serialize)]
pub struct WalletStatus {
    pub address: Option<String>,
    pub connected: bool,
    pub manually_disconnected: bool,
    pub connected_at: Option<DateTime<Utc>>,
}

impl From<&WalletState> for WalletStatus {
    fn from(state: &WalletState) -> Self {
        Self {
            address: state.address.clone(),
            connected: state.is_connected(),
            manually_disconnected: state.manually_disconnected,
            connected_at: state.connected_at,
        }
    }
}

#[instrument(skip(state, ctx, req), fields(user_id = ctx.user_id))]
pub async fn connect(
    State(state): State<AppState>,
    Extension(ctx): Extension<Ctx>,
    Json(req): Json<WalletConnectRequest>,
) -> Result<Json<WalletStatus>, AppError> {
    let mut wallet = state.sessions.get_or_start(&ctx).await?.wallet;

    let address = match state.wallet {
        Some(ref client) => client.connect(&mut wallet, req.address.as_deref()).await?,
        None => {
            let address = req.address.ok_or_else(|| {
                AppError::InvalidInput("No wallet provider configured; send the account address".to_string())
            })?;
            abi::parse_address(&address).map_err(|e| AppError::InvalidInput(e.to_string()))?;
            wallet.attach(&address);
            address.to_lowercase()
        }
    };

    ensure_wallet_free(&state, ctx.user_id, &address).await?;
    UserRepository::update(&state.db, ctx.user_id, UserForUpdate::new().wallet_address(address.clone()))
        .await?;

    state.sessions.set_wallet(ctx.user_id, wallet.clone()).await;
    info!("[WALLET] user {} connected {}", ctx.user_id, address);

    Ok(Json(WalletStatus::from(&wallet)))
}

/// Silent reconnect on page load. Does nothing after a manual disconnect.
pub async fn reconnect(
    State(state): State<AppState>,
    Extension(ctx): Extension<Ctx>,
) -> Result<Json<WalletStatus>, AppError> {
    let mut wallet = state.sessions.get_or_start(&ctx).await?.wallet;

    match state.wallet {
        Some(ref client) => {
            if let Some(address) = client.reconnect_if_authorized(&mut wallet).await? {
                ensure_wallet_free(&state, ctx.user_id, &address).await?;
            }
        }
        None if !wallet.manually_disconnected && !wallet.is_connected() => {
            let stored = UserRepository::find_by_id(&state.db, ctx.user_id)
                .await?
                .and_then(|user| user.wallet_address);
            if let Some(address) = stored {
                wallet.attach(&address);
            }
        }
        None => {}
    }

    state.sessions.set_wallet(ctx.user_id, wallet.clone()).await;
    Ok(Json(WalletStatus::from(&wallet)))
}

/// An address stored on one user record cannot be attached to another.
async fn ensure_wallet_free(state: &AppState, user_id: i64, address: &str) -> Result<(), AppError> {
    if let Some(owner) = UserRepository::find_by_wallet(&state.db, address).await? {
        if owner.id != user_id {
            return Err(AppError::Conflict("Wallet is linked to another account".to_string()));
        }
    }
    Ok(())
}

pub async fn disconnect(
    State(state): State<AppState>,
    Extension(ctx): Extension<Ctx>,
) -> Result<Json<WalletStatus>, AppError> {
    let mut wallet = state.sessions.get_or_start(&ctx).await?.wallet;

    match state.wallet {
        Some(ref client) => client.disconnect(&mut wallet),
        None => wallet.detach(),
    }

    state.sessions.set_wallet(ctx.user_id, wallet.clone()).await;
    info!("[WALLET] user {} disconnected", ctx.user_id);
    Ok(Json(WalletStatus::from(&wallet)))
}

/// Whether a wallet provider answers at the configured endpoint.
pub async fn provider(State(state): State<AppState>) -> Json<ProviderInfo> {
    let info = match state.wallet {
        Some(ref client) => client.detect().await,
        None => ProviderInfo {
            available: false,
            client_version: None,
            endpoint: String::new(),
        },
    };
    Json(info)
}

/// Balance and network of the connected account.
pub async fn info(
    State(state): State<AppState>,
    Extension(ctx): Extension<Ctx>,
) -> Result<Json<WalletInfo>, AppError> {
    let client = state
        .wallet
        .as_ref()
        .ok_or_else(|| AppError::Config("No wallet provider configured".to_string()))?;
    let address = connected_address(&state, &ctx).await?;

    Ok(Json(client.get_wallet_info(&address).await?))
}

pub async fn sign(
    State(state): State<AppState>,
    Extension(ctx): Extension<Ctx>,
    Json(req): Json<SignMessageRequest>,
) -> Result<Json<Value>, AppError> {
    if req.message.is_empty() {
        return Err(AppError::InvalidInput("message cannot be empty".to_string()));
    }
    let client = state
        .wallet
        .as_ref()
        .ok_or_else(|| AppError::Config("No wallet provider configured".to_string()))?;
    let address = connected_address(&state, &ctx).await?;

    let signature = client.sign_message(&address, &req.message).await?;
    Ok(Json(json!({ "address": address, "signature": signature })))
}

async fn connected_address(state: &AppState, ctx: &Ctx) -> Result<String, AppError> {
    state
        .sessions
        .wallet(ctx.user_id)
        .await
        .and_then(|w| w.address)
        .ok_or_else(|| AppError::InvalidInput("No wallet connected".to_string()))
}
