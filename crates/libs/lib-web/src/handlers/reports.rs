//! # Reporting Handlers
//!
//! Dashboards, CSV exports and the discrepancy report, all computed from the
//! caller's cached dataset. Responses carry the dataset `source` so clients
//! can tell demo data from live data.

use axum::{
    extract::{Json, Path, State},
    http::header,
    response::{IntoResponse, Response},
    Extension,
};
use lib_core::model::Role;
use lib_core::report::{build_dashboard, find_discrepancies, to_csv, Dashboard, DiscrepancyReport};
use lib_core::AppError;
use tracing::info;

use crate::ctx::Ctx;
use crate::server::AppState;

pub async fn dashboard(
    State(state): State<AppState>,
    Extension(ctx): Extension<Ctx>,
) -> Result<Json<Dashboard>, AppError> {
    let dataset = state.data.dataset(ctx.scope()).await?;
    let role = if ctx.is_admin { Role::Admin } else { ctx.role };
    Ok(Json(build_dashboard(&dataset, role)))
}

pub async fn discrepancies(
    State(state): State<AppState>,
    Extension(ctx): Extension<Ctx>,
) -> Result<Json<DiscrepancyReport>, AppError> {
    let dataset = state.data.dataset(ctx.scope()).await?;
    Ok(Json(find_discrepancies(&dataset)))
}

/// `GET /api/reports/{kind}.csv` for parts, transactions, shipments or vendors.
pub async fn export_csv(
    State(state): State<AppState>,
    Extension(ctx): Extension<Ctx>,
    Path(file): Path<String>,
) -> Result<Response, AppError> {
    let kind = file
        .strip_suffix(".csv")
        .ok_or_else(|| AppError::NotFound(format!("Unknown report: {}", file)))?;

    let dataset = state.data.dataset(ctx.scope()).await?;
    let body = match kind {
        "parts" => to_csv(&dataset.parts),
        "transactions" => to_csv(&dataset.transactions),
        "shipments" => to_csv(&dataset.shipments),
        "vendors" => to_csv(&dataset.vendors),
        _ => return Err(AppError::NotFound(format!("Unknown report: {}", file))),
    };

    info!("[REPORTS] {} exported {} ({} bytes)", ctx.name, file, body.len());
    Ok((
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
            (header::CONTENT_DISPOSITION, format!("attachment; filename=\"{}\"", file)),
        ],
        body,
    )
        .into_response())
}
