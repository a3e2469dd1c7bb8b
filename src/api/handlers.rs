//! Handlers for the `/portafolio` resource.

use axum::{
    Json,
    extract::{Path, Query, State, rejection::JsonRejection},
    http::StatusCode,
};
use tracing::{info, instrument};

use super::dto::{HealthResponse, TarifaQuery};
use super::error::{ApiErrorResponse, FieldError};
use super::AppState;
use crate::portafolio::{self, PortafolioChanges, PortafolioEntry};
use crate::tariff;

type ApiResult<T> = Result<T, ApiErrorResponse>;

/// POST /portafolio
#[instrument(skip_all)]
pub async fn create_portafolio(
    State(state): State<AppState>,
    payload: Result<Json<PortafolioEntry>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<PortafolioEntry>)> {
    let Json(entry) = payload?;

    if entry.codigo_hptu.trim().is_empty() {
        return Err(ApiErrorResponse::validation_error(
            "Validation failed",
            vec![FieldError::new("codigoHPTU", "El código HPTU es obligatorio")],
        ));
    }

    let created = state.store.create(entry.normalized()?).await?;
    info!(codigo_hptu = %created.codigo_hptu, "Created portfolio entry");

    Ok((StatusCode::CREATED, Json(created)))
}

/// GET /portafolio
pub async fn list_portafolio(
    State(state): State<AppState>,
) -> ApiResult<Json<Vec<PortafolioEntry>>> {
    Ok(Json(state.store.list().await?))
}

/// GET /portafolio/{codigo_hptu}
pub async fn get_portafolio(
    State(state): State<AppState>,
    Path(codigo_hptu): Path<String>,
) -> ApiResult<Json<PortafolioEntry>> {
    Ok(Json(state.store.get(&codigo_hptu).await?))
}

/// PUT /portafolio/{codigo_hptu}
#[instrument(skip(state, payload))]
pub async fn update_portafolio(
    State(state): State<AppState>,
    Path(codigo_hptu): Path<String>,
    payload: Result<Json<PortafolioChanges>, JsonRejection>,
) -> ApiResult<Json<PortafolioEntry>> {
    let Json(changes) = payload?;
    let updated = state.store.update(&codigo_hptu, changes.normalized()?).await?;
    info!("Updated portfolio entry");
    Ok(Json(updated))
}

/// DELETE /portafolio/{codigo_hptu}
#[instrument(skip(state))]
pub async fn delete_portafolio(
    State(state): State<AppState>,
    Path(codigo_hptu): Path<String>,
) -> ApiResult<Json<PortafolioEntry>> {
    let removed = state.store.delete(&codigo_hptu).await?;
    info!("Deleted portfolio entry");
    Ok(Json(removed))
}

/// GET /portafolio/grupo/{grupo_concepto}
pub async fn list_portafolio_by_group(
    State(state): State<AppState>,
    Path(grupo_concepto): Path<String>,
) -> ApiResult<Json<Vec<PortafolioEntry>>> {
    Ok(Json(state.store.list_by_group(&grupo_concepto).await?))
}

/// PATCH /portafolio/{codigo_hptu}/tarifa?mode=&value=
pub async fn adjust_tarifa(
    State(state): State<AppState>,
    Path(codigo_hptu): Path<String>,
    Query(query): Query<TarifaQuery>,
) -> ApiResult<Json<PortafolioEntry>> {
    let mode = tariff::parse_mode(query.mode.as_deref())?;
    let operand = tariff::parse_operand(query.value.as_deref())?;

    let updated =
        portafolio::adjust_tariff(state.store.as_ref(), &codigo_hptu, mode, operand).await?;
    Ok(Json(updated))
}

/// PATCH /portafolio/grupo/{grupo_concepto}/tarifa?mode=&value=
pub async fn adjust_tarifa_by_group(
    State(state): State<AppState>,
    Path(grupo_concepto): Path<String>,
    Query(query): Query<TarifaQuery>,
) -> ApiResult<Json<Vec<PortafolioEntry>>> {
    let mode = tariff::parse_mode(query.mode.as_deref())?;
    let operand = tariff::parse_operand(query.value.as_deref())?;

    let updated = portafolio::adjust_group_tariff(
        state.store.as_ref(),
        &grupo_concepto,
        mode,
        operand,
    )
    .await?;
    Ok(Json(updated))
}

/// GET /health
pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}
