//! Endpoint handlers.

use axum::{
    extract::{Query, State},
    Json,
};

use super::{
    error::ApiError,
    types::{ErrorResponse, HealthStatus, PowerQuery, PowerState},
    AppState,
};
use crate::temperature::TemperatureReading;
use crate::tracing::prelude::*;

/// Health check endpoint handler.
///
/// Returns a fixed status to show the API is running. It does not contact the
/// temperature daemon.
#[utoipa::path(
    get,
    path = "/health",
    responses((status = 200, description = "Server is up", body = HealthStatus))
)]
pub async fn health() -> Json<HealthStatus> {
    Json(HealthStatus::ok())
}

/// Set power state endpoint handler.
///
/// Acknowledges the requested state. Nothing is switched yet; the value is
/// echoed back.
///
/// # Example
/// ```bash
/// curl -X POST 'http://localhost:8000/power?powerOn=true'
/// ```
#[utoipa::path(
    post,
    path = "/power",
    params(PowerQuery),
    responses(
        (status = 200, description = "Requested state acknowledged", body = PowerState),
        (status = 400, description = "powerOn missing or not a boolean")
    )
)]
pub async fn set_power(Query(query): Query<PowerQuery>) -> Json<PowerState> {
    info!(power_on = query.power_on, "Power state requested");
    Json(PowerState {
        power_on: query.power_on,
    })
}

/// Temperature endpoint handler.
///
/// Takes one reading from the configured source. Any daemon failure is
/// reported as 502 with a `detail` message naming the failing stage.
///
/// # Example
/// ```bash
/// curl http://localhost:8000/temperature
/// ```
#[utoipa::path(
    get,
    path = "/temperature",
    responses(
        (status = 200, description = "Current reading", body = TemperatureReading),
        (status = 502, description = "Temperature daemon failed", body = ErrorResponse)
    )
)]
pub async fn temperature(
    State(state): State<AppState>,
) -> Result<Json<TemperatureReading>, ApiError> {
    let reading = state.source.read().await?;
    Ok(Json(reading))
}
