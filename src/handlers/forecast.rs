use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};
use tracing::debug;

use crate::{
    errors::ServiceError,
    handlers::AppState,
    models::{ForecastListResponse, ForecastResponse, ResolveForecastRequest},
};

/// SKUs with forecasts and the regions each one covers
#[utoipa::path(
    get,
    path = "/api/v1/forecast",
    responses(
        (status = 200, description = "Available forecasts returned", body = ForecastListResponse),
        (status = 401, description = "Unauthorized", body = crate::errors::ErrorResponse),
        (status = 500, description = "Internal server error", body = crate::errors::ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "forecast"
)]
pub async fn list_forecasts(State(state): State<AppState>) -> Json<ForecastListResponse> {
    Json(state.services.forecasts.list_available())
}

/// Resolve the demand series for one (SKU, region) pair
#[utoipa::path(
    post,
    path = "/api/v1/forecast",
    request_body = ResolveForecastRequest,
    responses(
        (status = 200, description = "Forecast series returned", body = ForecastResponse),
        (status = 400, description = "SKU or region missing, or body is not valid JSON", body = crate::errors::ErrorResponse),
        (status = 401, description = "Unauthorized", body = crate::errors::ErrorResponse),
        (status = 404, description = "Unknown SKU or region, with the valid alternatives", body = crate::errors::ErrorResponse),
        (status = 500, description = "Internal server error", body = crate::errors::ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "forecast"
)]
pub async fn resolve_forecast(
    State(state): State<AppState>,
    payload: Result<Json<ResolveForecastRequest>, JsonRejection>,
) -> Result<Json<ForecastResponse>, ServiceError> {
    let Json(request) = payload.map_err(|rejection| {
        debug!(error = %rejection.body_text(), "Rejected forecast request body");
        ServiceError::InvalidArgument(format!("Invalid request body: {}", rejection.body_text()))
    })?;

    state.services.forecasts.resolve_request(&request).map(Json)
}
