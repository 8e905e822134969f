use axum::{extract::State, Json};

use crate::{handlers::AppState, models::WasteResponse};

/// Perishable items ranked by waste risk, most urgent first
#[utoipa::path(
    get,
    path = "/api/v1/waste",
    responses(
        (status = 200, description = "Ranked waste items returned", body = WasteResponse),
        (status = 401, description = "Unauthorized", body = crate::errors::ErrorResponse),
        (status = 500, description = "Internal server error", body = crate::errors::ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "waste"
)]
pub async fn list_waste_risks(State(state): State<AppState>) -> Json<WasteResponse> {
    Json(state.services.waste.rank())
}
