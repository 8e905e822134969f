use axum::{extract::State, Json};

use crate::{errors::ServiceError, handlers::AppState, models::OverviewResponse};

#[utoipa::path(
    get,
    path = "/api/v1/overview",
    responses(
        (status = 200, description = "Disruption and waste summaries", body = OverviewResponse),
        (status = 401, description = "Unauthorized", body = crate::errors::ErrorResponse),
        (status = 500, description = "Internal server error", body = crate::errors::ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "overview"
)]
pub async fn get_overview(
    State(state): State<AppState>,
) -> Result<Json<OverviewResponse>, ServiceError> {
    state.services.overview.snapshot().map(Json)
}
