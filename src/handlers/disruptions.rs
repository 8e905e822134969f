use axum::{extract::State, Json};

use crate::{errors::ServiceError, handlers::AppState, models::DisruptionsResponse};

/// All disruption records newest first, with headline totals
#[utoipa::path(
    get,
    path = "/api/v1/disruption",
    responses(
        (status = 200, description = "Disruptions returned", body = DisruptionsResponse,
            headers(("X-Request-Id" = String, description = "Unique request id"))
        ),
        (status = 401, description = "Unauthorized", body = crate::errors::ErrorResponse),
        (status = 500, description = "Internal server error", body = crate::errors::ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "disruptions"
)]
pub async fn list_disruptions(
    State(state): State<AppState>,
) -> Result<Json<DisruptionsResponse>, ServiceError> {
    state.services.disruptions.summarize().map(Json)
}
