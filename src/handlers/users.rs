use axum::{extract::State, Json};

use crate::{auth::AuthUser, handlers::AppState, models::UserProfile};

fn profile_for(user: AuthUser, default_role: &str, default_location: &str) -> UserProfile {
    UserProfile {
        id: user.user_id,
        email: user.email,
        name: user.name,
        image_url: user.image_url,
        role: user.role.unwrap_or_else(|| default_role.to_string()),
        location: user.location.unwrap_or_else(|| default_location.to_string()),
    }
}

/// Profile of the authenticated caller
#[utoipa::path(
    get,
    path = "/api/v1/user",
    responses(
        (status = 200, description = "Current user profile", body = UserProfile),
        (status = 401, description = "Unauthorized", body = crate::errors::ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "users"
)]
pub async fn get_current_user(State(state): State<AppState>, user: AuthUser) -> Json<UserProfile> {
    Json(profile_for(
        user,
        &state.config.profile_default_role,
        &state.config.profile_default_location,
    ))
}
