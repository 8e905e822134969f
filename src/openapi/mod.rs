use utoipa::{
    openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
    Modify, OpenApi,
};

/// Registers the bearer JWT scheme referenced by every `/api/v1` path.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Supply Insights API",
        version = "0.1.0",
        description = r#"
# Supply Insights API

Read-only dashboard backend for store supply-chain monitoring.

- **Disruptions**: external events ordered newest first, with affected-store and impact totals
- **Forecast**: demand series per SKU and region, or the list of what is available
- **Waste**: perishable stock ranked by waste risk, with recommended mitigations
- **Overview**: disruption and waste summaries in one payload

## Authentication

Every `/api/v1` endpoint requires a bearer JWT:

```
Authorization: Bearer <your-jwt-token>
```

## Error Handling

Errors share one body shape. Lookup failures list the valid alternatives:

```json
{
  "error": "Region not found for this SKU",
  "code": "not_found",
  "availableRegions": ["California", "Texas"],
  "requestId": "2c4b0e0a-5a55-4c7e-9d0e-1f1c6a3f9b21",
  "timestamp": "2025-07-10T10:30:00Z"
}
```
        "#,
        license(
            name = "MIT",
            url = "https://opensource.org/licenses/MIT"
        )
    ),
    servers(
        (url = "http://localhost:8080", description = "Local development")
    ),
    tags(
        (name = "disruptions", description = "Supply disruption intelligence"),
        (name = "forecast", description = "Demand forecast lookup"),
        (name = "waste", description = "Perishable waste-risk ranking"),
        (name = "overview", description = "Dashboard headline figures"),
        (name = "users", description = "Authenticated caller profile"),
        (name = "health", description = "Health check endpoints")
    ),
    paths(
        crate::handlers::disruptions::list_disruptions,
        crate::handlers::forecast::list_forecasts,
        crate::handlers::forecast::resolve_forecast,
        crate::handlers::waste::list_waste_risks,
        crate::handlers::overview::get_overview,
        crate::handlers::users::get_current_user,
        crate::handlers::health::readiness_check,
    ),
    components(
        schemas(
            crate::models::DisruptionsResponse,
            crate::models::DisruptionEvent,
            crate::models::DisruptionSummary,
            crate::models::ForecastListResponse,
            crate::models::ResolveForecastRequest,
            crate::models::ForecastResponse,
            crate::models::ForecastSeries,
            crate::models::WasteResponse,
            crate::models::WasteItem,
            crate::models::WasteSummary,
            crate::models::Recommendation,
            crate::models::OverviewResponse,
            crate::models::UserProfile,
            crate::handlers::health::ReadinessResponse,
            crate::errors::ErrorResponse,
            crate::errors::ErrorCode
        )
    ),
    modifiers(&SecurityAddon)
)]
pub struct ApiDocV1;
