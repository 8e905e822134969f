//! Supply Insights API
//!
//! Read-only dashboard backend for supply-chain monitoring: disruption
//! intelligence, demand forecast lookup and perishable waste-risk ranking.
#![forbid(unsafe_code)]
#![deny(rust_2018_idioms)]
#![allow(elided_lifetimes_in_paths)]
#![warn(clippy::all, clippy::perf, clippy::dbg_macro)]

pub mod auth;
pub mod config;
pub mod datasets;
pub mod errors;
pub mod handlers;
pub mod metrics;
pub mod middleware_helpers;
pub mod models;
pub mod openapi;
pub mod services;
pub mod tracing;

use std::{any::Any, sync::Arc};

use axum::{
    extract::FromRef,
    http::{header, HeaderName, HeaderValue, Method},
    response::{IntoResponse, Json, Response},
    routing::get,
    Router,
};
use tower_http::{
    catch_panic::CatchPanicLayer,
    compression::CompressionLayer,
    cors::{AllowOrigin, CorsLayer},
    timeout::TimeoutLayer,
};
use utoipa::OpenApi;

use crate::auth::{AuthRouterExt, AuthService, IdentityProvider};
use crate::config::AppConfig;
use crate::datasets::Dataset;
use crate::errors::ServiceError;
use crate::handlers::AppServices;
use crate::metrics::MetricsRegistry;

/// Shared state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub dataset: Arc<Dataset>,
    pub services: AppServices,
    pub identity: Arc<dyn IdentityProvider>,
    pub metrics: Arc<MetricsRegistry>,
}

impl AppState {
    /// State backed by the built-in JWT identity provider.
    pub fn new(config: AppConfig, dataset: Dataset) -> Self {
        let identity: Arc<dyn IdentityProvider> = Arc::new(AuthService::new(config.auth_config()));
        Self::with_identity(config, dataset, identity)
    }

    pub fn with_identity(
        config: AppConfig,
        dataset: Dataset,
        identity: Arc<dyn IdentityProvider>,
    ) -> Self {
        let dataset = Arc::new(dataset);
        let metrics = Arc::new(MetricsRegistry::new());
        metrics.record_dataset(dataset.counts());

        Self {
            services: AppServices::new(dataset.clone(), config.forecast_model_version.clone()),
            config: Arc::new(config),
            dataset,
            identity,
            metrics,
        }
    }
}

impl FromRef<AppState> for Arc<MetricsRegistry> {
    fn from_ref(state: &AppState) -> Self {
        state.metrics.clone()
    }
}

/// Business endpoints. Every route requires a bearer token.
pub fn api_v1_routes(identity: Arc<dyn IdentityProvider>) -> Router<AppState> {
    Router::new()
        .route("/disruption", get(handlers::disruptions::list_disruptions))
        .route(
            "/forecast",
            get(handlers::forecast::list_forecasts).post(handlers::forecast::resolve_forecast),
        )
        .route("/waste", get(handlers::waste::list_waste_risks))
        .route("/overview", get(handlers::overview::get_overview))
        .route("/user", get(handlers::users::get_current_user))
        .with_auth(identity)
}

async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(openapi::ApiDocV1::openapi())
}

fn handle_panic(err: Box<dyn Any + Send + 'static>) -> Response {
    let detail = if let Some(s) = err.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = err.downcast_ref::<&str>() {
        s.to_string()
    } else {
        "unknown panic payload".to_string()
    };
    ::tracing::error!(panic = %detail, "Handler panicked");
    ServiceError::InternalError(detail).into_response()
}

/// CORS policy derived from configuration.
///
/// Explicit origins take precedence. Without them the layer is permissive
/// only when configuration allows it, otherwise cross-origin requests are
/// refused.
pub fn cors_layer(config: &AppConfig) -> CorsLayer {
    let origins: Vec<HeaderValue> = config
        .cors_origins()
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(err) => {
                ::tracing::warn!(origin = %origin, error = %err, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    if !origins.is_empty() {
        return CorsLayer::new()
            .allow_origin(AllowOrigin::list(origins))
            .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
            .allow_headers([
                header::AUTHORIZATION,
                header::CONTENT_TYPE,
                HeaderName::from_static(middleware_helpers::REQUEST_ID_HEADER),
            ])
            .allow_credentials(config.cors_allow_credentials);
    }

    if config.should_allow_permissive_cors() {
        ::tracing::warn!("No CORS origins configured; allowing any origin");
        return CorsLayer::permissive();
    }

    ::tracing::warn!("No CORS origins configured; cross-origin requests will be rejected");
    CorsLayer::new()
}

/// Assemble the full HTTP application.
pub fn build_router(state: AppState) -> Router {
    let api = api_v1_routes(state.identity.clone());
    let registry = state.metrics.clone();
    let cors = cors_layer(&state.config);
    let timeout = state.config.request_timeout();

    Router::new()
        .nest("/health", handlers::health::health_routes())
        .route("/metrics", get(metrics::metrics_handler))
        .route("/metrics/json", get(metrics::metrics_json_handler))
        .route("/api-docs/openapi.json", get(openapi_json))
        .nest("/api/v1", api)
        .layer(axum::middleware::from_fn_with_state(
            registry,
            metrics::http_metrics_middleware,
        ))
        .layer(TimeoutLayer::new(timeout))
        .layer(CatchPanicLayer::custom(handle_panic))
        .layer(crate::tracing::configure_http_tracing())
        .layer(CompressionLayer::new())
        .layer(cors)
        .layer(axum::middleware::from_fn(
            middleware_helpers::request_id_middleware,
        ))
        .with_state(state)
}
