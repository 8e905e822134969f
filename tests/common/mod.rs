#![allow(dead_code)]

use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request, StatusCode},
    response::Response,
    Router,
};
use chrono::{DateTime, TimeZone, Utc};
use serde_json::Value;
use supply_insights_api::{
    auth::{AuthService, TokenSubject},
    build_router,
    config::AppConfig,
    datasets::Dataset,
    AppState,
};
use tower::ServiceExt;

pub const TEST_SECRET: &str =
    "integration-signing-key-Vq8Lw3Nz6Rb1Tx4Yc7Hd0Kf2Mg5Pj9Sa-Vq8Lw3Nz6Rb1Tx4Yc7";

/// Instant the bundled disruption timestamps are laid out from.
pub fn anchor() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 7, 10, 12, 0, 0).unwrap()
}

pub fn test_config() -> AppConfig {
    AppConfig::new(TEST_SECRET.to_string(), "test".to_string())
}

/// Router over the bundled dataset plus a token accepted by it.
pub struct TestApp {
    router: Router,
    pub state: AppState,
    token: String,
}

impl TestApp {
    pub fn new() -> Self {
        Self::with_dataset(Dataset::builtin(anchor()))
    }

    pub fn with_dataset(dataset: Dataset) -> Self {
        let config = test_config();
        let auth = AuthService::new(config.auth_config());
        let subject = TokenSubject {
            name: Some("Avery Quinn".into()),
            email: Some("avery@example.com".into()),
            ..TokenSubject::new("user-test-1")
        };
        let token = auth.issue_token(&subject).expect("failed to issue test token");

        let state = AppState::new(config, dataset);
        Self {
            router: build_router(state.clone()),
            state,
            token,
        }
    }

    pub fn token(&self) -> &str {
        &self.token
    }

    pub fn auth_service(&self) -> AuthService {
        AuthService::new(self.state.config.auth_config())
    }

    /// Send a request with an optional bearer token and raw body.
    pub async fn request(
        &self,
        method: Method,
        uri: &str,
        body: Option<String>,
        token: Option<&str>,
    ) -> Response {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(tok) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", tok));
        }

        let body = match body {
            Some(raw) => {
                builder = builder.header(header::CONTENT_TYPE, "application/json");
                Body::from(raw)
            }
            None => Body::empty(),
        };

        self.send(builder.body(body).expect("failed to build request"))
            .await
    }

    pub async fn send(&self, request: Request<Body>) -> Response {
        self.router
            .clone()
            .oneshot(request)
            .await
            .expect("router is infallible")
    }

    pub async fn get(&self, uri: &str) -> Response {
        self.request(Method::GET, uri, None, Some(self.token())).await
    }

    pub async fn get_anonymous(&self, uri: &str) -> Response {
        self.request(Method::GET, uri, None, None).await
    }

    pub async fn post_json(&self, uri: &str, body: Value) -> Response {
        self.post_raw(uri, &body.to_string()).await
    }

    pub async fn post_raw(&self, uri: &str, body: &str) -> Response {
        self.request(Method::POST, uri, Some(body.to_string()), Some(self.token()))
            .await
    }
}

pub async fn response_json(response: Response) -> (StatusCode, Value) {
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("failed to read response body");
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).expect("response body is not JSON")
    };
    (status, json)
}

pub async fn response_text(response: Response) -> (StatusCode, String) {
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("failed to read response body");
    (status, String::from_utf8_lossy(&bytes).into_owned())
}
