/*!
 * # Authentication Module
 *
 * Every dashboard endpoint requires an authenticated caller. Identity is
 * resolved through the [`IdentityProvider`] seam so the HTTP layer never
 * depends on how tokens are issued. The bundled provider, [`AuthService`],
 * validates HS256 bearer JWTs signed with the configured secret.
 */

use async_trait::async_trait;
use axum::{
    extract::{FromRequestParts, Request, State},
    http::{header, request::Parts, HeaderMap},
    middleware::Next,
    response::{IntoResponse, Response},
};
use chrono::{Duration as ChronoDuration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tracing::debug;
use uuid::Uuid;

use crate::errors::ServiceError;

/// Claim structure for JWT tokens
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String, // Subject (user ID)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub picture: Option<String>, // Avatar URL
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    pub jti: String, // JWT ID
    pub iat: i64,
    pub exp: i64,
    pub nbf: i64,
    pub iss: String,
    pub aud: String,
}

/// Authenticated caller, inserted into request extensions by [`auth_middleware`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuthUser {
    pub user_id: String,
    pub name: Option<String>,
    pub email: Option<String>,
    pub image_url: Option<String>,
    pub role: Option<String>,
    pub location: Option<String>,
    pub token_id: String,
}

impl From<Claims> for AuthUser {
    fn from(claims: Claims) -> Self {
        Self {
            user_id: claims.sub,
            name: claims.name,
            email: claims.email,
            image_url: claims.picture,
            role: claims.role,
            location: claims.location,
            token_id: claims.jti,
        }
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthUser>()
            .cloned()
            .ok_or(AuthError::MissingAuth)
    }
}

/// Profile fields embedded in an issued token.
#[derive(Debug, Clone, Default)]
pub struct TokenSubject {
    pub user_id: String,
    pub name: Option<String>,
    pub email: Option<String>,
    pub picture: Option<String>,
    pub role: Option<String>,
    pub location: Option<String>,
}

impl TokenSubject {
    pub fn new(user_id: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            ..Default::default()
        }
    }
}

/// Authentication configuration
#[derive(Clone, Debug)]
pub struct AuthConfig {
    pub jwt_secret: String,
    pub jwt_audience: String,
    pub jwt_issuer: String,
    pub token_ttl: Duration,
}

impl AuthConfig {
    pub fn new(
        jwt_secret: String,
        jwt_audience: String,
        jwt_issuer: String,
        token_ttl: Duration,
    ) -> Self {
        Self {
            jwt_secret,
            jwt_audience,
            jwt_issuer,
            token_ttl,
        }
    }
}

/// Authentication error types
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Missing authentication")]
    MissingAuth,

    #[error("Invalid token")]
    InvalidToken,

    #[error("Token has expired")]
    TokenExpired,

    #[error("Token creation failed: {0}")]
    TokenCreation(String),
}

impl From<AuthError> for ServiceError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::TokenCreation(msg) => ServiceError::InternalError(msg),
            other => ServiceError::Unauthorized(other.to_string()),
        }
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        ServiceError::from(self).into_response()
    }
}

/// Resolves a bearer credential into a caller identity.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    async fn authenticate(&self, bearer_token: &str) -> Result<AuthUser, AuthError>;
}

/// Issues and validates HS256 JWTs
#[derive(Debug, Clone)]
pub struct AuthService {
    config: AuthConfig,
}

impl AuthService {
    pub fn new(config: AuthConfig) -> Self {
        Self { config }
    }

    /// Mint a token for `subject` valid for the configured TTL.
    pub fn issue_token(&self, subject: &TokenSubject) -> Result<String, AuthError> {
        let now = Utc::now();
        let ttl = ChronoDuration::from_std(self.config.token_ttl)
            .map_err(|_| AuthError::TokenCreation("Invalid token duration".to_string()))?;
        let exp = now
            .checked_add_signed(ttl)
            .ok_or_else(|| AuthError::TokenCreation("Token expiry is out of range".to_string()))?;

        let claims = Claims {
            sub: subject.user_id.clone(),
            name: subject.name.clone(),
            email: subject.email.clone(),
            picture: subject.picture.clone(),
            role: subject.role.clone(),
            location: subject.location.clone(),
            jti: Uuid::new_v4().to_string(),
            iat: now.timestamp(),
            exp: exp.timestamp(),
            nbf: now.timestamp(),
            iss: self.config.jwt_issuer.clone(),
            aud: self.config.jwt_audience.clone(),
        };

        self.encode_claims(&claims)
    }

    pub(crate) fn encode_claims(&self, claims: &Claims) -> Result<String, AuthError> {
        encode(
            &Header::new(Algorithm::HS256),
            claims,
            &EncodingKey::from_secret(self.config.jwt_secret.as_bytes()),
        )
        .map_err(|e| AuthError::TokenCreation(e.to_string()))
    }

    /// Validate a JWT token and extract the claims
    pub fn validate_token(&self, token: &str) -> Result<Claims, AuthError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_issuer(&[&self.config.jwt_issuer]);
        validation.set_audience(&[&self.config.jwt_audience]);
        validation.validate_nbf = true;

        decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.config.jwt_secret.as_bytes()),
            &validation,
        )
        .map(|data| data.claims)
        .map_err(|e| match e.kind() {
            jsonwebtoken::errors::ErrorKind::ExpiredSignature => AuthError::TokenExpired,
            _ => AuthError::InvalidToken,
        })
    }
}

#[async_trait]
impl IdentityProvider for AuthService {
    async fn authenticate(&self, bearer_token: &str) -> Result<AuthUser, AuthError> {
        self.validate_token(bearer_token).map(AuthUser::from)
    }
}

/// Extract the bearer token from the `Authorization` header
fn bearer_token(headers: &HeaderMap) -> Result<&str, AuthError> {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .ok_or(AuthError::MissingAuth)
}

/// Rejects the request unless the identity provider accepts its bearer token.
pub async fn auth_middleware(
    State(identity): State<Arc<dyn IdentityProvider>>,
    mut request: Request,
    next: Next,
) -> Result<Response, AuthError> {
    let token = bearer_token(request.headers())?;
    let user = identity.authenticate(token).await.map_err(|err| {
        debug!(error = %err, "Rejected request credentials");
        err
    })?;

    request.extensions_mut().insert(user);
    Ok(next.run(request).await)
}

/// Extension methods for Router to add auth middleware
pub trait AuthRouterExt {
    fn with_auth(self, identity: Arc<dyn IdentityProvider>) -> Self;
}

impl<S> AuthRouterExt for axum::Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    fn with_auth(self, identity: Arc<dyn IdentityProvider>) -> Self {
        self.layer(axum::middleware::from_fn_with_state(
            identity,
            auth_middleware,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use axum::{
        body::{to_bytes, Body},
        http::{Request as HttpRequest, StatusCode},
        routing::get,
        Router,
    };
    use tower::ServiceExt;

    const SECRET: &str =
        "unit-test-signing-key-0123456789-abcdefghijklmnopqrstuvwxyz-ABCDEFGHIJ";

    fn service() -> AuthService {
        AuthService::new(AuthConfig::new(
            SECRET.to_string(),
            "supply-insights-api".to_string(),
            "supply-insights-auth".to_string(),
            Duration::from_secs(600),
        ))
    }

    fn subject() -> TokenSubject {
        TokenSubject {
            name: Some("Dana Ortiz".into()),
            email: Some("dana@example.com".into()),
            role: Some("Regional Planner".into()),
            ..TokenSubject::new("user-17")
        }
    }

    fn service_with_ttl(ttl: Duration) -> AuthService {
        AuthService::new(AuthConfig::new(
            SECRET.to_string(),
            "supply-insights-api".to_string(),
            "supply-insights-auth".to_string(),
            ttl,
        ))
    }

    #[test]
    fn out_of_range_ttl_is_a_creation_error() {
        // Accepted as a chrono duration, but pushes the expiry past the last representable date.
        let near_max = service_with_ttl(Duration::from_secs(i64::MAX as u64 / 1000 - 1));
        assert_matches!(
            near_max.issue_token(&subject()),
            Err(AuthError::TokenCreation(msg)) if msg.contains("out of range")
        );

        let beyond_max = service_with_ttl(Duration::from_secs(u64::MAX));
        assert_matches!(
            beyond_max.issue_token(&subject()),
            Err(AuthError::TokenCreation(_))
        );
    }

    #[test]
    fn issued_token_validates() {
        let auth = service();
        let token = auth.issue_token(&subject()).unwrap();
        let claims = auth.validate_token(&token).unwrap();

        assert_eq!(claims.sub, "user-17");
        assert_eq!(claims.role.as_deref(), Some("Regional Planner"));
        assert_eq!(claims.aud, "supply-insights-api");
    }

    #[test]
    fn expired_token_is_rejected() {
        let auth = service();
        let now = Utc::now().timestamp();
        let claims = Claims {
            sub: "user-17".into(),
            name: None,
            email: None,
            picture: None,
            role: None,
            location: None,
            jti: "expired".into(),
            iat: now - 7200,
            exp: now - 3600,
            nbf: now - 7200,
            iss: "supply-insights-auth".into(),
            aud: "supply-insights-api".into(),
        };
        let token = auth.encode_claims(&claims).unwrap();

        assert_matches!(auth.validate_token(&token), Err(AuthError::TokenExpired));
    }

    #[test]
    fn token_from_other_secret_or_audience_is_rejected() {
        let other = AuthService::new(AuthConfig::new(
            format!("{}-rotated", SECRET),
            "supply-insights-api".to_string(),
            "supply-insights-auth".to_string(),
            Duration::from_secs(600),
        ));
        let foreign = other.issue_token(&subject()).unwrap();
        assert_matches!(service().validate_token(&foreign), Err(AuthError::InvalidToken));

        let wrong_audience = AuthService::new(AuthConfig::new(
            SECRET.to_string(),
            "someone-else".to_string(),
            "supply-insights-auth".to_string(),
            Duration::from_secs(600),
        ));
        let token = wrong_audience.issue_token(&subject()).unwrap();
        assert_matches!(service().validate_token(&token), Err(AuthError::InvalidToken));
    }

    #[test]
    fn auth_errors_map_to_unauthorized() {
        assert_eq!(
            ServiceError::from(AuthError::TokenExpired).status_code(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            ServiceError::from(AuthError::TokenCreation("bad".into())).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    async fn whoami(user: AuthUser) -> String {
        user.user_id
    }

    fn app() -> Router {
        let identity: Arc<dyn IdentityProvider> = Arc::new(service());
        Router::new().route("/", get(whoami)).with_auth(identity)
    }

    #[tokio::test]
    async fn middleware_inserts_authenticated_user() {
        let token = service().issue_token(&subject()).unwrap();
        let response = app()
            .oneshot(
                HttpRequest::builder()
                    .uri("/")
                    .header(header::AUTHORIZATION, format!("Bearer {}", token))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert_eq!(&body[..], b"user-17");
    }

    #[tokio::test]
    async fn middleware_rejects_missing_or_malformed_credentials() {
        for value in [None, Some("Basic dXNlcjpwYXNz"), Some("Bearer "), Some("Bearer nope")] {
            let mut builder = HttpRequest::builder().uri("/");
            if let Some(value) = value {
                builder = builder.header(header::AUTHORIZATION, value);
            }
            let response = app()
                .oneshot(builder.body(Body::empty()).unwrap())
                .await
                .unwrap();

            assert_eq!(response.status(), StatusCode::UNAUTHORIZED, "{:?}", value);
            let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
            let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
            assert_eq!(json["code"], "unauthorized");
            assert_eq!(json["error"], "Unauthorized");
        }
    }
}
