use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

fn current_request_id() -> Option<String> {
    crate::tracing::current_request_id().map(|rid| rid.as_str().to_string())
}

/// Stable, machine-readable error category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    Unauthorized,
    InvalidArgument,
    NotFound,
    Internal,
}

/// Valid keys reported alongside a failed lookup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum AvailableKeys {
    Skus(Vec<String>),
    Regions(Vec<String>),
}

/// Error body returned by every endpoint
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
#[schema(example = json!({
    "error": "SKU not found",
    "code": "not_found",
    "availableSkus": ["SKU-12345-Milk", "SKU-67890-Bread"],
    "requestId": "req-abc123xyz",
    "timestamp": "2025-07-10T10:30:00.000Z"
}))]
pub struct ErrorResponse {
    /// Human-readable error description
    pub error: String,
    pub code: ErrorCode,
    /// Known product identifiers, present when the SKU was not found
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub available_skus: Option<Vec<String>>,
    /// Regions valid for the requested SKU, present when the region was not found
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub available_regions: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_id: Option<String>,
    /// RFC 3339 timestamp when the error occurred
    pub timestamp: String,
}

#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Not found: {message}")]
    NotFound {
        message: String,
        available: AvailableKeys,
    },

    #[error("Data quality error: {0}")]
    DataQuality(String),

    #[error("Internal error: {0}")]
    InternalError(String),

    #[error("Other error: {0}")]
    Other(#[from] anyhow::Error),
}

impl ServiceError {
    pub fn sku_not_found(available: Vec<String>) -> Self {
        ServiceError::NotFound {
            message: "SKU not found".to_string(),
            available: AvailableKeys::Skus(available),
        }
    }

    pub fn region_not_found(available: Vec<String>) -> Self {
        ServiceError::NotFound {
            message: "Region not found for this SKU".to_string(),
            available: AvailableKeys::Regions(available),
        }
    }

    pub fn code(&self) -> ErrorCode {
        match self {
            Self::Unauthorized(_) => ErrorCode::Unauthorized,
            Self::InvalidArgument(_) => ErrorCode::InvalidArgument,
            Self::NotFound { .. } => ErrorCode::NotFound,
            Self::DataQuality(_) | Self::InternalError(_) | Self::Other(_) => ErrorCode::Internal,
        }
    }

    /// Returns the HTTP status code for this error.
    pub fn status_code(&self) -> StatusCode {
        match self.code() {
            ErrorCode::Unauthorized => StatusCode::UNAUTHORIZED,
            ErrorCode::InvalidArgument => StatusCode::BAD_REQUEST,
            ErrorCode::NotFound => StatusCode::NOT_FOUND,
            ErrorCode::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Message suitable for the response body. Internal kinds never expose their cause.
    pub fn response_message(&self) -> String {
        match self {
            Self::Unauthorized(_) => "Unauthorized".to_string(),
            Self::InvalidArgument(msg) => msg.clone(),
            Self::NotFound { message, .. } => message.clone(),
            Self::DataQuality(_) | Self::InternalError(_) | Self::Other(_) => {
                "Internal server error".to_string()
            }
        }
    }

    pub fn to_error_response(&self) -> ErrorResponse {
        let (available_skus, available_regions) = match self {
            Self::NotFound {
                available: AvailableKeys::Skus(skus),
                ..
            } => (Some(skus.clone()), None),
            Self::NotFound {
                available: AvailableKeys::Regions(regions),
                ..
            } => (None, Some(regions.clone())),
            _ => (None, None),
        };

        ErrorResponse {
            error: self.response_message(),
            code: self.code(),
            available_skus,
            available_regions,
            request_id: current_request_id(),
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }
}

impl IntoResponse for ServiceError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
        } else {
            tracing::debug!(error = %self, status = status.as_u16(), "request rejected");
        }

        (status, Json(self.to_error_response())).into_response()
    }
}
