//! HTTP error mapping.
//!
//! Every error body has the shape `{"detail": "<message>"}`.

use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use uuid::Uuid;

use crate::common::ServiceError;

#[derive(Debug)]
pub struct ApiError(pub ServiceError);

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match &self.0 {
            ServiceError::NotFound(_) => StatusCode::NOT_FOUND,
            ServiceError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ServiceError::ExternalCapability(_) => StatusCode::BAD_GATEWAY,
            ServiceError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<ServiceError> for ApiError {
    fn from(err: ServiceError) -> Self {
        Self(err)
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self(ServiceError::Validation(rejection.body_text()))
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let detail = match &self.0 {
            ServiceError::NotFound(_)
            | ServiceError::Validation(_)
            | ServiceError::ExternalCapability(_) => self.0.to_string(),
            ServiceError::Internal(_) => {
                tracing::error!(error = %self.0, "Request failed");
                "Internal server error".to_string()
            }
        };

        (status, Json(json!({ "detail": detail }))).into_response()
    }
}

/// Parse a path id. A malformed id names nothing, so it is reported as `not_found`.
pub fn parse_path_id(raw: &str, not_found: impl FnOnce() -> ServiceError) -> Result<Uuid, ApiError> {
    Uuid::parse_str(raw).map_err(|_| ApiError(not_found()))
}
