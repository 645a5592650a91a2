//! # API Errors
//!
//! Maps core errors and extractor rejections onto HTTP responses.
//! Every error body is `{"detail": "..."}`.

use super::types::ErrorResponse;
use axum::{
    Json,
    extract::rejection::{JsonRejection, PathRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use roster_core::RosterError;

/// An error returned from a handler.
#[derive(Debug)]
pub enum ApiError {
    /// 404: the addressed record does not exist.
    NotFound(String),
    /// 400: malformed or invalid input.
    BadRequest(String),
    /// 500: storage failure.
    Internal(String),
}

impl From<RosterError> for ApiError {
    fn from(err: RosterError) -> Self {
        match err {
            RosterError::CourseNotFound(_) | RosterError::StudentNotFound(_) => {
                Self::NotFound(err.to_string())
            }
            RosterError::UnknownStudent(_) | RosterError::Validation(_) => {
                Self::BadRequest(err.to_string())
            }
            RosterError::SerializationError(_)
            | RosterError::IoError(_)
            | RosterError::ConfigError(_) => {
                tracing::error!(error = %err, "storage failure while handling request");
                Self::Internal("Internal server error".to_string())
            }
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::BadRequest(rejection.body_text())
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        Self::BadRequest(rejection.body_text())
    }
}

/// A path segment that does not parse as an id cannot name a record.
impl From<PathRejection> for ApiError {
    fn from(_: PathRejection) -> Self {
        Self::NotFound("Not found".to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, detail) = match self {
            Self::NotFound(detail) => (StatusCode::NOT_FOUND, detail),
            Self::BadRequest(detail) => (StatusCode::BAD_REQUEST, detail),
            Self::Internal(detail) => (StatusCode::INTERNAL_SERVER_ERROR, detail),
        };
        (status, Json(ErrorResponse { detail })).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use roster_core::{CourseId, StudentId};

    #[test]
    fn missing_records_map_to_404() {
        let response = ApiError::from(RosterError::CourseNotFound(CourseId(1))).into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let response = ApiError::from(RosterError::StudentNotFound(StudentId(1))).into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn unknown_reference_in_body_maps_to_400() {
        let response = ApiError::from(RosterError::UnknownStudent(StudentId(9))).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn storage_failure_maps_to_500() {
        let response = ApiError::from(RosterError::IoError("disk".to_string())).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
