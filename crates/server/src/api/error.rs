//! JSON error responses.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use ticketpress_core::{BatchError, ErrorKind, ProgressError, RenderError};

/// Error response body
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: &'static str,
}

/// An error returned from a handler.
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub code: &'static str,
    pub message: String,
}

impl ApiError {
    pub fn new(status: StatusCode, code: &'static str, message: impl Into<String>) -> Self {
        Self {
            status,
            code,
            message: message.into(),
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, "validation", message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, "not_found", message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, "internal", message)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (
            self.status,
            Json(ErrorResponse {
                error: self.message,
                code: self.code,
            }),
        )
            .into_response()
    }
}

impl From<RenderError> for ApiError {
    fn from(err: RenderError) -> Self {
        let kind = err.kind();
        let status = match kind {
            ErrorKind::Validation => StatusCode::BAD_REQUEST,
            ErrorKind::NotFound => StatusCode::NOT_FOUND,
            ErrorKind::Encoding | ErrorKind::Composition | ErrorKind::Internal => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };
        Self::new(status, kind.as_str(), err.to_string())
    }
}

impl From<BatchError> for ApiError {
    fn from(err: BatchError) -> Self {
        let status = match &err {
            BatchError::Validation(_) => StatusCode::BAD_REQUEST,
            BatchError::DefaultTemplateMissing(_) => StatusCode::NOT_FOUND,
            BatchError::SessionInUse(_) => StatusCode::CONFLICT,
            BatchError::Cancelled => StatusCode::SERVICE_UNAVAILABLE,
            BatchError::Archive(_) | BatchError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        Self::new(status, err.label(), err.to_string())
    }
}

impl From<ProgressError> for ApiError {
    fn from(err: ProgressError) -> Self {
        Self::bad_request(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ticketpress_core::TemplateError;

    #[test]
    fn test_render_error_status() {
        let err = ApiError::from(RenderError::validation("QR payload is required"));
        assert_eq!(err.status, StatusCode::BAD_REQUEST);

        let err = ApiError::from(RenderError::from(TemplateError::NotFound("x.jpg".into())));
        assert_eq!(err.status, StatusCode::NOT_FOUND);
        assert_eq!(err.code, "not_found");

        let err = ApiError::from(RenderError::Internal("boom".into()));
        assert_eq!(err.status, StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_batch_error_status() {
        assert_eq!(
            ApiError::from(BatchError::DefaultTemplateMissing("ticket.jpg".into())).status,
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            ApiError::from(BatchError::validation("No tickets provided")).status,
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::from(BatchError::Cancelled).status,
            StatusCode::SERVICE_UNAVAILABLE
        );
        assert_eq!(
            ApiError::from(BatchError::SessionInUse("s1".into())).status,
            StatusCode::CONFLICT
        );
    }
}
