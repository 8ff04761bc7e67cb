//! Translates a [`TaskFlowError`] into the HTTP error envelope. Grounded in
//! `original_source/adapters/inbound/api/error_handlers.py`'s single global
//! `AppError` handler, expressed here as an `IntoResponse` impl the way the
//! pack's axum handlers return `(StatusCode, Json<_>)` on their error path.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;

use taskflow_core::error::{ErrorKind, TaskFlowError};

use crate::response::{ErrorBody, ErrorEnvelope};

pub struct ApiError(pub TaskFlowError);

impl From<TaskFlowError> for ApiError {
    fn from(err: TaskFlowError) -> Self {
        ApiError(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let err = self.0;
        let status = match err.kind() {
            ErrorKind::NotFound => StatusCode::NOT_FOUND,
            ErrorKind::Conflict | ErrorKind::JobAlreadyExists => StatusCode::CONFLICT,
            ErrorKind::Validation => StatusCode::UNPROCESSABLE_ENTITY,
            ErrorKind::Repository | ErrorKind::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        };

        if status == StatusCode::INTERNAL_SERVER_ERROR {
            tracing::error!(error = %err, "request failed with a server error");
        }

        let body = ErrorEnvelope {
            error: ErrorBody {
                code: err.kind().code(),
                message: err.to_string(),
                details: err.details(),
            },
        };

        (status, Json(body)).into_response()
    }
}
