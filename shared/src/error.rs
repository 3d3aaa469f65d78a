use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use diesel_async::pooled_connection::PoolError;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::error;

pub type ApiResult<T> = Result<T, ApiError>;

/// Errors surfaced by both services' HTTP handlers.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    BadRequest(String),

    /// The reference data service answered, but not with a success status.
    #[error("Reference data service error: {message}")]
    UpstreamRejected { status: StatusCode, message: String },

    /// No answer from the reference data service. Safe to retry.
    #[error("Reference data service unavailable: {0}")]
    UpstreamUnavailable(String),

    #[error("repair order {0} has association rows that belong to another order")]
    MalformedAggregate(i32),

    #[error("database error: {0}")]
    Database(#[from] diesel::result::Error),

    #[error("connection pool error: {0}")]
    Pool(String),

    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl ApiError {
    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::UpstreamRejected { status, .. } => *status,
            ApiError::UpstreamUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            ApiError::MalformedAggregate(_)
            | ApiError::Database(_)
            | ApiError::Pool(_)
            | ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn is_retryable(&self) -> bool {
        matches!(self, ApiError::UpstreamUnavailable(_) | ApiError::Pool(_))
    }
}

impl From<bb8::RunError<PoolError>> for ApiError {
    fn from(err: bb8::RunError<PoolError>) -> Self {
        ApiError::Pool(err.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let msg = self.to_string();
        if status.is_server_error() {
            error!(
                error = %msg,
                status = status.as_u16(),
                retryable = self.is_retryable(),
                "request failed"
            );
        }
        (status, Json(ErrorResponse { error: msg })).into_response()
    }
}
