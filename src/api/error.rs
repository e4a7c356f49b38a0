use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;
use tracing::error;
use crate::blockchain::ClientError;
use crate::db::StoreError;
use crate::service::ServiceError;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Block explorer unavailable: {0}")]
    BadGateway(String),

    #[error("Block explorer has no data yet: {0}")]
    Unavailable(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Internal server error: {0}")]
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            ApiError::NotFound(_) => (StatusCode::NOT_FOUND, self.to_string()),
            ApiError::BadGateway(_) => (StatusCode::BAD_GATEWAY, self.to_string()),
            ApiError::Unavailable(_) => (
                StatusCode::SERVICE_UNAVAILABLE,
                format!("{}, retry later", self),
            ),
            ApiError::Database(e) => {
                error!("Database error: {}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, "Database error occurred".to_string())
            }
            ApiError::Internal(e) => {
                error!("Internal error: {}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error".to_string())
            }
        };

        let body = Json(json!({
            "error": message,
        }));

        (status, body).into_response()
    }
}

impl From<ClientError> for ApiError {
    fn from(err: ClientError) -> Self {
        match err {
            ClientError::RemoteDataMissing(msg) => ApiError::Unavailable(msg),
            ClientError::RemoteUnavailable(msg) | ClientError::RemoteShapeError(msg) => {
                ApiError::BadGateway(msg)
            }
            ClientError::InvalidInput(msg) => ApiError::Internal(msg),
        }
    }
}

impl From<ServiceError> for ApiError {
    fn from(err: ServiceError) -> Self {
        match err {
            ServiceError::NotFound(id) => ApiError::NotFound(format!("address {}", id)),
            ServiceError::Client(e) => e.into(),
            ServiceError::Store(StoreError::Database(e)) => ApiError::Database(e),
            ServiceError::Store(e @ StoreError::DuplicateAddress(_)) => {
                ApiError::Internal(e.to_string())
            }
        }
    }
}
