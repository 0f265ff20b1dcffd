use axum::{
    http::StatusCode,
    response::{IntoResponse, Json as ResponseJson, Response},
};
use db::models::quote::ConversionError;
use services::services::storage::StorageError;
use thiserror::Error;
use utils::response::ApiResponse;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("{0} not found")]
    NotFound(&'static str),
    #[error("validation failed")]
    Validation(Vec<String>),
    #[error("{0}")]
    BadRequest(String),
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),
}

impl From<ConversionError> for ApiError {
    fn from(err: ConversionError) -> Self {
        match err {
            ConversionError::Database(e) => ApiError::Database(e),
            ConversionError::NotFound => ApiError::NotFound("quote"),
            ConversionError::AlreadyConverted => ApiError::BadRequest(err.to_string()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, body): (StatusCode, ApiResponse<()>) = match self {
            ApiError::Validation(errors) => (
                StatusCode::BAD_REQUEST,
                ApiResponse::validation_errors(errors),
            ),
            ApiError::BadRequest(message) => {
                (StatusCode::BAD_REQUEST, ApiResponse::error(message))
            }
            ApiError::NotFound(entity) => (
                StatusCode::NOT_FOUND,
                ApiResponse::error(format!("{entity} not found")),
            ),
            ApiError::Database(sqlx::Error::RowNotFound) => {
                (StatusCode::NOT_FOUND, ApiResponse::error("not found"))
            }
            ApiError::Storage(StorageError::NotFound) => {
                (StatusCode::NOT_FOUND, ApiResponse::error("file not found"))
            }
            ApiError::Storage(StorageError::InvalidName) => {
                (StatusCode::BAD_REQUEST, ApiResponse::error("invalid file name"))
            }
            other => {
                tracing::error!("request failed: {}", other);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ApiResponse::error("Internal server error"),
                )
            }
        };
        (status, ResponseJson(body)).into_response()
    }
}
