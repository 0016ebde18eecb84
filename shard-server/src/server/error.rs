//! Request-scoped failures and their HTTP responses.
//!
//! Every failure is reported as a plain-text body. Client errors get 400,
//! anything the client could not have caused gets 500.

use axum::extract::multipart::MultipartError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use shard_core::{ShardError, ValidationError};
use thiserror::Error;
use tracing::{error, warn};

use crate::storage::StorageError;

#[derive(Error, Debug)]
pub enum AppError {
    /// The CSV file could not be read or parsed.
    #[error("Failed to read CSV file: {0}")]
    CsvRead(String),

    /// One of the visualize form fields is absent or empty.
    #[error("Missing data for visualization")]
    MissingData,

    /// The upload form carried no file.
    #[error("No CSV file uploaded")]
    NoUpload,

    #[error("Node validation failed: {0}")]
    Validation(#[from] ValidationError),

    /// Any other problem with the request itself.
    #[error("{0}")]
    BadRequest(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            _ => StatusCode::BAD_REQUEST,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = self.to_string();
        if status.is_server_error() {
            error!("{}", message);
        } else {
            warn!("Rejected request: {}", message);
        }
        (status, message).into_response()
    }
}

impl From<ShardError> for AppError {
    fn from(err: ShardError) -> Self {
        match err {
            ShardError::Validation(e) => AppError::Validation(e),
            ShardError::ColumnNotFound { .. } => AppError::BadRequest(err.to_string()),
            ShardError::Render { .. } => AppError::Internal(err.to_string()),
            ShardError::CsvRead { .. } | ShardError::Io(_) => AppError::CsvRead(err.to_string()),
        }
    }
}

impl From<StorageError> for AppError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::InvalidName(_) | StorageError::InvalidReference(_) => {
                AppError::BadRequest(err.to_string())
            }
            StorageError::NameExhausted(_) | StorageError::Io(_) => {
                AppError::Internal(err.to_string())
            }
        }
    }
}

impl From<MultipartError> for AppError {
    fn from(err: MultipartError) -> Self {
        AppError::BadRequest(format!("Invalid upload: {}", err.body_text()))
    }
}

impl From<minijinja::Error> for AppError {
    fn from(err: minijinja::Error) -> Self {
        AppError::Internal(format!("Template error: {}", err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages_and_status() {
        let err = AppError::MissingData;
        assert_eq!(err.to_string(), "Missing data for visualization");
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);

        let err: AppError = ShardError::CsvRead {
            message: "No columns to parse from file".to_string(),
        }
        .into();
        assert_eq!(
            err.to_string(),
            "Failed to read CSV file: No columns to parse from file"
        );

        let err: AppError = ShardError::from(ValidationError {
            node: "2.5".to_string(),
        })
        .into();
        assert_eq!(
            err.to_string(),
            "Node validation failed: Node 2.5 has an invalid identifier type."
        );

        let err: AppError = StorageError::InvalidReference("../x".to_string()).into();
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);

        let err: AppError = ShardError::Render {
            message: "boom".to_string(),
        }
        .into();
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
