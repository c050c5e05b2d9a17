use axum::{
    extract::multipart::MultipartError,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use std::fmt;

use photoboard_core::PhotoError;

pub type AppResult<T> = Result<T, AppError>;

#[derive(Debug)]
pub struct AppError {
    pub status: StatusCode,
    pub message: String,
}

impl AppError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, message)
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, message)
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self::new(StatusCode::CONFLICT, message)
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for AppError {}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        (self.status, self.message).into_response()
    }
}

impl From<PhotoError> for AppError {
    fn from(err: PhotoError) -> Self {
        match err {
            PhotoError::Validation(msg) => Self::bad_request(msg),
            PhotoError::InvalidName(name) => {
                Self::bad_request(format!("Invalid photo filename: {name}"))
            }
            PhotoError::NotFound(name) => {
                Self::not_found(format!("Photo not found: {name}"))
            }
            PhotoError::Duplicate(name) => {
                Self::conflict(format!("Photo already recorded: {name}"))
            }
            PhotoError::StoreRead { .. } | PhotoError::StoreCorrupt { .. } => {
                tracing::error!(error = %err, "photo snapshot read failed");
                Self::internal("Error reading data file")
            }
            PhotoError::StoreWrite { .. } | PhotoError::Serialization(_) => {
                tracing::error!(error = %err, "photo snapshot write failed");
                Self::internal("Error saving data")
            }
            PhotoError::Io { .. } | PhotoError::BlobMissing(_) => {
                tracing::error!(error = %err, "photo file operation failed");
                Self::internal("Error handling photo file")
            }
        }
    }
}

impl From<MultipartError> for AppError {
    fn from(err: MultipartError) -> Self {
        Self::new(err.status(), err.body_text())
    }
}

impl From<askama::Error> for AppError {
    fn from(err: askama::Error) -> Self {
        tracing::error!(error = %err, "page rendering failed");
        Self::internal("Error rendering page")
    }
}
