//! Error types for the gateway layer

use axum::{
    extract::multipart::MultipartError,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// Gateway error types
#[derive(Error, Debug)]
pub enum GatewayError {
    #[error("No file part")]
    MissingFilePart,

    #[error("No selected file")]
    EmptyFilename,

    #[error("Invalid filename")]
    InvalidFilename,

    #[error("Upload decode error: {0}")]
    Multipart(#[from] MultipartError),

    #[error("Storage error: {0}")]
    Io(#[from] std::io::Error),
}

impl GatewayError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            GatewayError::MissingFilePart
            | GatewayError::EmptyFilename
            | GatewayError::InvalidFilename
            | GatewayError::Multipart(_) => StatusCode::BAD_REQUEST,
            GatewayError::Io(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let error_response = json!({
            "error": status.as_str(),
            "message": self.to_string(),
        });

        (status, Json(error_response)).into_response()
    }
}

/// Result type for gateway operations
pub type GatewayResult<T> = Result<T, GatewayError>;
