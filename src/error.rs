use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use miette::Diagnostic;
use thiserror::Error;

use crate::model::ErrorBody;

/// Message returned when a request carries no image
pub const MISSING_IMAGE_MESSAGE: &str = "No image data provided";

/// Main error type for the application
#[derive(Debug, Error, Diagnostic)]
pub enum Error {
    #[error("No image data provided")]
    #[diagnostic(code(parking_reminder::missing_image))]
    MissingImage,

    #[error("{message}")]
    #[diagnostic(code(parking_reminder::invalid_request))]
    InvalidRequest { status: StatusCode, message: String },

    #[error("{0}")]
    #[diagnostic(code(parking_reminder::upstream))]
    Upstream(String),

    #[error(transparent)]
    #[diagnostic(code(parking_reminder::http))]
    Http(#[from] reqwest::Error),

    #[error("Serialization error: {0}")]
    #[diagnostic(code(parking_reminder::serialization))]
    Serialization(String),

    #[error("Environment error: {0}")]
    #[diagnostic(code(parking_reminder::environment))]
    Environment(String),

    #[error("Configuration error: {0}")]
    #[diagnostic(code(parking_reminder::config))]
    Config(String),

    #[error(transparent)]
    #[diagnostic(code(parking_reminder::io))]
    Io(#[from] std::io::Error),

    #[error("Other error: {0}")]
    #[diagnostic(code(parking_reminder::other))]
    Other(String),
}

impl Error {
    /// HTTP status reported to the caller for this error
    pub fn status(&self) -> StatusCode {
        match self {
            Error::MissingImage => StatusCode::BAD_REQUEST,
            Error::InvalidRequest { status, .. } => *status,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

// A request without a JSON content type has no readable body, which is the
// same as not sending an image at all.
impl From<JsonRejection> for Error {
    fn from(rejection: JsonRejection) -> Self {
        match rejection {
            JsonRejection::MissingJsonContentType(_) => Error::MissingImage,
            other => Error::InvalidRequest {
                status: other.status(),
                message: other.body_text(),
            },
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Serialization(err.to_string())
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = ErrorBody {
            error: self.to_string(),
        };
        (status, Json(body)).into_response()
    }
}

/// Type alias for Result with our Error type
pub type AppResult<T> = Result<T, Error>;

/// Helper to create environment errors
pub fn env_error(var: &str) -> Error {
    Error::Environment(format!("Missing environment variable: {}", var))
}

/// Helper to create configuration errors
pub fn config_error(message: &str) -> Error {
    Error::Config(message.to_string())
}

/// Helper to create upstream model errors
pub fn upstream_error(message: &str) -> Error {
    Error::Upstream(message.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_image_is_client_error() {
        let err = Error::MissingImage;
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
        assert_eq!(err.to_string(), MISSING_IMAGE_MESSAGE);
    }

    #[test]
    fn test_upstream_message_passes_through() {
        let err = upstream_error("401 Incorrect API key provided");
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.to_string(), "401 Incorrect API key provided");
    }

    #[test]
    fn test_invalid_request_keeps_status() {
        let err = Error::InvalidRequest {
            status: StatusCode::PAYLOAD_TOO_LARGE,
            message: "length limit exceeded".to_string(),
        };
        assert_eq!(err.status(), StatusCode::PAYLOAD_TOO_LARGE);
        assert_eq!(err.to_string(), "length limit exceeded");
    }

    #[test]
    fn test_startup_errors_map_to_server_error() {
        assert_eq!(
            env_error("OPENAI_API_KEY").status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            config_error("bad port").to_string(),
            "Configuration error: bad port"
        );
    }
}
