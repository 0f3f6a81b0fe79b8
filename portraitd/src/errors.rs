use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error as ThisError;

/// Failure taxonomy for the transform pipeline.
///
/// Every variant is terminal for its request: the handler short-circuits to
/// an error response and nothing is retried. Conversion into the wire shape
/// happens exactly once, in the [`IntoResponse`] impl, so no error crosses
/// the HTTP boundary unconverted.
#[derive(ThisError, Debug)]
pub enum Error {
    /// Multipart body carried no image field
    #[error("No image file provided")]
    MissingFile,

    /// Upload declared a MIME type outside the accepted JPEG set
    #[error("Only JPEG and JPG files are allowed")]
    InvalidFileType { mime_type: String },

    /// Upload exceeds the configured size ceiling
    #[error("File size exceeds maximum allowed size of {limit} bytes ({} MB)", .limit / (1024 * 1024))]
    FileTooLarge { size: u64, limit: u64 },

    /// Invalid request data, e.g. an unreadable multipart body
    #[error("{message}")]
    BadRequest { message: String },

    /// Server started without an upstream credential
    #[error("Server configuration error: API key not found")]
    Configuration,

    /// Upstream call succeeded but returned no candidates
    #[error("No response generated from AI model")]
    EmptyResponse,

    /// Upstream candidate carried no content parts
    #[error("Invalid response format from AI model")]
    MalformedResponse,

    /// Upstream responded, but no part carried inline image data
    #[error("No image data found in AI response")]
    NoImageInResponse,

    /// Upstream rejected the server-held credential
    #[error("Invalid API key. Please check your Gemini API key and try again.")]
    InvalidCredential,

    /// Upstream reported quota exhaustion
    #[error("API quota exceeded. Please try again later.")]
    QuotaExceeded,

    /// Any other upstream failure, carrying the upstream message verbatim
    #[error("{message}")]
    Upstream { message: String },
}

impl Error {
    pub fn status_code(&self) -> StatusCode {
        match self {
            Error::MissingFile | Error::InvalidFileType { .. } | Error::BadRequest { .. } => StatusCode::BAD_REQUEST,
            Error::FileTooLarge { .. } => StatusCode::PAYLOAD_TOO_LARGE,
            Error::InvalidCredential => StatusCode::UNAUTHORIZED,
            Error::QuotaExceeded => StatusCode::TOO_MANY_REQUESTS,
            Error::Configuration
            | Error::EmptyResponse
            | Error::MalformedResponse
            | Error::NoImageInResponse
            | Error::Upstream { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Returns a user-safe error message, without leaking internal implementation details
    pub fn user_message(&self) -> String {
        match self {
            Error::Upstream { message } if message.is_empty() => "Failed to process image. Please try again.".to_string(),
            other => other.to_string(),
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        // Log full error details for debugging - different log levels based on severity
        match &self {
            Error::Configuration => {
                tracing::error!("Configuration error: {}", self);
            }
            Error::EmptyResponse | Error::MalformedResponse | Error::NoImageInResponse | Error::Upstream { .. } => {
                tracing::error!("Upstream failure: {}", self);
            }
            Error::InvalidCredential | Error::QuotaExceeded => {
                tracing::warn!("Upstream rejection: {}", self);
            }
            Error::InvalidFileType { mime_type } => {
                tracing::debug!(mime_type = %mime_type, "Client error: {}", self);
            }
            Error::FileTooLarge { size, limit } => {
                tracing::debug!(size, limit, "Client error: {}", self);
            }
            Error::MissingFile | Error::BadRequest { .. } => {
                tracing::debug!("Client error: {}", self);
            }
        }

        let status = self.status_code();
        let body = json!({
            "success": false,
            "error": self.user_message(),
        });

        (status, axum::response::Json(body)).into_response()
    }
}

/// Type alias for gateway operation results
pub type Result<T> = std::result::Result<T, Error>;
