use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;
use tracing::{error, warn};

/// Main service error type
#[derive(Error, Debug)]
pub enum ServiceError {
    #[error("Invalid file format!")]
    InvalidFileFormat { filename: String },

    #[error("Invalid request: {message}")]
    InvalidRequest { message: String },

    #[error("{0}")]
    Gemini(#[from] GeminiError),

    #[error("{0}")]
    Processing(#[from] ProcessingError),

    #[error("Page {page}: {source}")]
    Page {
        page: u32,
        #[source]
        source: Box<ServiceError>,
    },

    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Internal error: {message}")]
    Internal { message: String },
}

/// Gemini client errors
#[derive(Error, Debug)]
pub enum GeminiError {
    #[error("Connection failed to Gemini at {url}")]
    Connection {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("No Gemini API key configured (set DOCENT__GEMINI__API_KEY or GOOGLE_API_KEY)")]
    MissingApiKey,

    #[error("Generation failed (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("Invalid response from Gemini")]
    InvalidResponse {
        #[source]
        source: serde_json::Error,
    },

    #[error("Gemini returned no text ({reason})")]
    EmptyResponse { reason: String },
}

/// Upload and PDF processing errors
#[derive(Error, Debug)]
pub enum ProcessingError {
    #[error("Failed to load PDFium library")]
    PdfiumUnavailable {
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("Failed to open PDF")]
    PdfLoad {
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("Failed to extract text from page {page}")]
    TextExtraction {
        page: u32,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("IO error")]
    Io(#[source] std::io::Error),
}

/// API error response
#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
}

impl ServiceError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ServiceError::InvalidFileFormat { .. } | ServiceError::InvalidRequest { .. } => {
                StatusCode::BAD_REQUEST
            }
            ServiceError::Gemini(GeminiError::MissingApiKey) => StatusCode::INTERNAL_SERVER_ERROR,
            ServiceError::Gemini(_) => StatusCode::BAD_GATEWAY,
            ServiceError::Processing(
                ProcessingError::PdfLoad { .. } | ProcessingError::TextExtraction { .. },
            ) => StatusCode::UNPROCESSABLE_ENTITY,
            ServiceError::Page { source, .. } => source.status_code(),
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn error_code(&self) -> &'static str {
        match self {
            ServiceError::InvalidFileFormat { .. } => "invalid_file_format",
            ServiceError::InvalidRequest { .. } => "invalid_request",
            ServiceError::Gemini(GeminiError::Connection { .. }) => "model_connection",
            ServiceError::Gemini(GeminiError::MissingApiKey) => "model_api_key_missing",
            ServiceError::Gemini(GeminiError::Api { .. }) => "model_generation",
            ServiceError::Gemini(GeminiError::InvalidResponse { .. }) => "model_invalid_response",
            ServiceError::Gemini(GeminiError::EmptyResponse { .. }) => "model_empty_response",
            ServiceError::Processing(ProcessingError::PdfiumUnavailable { .. }) => {
                "pdfium_unavailable"
            }
            ServiceError::Processing(
                ProcessingError::PdfLoad { .. } | ProcessingError::TextExtraction { .. },
            ) => "pdf_extraction",
            ServiceError::Processing(ProcessingError::Io(_)) => "io_error",
            ServiceError::Page { source, .. } => source.error_code(),
            ServiceError::Config { .. } => "config_error",
            ServiceError::Internal { .. } => "internal_error",
        }
    }
}

impl IntoResponse for ServiceError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if let ServiceError::InvalidFileFormat { filename } = &self {
            warn!(filename = %filename, "Rejected upload with unsupported file type");
        } else if status.is_server_error() {
            error!(
                status = status.as_u16(),
                error = %format_error_chain(&self),
                "Request failed"
            );
        }

        let response = ErrorResponse {
            error: self.to_string(),
            code: Some(self.error_code().to_string()),
        };

        (status, Json(response)).into_response()
    }
}

/// Result type alias for service operations
pub type ServiceResult<T> = Result<T, ServiceError>;

/// Render an error and every `source()` beneath it as `outer: inner: root`.
pub fn format_error_chain(error: &(dyn std::error::Error + 'static)) -> String {
    let mut message = error.to_string();
    let mut current = error.source();
    while let Some(source) = current {
        let text = source.to_string();
        // Transparent wrappers repeat their inner message verbatim
        if !message.ends_with(&text) {
            message.push_str(": ");
            message.push_str(&text);
        }
        current = source.source();
    }
    message
}
