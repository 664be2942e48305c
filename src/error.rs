use axum::http::StatusCode;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum LoggerError {
    #[error("Invalid request body: {0}")]
    InputParseError(String),

    #[error("Failed to fetch file: {status}")]
    RemoteReadError { status: u16 },

    #[error("GitHub API error: {message}")]
    RemoteWriteError { message: String },

    #[error("HTTP request error: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("Content decode error: {0}")]
    DecodeError(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

impl LoggerError {
    /// HTTP status reported to the caller for this failure.
    pub fn status_code(&self) -> StatusCode {
        match self {
            LoggerError::InputParseError(_) => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}
