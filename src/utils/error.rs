use crate::domain::model::FetchErrorKind;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BlogError {
    #[error("HTTP client error: {0}")]
    ApiError(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Request to {url} failed: {kind}")]
    FetchError { url: String, kind: FetchErrorKind },

    #[error("Unexpected response from {url}: {message}")]
    ResponseShapeError { url: String, message: String },

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Invalid value '{value}' for '{field}': {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Validation error: {message}")]
    ValidationError { message: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorSeverity {
    /// The upstream API misbehaved; retrying later may help.
    Medium,
    /// The request or the response could not be processed.
    High,
    /// Nothing will work until the configuration is fixed.
    Critical,
}

impl BlogError {
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            BlogError::ApiError(_)
            | BlogError::FetchError { .. }
            | BlogError::ResponseShapeError { .. } => ErrorSeverity::Medium,
            BlogError::IoError(_)
            | BlogError::SerializationError(_)
            | BlogError::ValidationError { .. } => ErrorSeverity::High,
            BlogError::ConfigError { .. } | BlogError::InvalidConfigValueError { .. } => {
                ErrorSeverity::Critical
            }
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self {
            BlogError::FetchError {
                kind: FetchErrorKind::Timeout,
                ..
            } => "The content API is slow to respond; retry or raise timeout_seconds",
            BlogError::FetchError { .. } | BlogError::ApiError(_) => {
                "Check that the content API is reachable and api.base_url is correct"
            }
            BlogError::ResponseShapeError { .. } | BlogError::SerializationError(_) => {
                "The content API returned an unexpected payload; check api.base_url points at a WordPress REST root"
            }
            BlogError::IoError(_) => "Check file paths and permissions",
            BlogError::ValidationError { .. } => "Check the command arguments",
            BlogError::ConfigError { .. } | BlogError::InvalidConfigValueError { .. } => {
                "Fix the configuration file or command-line overrides"
            }
        }
    }
}

pub type Result<T> = std::result::Result<T, BlogError>;
