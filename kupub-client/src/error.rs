//! Client error types

use shared::error::{ApiError, ErrorCode};
use thiserror::Error;

use crate::realtime::RealtimeError;
use crate::storage::StorageError;

/// Client error type
#[derive(Debug, Error)]
pub enum ClientError {
    /// HTTP request failed before a response arrived
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The backend answered with an error envelope
    #[error("API error [{code}]: {message}")]
    Api {
        code: ErrorCode,
        message: String,
        details: Option<serde_json::Value>,
    },

    /// The backend answered with an empty body
    #[error("Empty response")]
    EmptyResponse,

    /// Invalid response format
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// Authentication required (no session, or refresh failed)
    #[error("Authentication required")]
    Unauthorized,

    /// Request rejected client-side before sending
    #[error("Validation error: {0}")]
    Validation(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Realtime error: {0}")]
    Realtime(#[from] RealtimeError),

    #[error("Config error: {0}")]
    Config(String),
}

impl From<ApiError> for ClientError {
    fn from(err: ApiError) -> Self {
        ClientError::Api {
            code: err.code,
            message: err.message,
            details: err.details,
        }
    }
}

impl ClientError {
    /// Error code as the UI sees it
    pub fn code(&self) -> ErrorCode {
        match self {
            ClientError::Api { code, .. } => code.clone(),
            ClientError::EmptyResponse => ErrorCode::EmptyResponse,
            ClientError::Unauthorized => ErrorCode::Unauthorized,
            ClientError::Validation(_) => ErrorCode::BadRequest,
            ClientError::Http(_) | ClientError::InvalidResponse(_) | ClientError::Realtime(_) => {
                ErrorCode::NetworkError
            }
            ClientError::Serialization(_) | ClientError::Storage(_) | ClientError::Config(_) => {
                ErrorCode::Other("CLIENT_ERROR".into())
            }
        }
    }

    /// Inline message rendered next to the failed action.
    ///
    /// Backend messages are shown verbatim; everything else falls back to
    /// the default message of its code.
    pub fn user_message(&self) -> String {
        match self {
            ClientError::Api { message, .. } if !message.is_empty() => message.clone(),
            ClientError::Validation(message) => message.clone(),
            other => other.code().message().to_string(),
        }
    }

    /// Whether offering a manual retry makes sense
    pub fn is_retryable(&self) -> bool {
        match self {
            ClientError::Http(e) => !e.is_builder(),
            ClientError::Realtime(_) | ClientError::InvalidResponse(_) => true,
            other => other.code().is_transient(),
        }
    }

    pub fn is_unauthorized(&self) -> bool {
        matches!(
            self,
            ClientError::Unauthorized
                | ClientError::Api {
                    code: ErrorCode::Unauthorized,
                    ..
                }
        )
    }
}

/// Result type for client operations
pub type ClientResult<T> = Result<T, ClientError>;
