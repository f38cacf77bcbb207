//! Error types and API response structures

use super::codes::ErrorCode;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

/// The `error` half of the response envelope
#[derive(Debug, Clone, PartialEq, Error, Serialize, Deserialize)]
#[error("[{code}] {message}")]
pub struct ApiError {
    /// The error code identifying the type of error
    pub code: ErrorCode,
    /// Human-readable message, shown to the user verbatim
    pub message: String,
    /// Optional structured details
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<Value>,
}

impl ApiError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            details: None,
        }
    }

    /// Error carrying the default message of its code
    pub fn from_code(code: ErrorCode) -> Self {
        let message = code.message().to_string();
        Self::new(code, message)
    }

    pub fn with_details(mut self, details: Value) -> Self {
        self.details = Some(details);
        self
    }

    pub fn network(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::NetworkError, message)
    }

    pub fn empty_response() -> Self {
        Self::from_code(ErrorCode::EmptyResponse)
    }
}

/// Unified API response envelope
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    #[serde(default)]
    pub data: Option<T>,
    #[serde(default)]
    pub error: Option<ApiError>,
}

impl<T> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            data: Some(data),
            error: None,
        }
    }

    pub fn failure(error: ApiError) -> Self {
        Self {
            data: None,
            error: Some(error),
        }
    }

    pub fn is_error(&self) -> bool {
        self.error.is_some()
    }

    /// Collapse the envelope into a `Result`, `error` taking precedence
    pub fn into_result(self) -> Result<Option<T>, ApiError> {
        match self.error {
            Some(err) => Err(err),
            None => Ok(self.data),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_success_envelope() {
        let resp: ApiResponse<i32> = serde_json::from_str(r#"{"data": 7, "error": null}"#).unwrap();
        assert_eq!(resp.into_result().unwrap(), Some(7));
    }

    #[test]
    fn test_parse_error_envelope() {
        let resp: ApiResponse<i32> = serde_json::from_str(
            r#"{"data": null, "error": {"code": "NOT_FOUND", "message": "없음"}}"#,
        )
        .unwrap();
        let err = resp.into_result().unwrap_err();
        assert_eq!(err.code, ErrorCode::NotFound);
        assert_eq!(err.message, "없음");
    }

    #[test]
    fn test_missing_fields_default_to_none() {
        let resp: ApiResponse<i32> = serde_json::from_str("{}").unwrap();
        assert!(!resp.is_error());
        assert_eq!(resp.into_result().unwrap(), None);
    }

    #[test]
    fn test_error_display_includes_code() {
        let err = ApiError::from_code(ErrorCode::EmptyResponse);
        assert_eq!(err.to_string(), "[EMPTY_RESPONSE] 서버 응답이 없습니다.");
    }
}
