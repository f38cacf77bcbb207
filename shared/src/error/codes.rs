//! Error codes carried in the `error.code` field of the response envelope
//!
//! The backend uses string codes. Unknown codes are kept verbatim in
//! [`ErrorCode::Other`] so newer backends never break older clients.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// Error code enum
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    // ==================== Backend ====================
    /// Malformed or invalid request
    BadRequest,
    /// Missing or invalid credentials
    Unauthorized,
    /// Authenticated but not allowed
    Forbidden,
    /// Resource does not exist
    NotFound,
    /// Business rule violation (e.g. table already occupied)
    BusinessError,
    /// Unexpected server failure
    InternalError,

    // ==================== Client-synthesized ====================
    /// The request never produced a response
    NetworkError,
    /// The server answered with an empty body
    EmptyResponse,

    /// Any other code, kept verbatim
    Other(String),
}

impl ErrorCode {
    /// Wire representation
    pub fn as_str(&self) -> &str {
        match self {
            ErrorCode::BadRequest => "BAD_REQUEST",
            ErrorCode::Unauthorized => "UNAUTHORIZED",
            ErrorCode::Forbidden => "FORBIDDEN",
            ErrorCode::NotFound => "NOT_FOUND",
            ErrorCode::BusinessError => "BUSINESS_ERROR",
            ErrorCode::InternalError => "INTERNAL_ERROR",
            ErrorCode::NetworkError => "NETWORK_ERROR",
            ErrorCode::EmptyResponse => "EMPTY_RESPONSE",
            ErrorCode::Other(code) => code,
        }
    }

    /// Default user-facing message for codes the client produces itself
    pub fn message(&self) -> &'static str {
        match self {
            ErrorCode::BadRequest => "잘못된 요청입니다.",
            ErrorCode::Unauthorized => "로그인이 필요합니다.",
            ErrorCode::Forbidden => "권한이 없습니다.",
            ErrorCode::NotFound => "요청한 정보를 찾을 수 없습니다.",
            ErrorCode::BusinessError => "요청을 처리할 수 없습니다.",
            ErrorCode::InternalError => "서버 오류가 발생했습니다.",
            ErrorCode::NetworkError => "네트워크 오류가 발생했습니다.",
            ErrorCode::EmptyResponse => "서버 응답이 없습니다.",
            ErrorCode::Other(_) => "알 수 없는 오류가 발생했습니다.",
        }
    }

    /// Whether retrying the same request can succeed
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            ErrorCode::NetworkError | ErrorCode::EmptyResponse | ErrorCode::InternalError
        )
    }
}

impl From<&str> for ErrorCode {
    fn from(value: &str) -> Self {
        match value {
            "BAD_REQUEST" => ErrorCode::BadRequest,
            "UNAUTHORIZED" => ErrorCode::Unauthorized,
            "FORBIDDEN" => ErrorCode::Forbidden,
            "NOT_FOUND" => ErrorCode::NotFound,
            "BUSINESS_ERROR" => ErrorCode::BusinessError,
            "INTERNAL_ERROR" => ErrorCode::InternalError,
            "NETWORK_ERROR" => ErrorCode::NetworkError,
            "EMPTY_RESPONSE" => ErrorCode::EmptyResponse,
            other => ErrorCode::Other(other.to_string()),
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for ErrorCode {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for ErrorCode {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Ok(ErrorCode::from(raw.as_str()))
    }
}
