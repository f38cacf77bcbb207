//! Error model shared with the backend
//!
//! The backend wraps every response in an envelope:
//!
//! - success: `{ "data": {...}, "error": null }`
//! - failure: `{ "data": null, "error": { "code": "...", "message": "..." } }`
//!
//! - [`ErrorCode`]: the codes the backend emits plus the two the client
//!   synthesizes (`NETWORK_ERROR`, `EMPTY_RESPONSE`)
//! - [`ApiError`]: the `error` half of the envelope
//! - [`ApiResponse`]: the envelope itself
//!
//! # Example
//!
//! ```
//! use shared::error::{ApiError, ApiResponse, ErrorCode};
//!
//! let err = ApiError::new(ErrorCode::NotFound, "주문을 찾을 수 없습니다.");
//! let resp = ApiResponse::<()>::failure(err);
//! assert!(resp.is_error());
//! ```

mod codes;
mod types;

pub use codes::ErrorCode;
pub use types::{ApiError, ApiResponse};
