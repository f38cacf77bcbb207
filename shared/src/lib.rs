//! Shared types for the KUPUB pub ordering system
//!
//! Wire types exchanged with the backend: entities, request DTOs, the
//! `{data, error}` response envelope, error codes and realtime
//! notification payloads.

pub mod client;
pub mod error;
pub mod message;
pub mod models;

// Re-exports
pub use error::{ApiError, ApiResponse, ErrorCode};
pub use message::{NotificationKind, OrderNotification};
pub use serde::{Deserialize, Serialize};
