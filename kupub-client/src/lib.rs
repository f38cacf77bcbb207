//! KUPUB client SDK
//!
//! Client side of the KUPUB multi-tenant pub ordering platform: typed REST
//! endpoints with bearer/refresh auth, persisted client stores (cart,
//! session, admin auth), service-hub projections, theming, and a realtime
//! STOMP channel with reconciliation workers.
//!
//! Start from [`KupubClient::builder`].

pub mod api;
pub mod auth;
pub mod cart;
pub mod client;
pub mod config;
pub mod error;
pub mod http;
pub mod hub;
pub mod logger;
pub mod onboarding;
pub mod payment_watch;
pub mod presentation;
pub mod realtime;
pub mod reconcile;
pub mod session_store;
pub mod storage;
pub mod theme;

pub use client::{KupubClient, KupubClientBuilder};
pub use config::{ClientConfig, RealtimeConfig};
pub use error::{ClientError, ClientResult};
pub use http::{HttpClient, NetworkHttpClient};

// Re-export shared types for convenience
pub use shared::error::{ApiError, ErrorCode};
pub use shared::message::{NotificationKind, OrderNotification};
