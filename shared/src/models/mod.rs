//! Data models
//!
//! Entities as the backend serializes them (camelCase fields,
//! SCREAMING_SNAKE_CASE enums) plus the request bodies the client sends.
//! All IDs are `i64`; money is integer won.

pub mod department;
pub mod menu;
pub mod order;
pub mod platform;
pub mod reservation;
pub mod session;
pub mod settings;
pub mod table;

// Re-exports
pub use department::*;
pub use menu::*;
pub use order::*;
pub use platform::*;
pub use reservation::*;
pub use session::*;
pub use settings::*;
pub use table::*;
