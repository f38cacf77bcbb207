//! Typed REST endpoints
//!
//! - [`PublicApi`]: customer-facing, scoped to one department
//! - [`AdminApi`]: department staff, bearer-authenticated
//! - [`AuthApi`]: login / refresh / logout
//! - [`PlatformApi`]: super-admin tenant and account management
//!
//! All of them are thin wrappers over an [`HttpClient`](crate::HttpClient);
//! the department slug is always a path segment.

mod admin;
mod auth;
mod platform;
mod public;

pub use admin::AdminApi;
pub use auth::AuthApi;
pub use platform::PlatformApi;
pub use public::PublicApi;

/// Percent-encode one path segment (RFC 3986 unreserved chars pass through)
pub(crate) fn encode_segment(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for byte in raw.bytes() {
        match byte {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'.' | b'_' | b'~' => {
                out.push(byte as char)
            }
            other => out.push_str(&format!("%{other:02X}")),
        }
    }
    out
}

/// `/api/{dept}{suffix}`
pub(crate) fn dept_path(dept: &str, suffix: &str) -> String {
    format!("/api/{}{}", encode_segment(dept), suffix)
}
