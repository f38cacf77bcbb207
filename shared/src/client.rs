//! Auth request/response types
//!
//! Admin and super-admin accounts authenticate against `/api/auth`.
//! Requests under that prefix never carry a bearer token.

use serde::{Deserialize, Serialize};

// =============================================================================
// Auth API DTOs
// =============================================================================

/// Account role
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    /// Platform operator, manages departments and accounts
    SuperAdmin,
    /// Department administrator
    DeptAdmin,
    Staff,
}

impl Role {
    pub fn is_super_admin(self) -> bool {
        self == Role::SuperAdmin
    }
}

/// Login request
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
    /// Required for department accounts, omitted for super-admins
    #[serde(skip_serializing_if = "Option::is_none")]
    pub department_slug: Option<String>,
}

/// Login response data
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub access_token: String,
    pub refresh_token: String,
    pub username: String,
    #[serde(default)]
    pub department_id: Option<i64>,
    #[serde(default)]
    pub department_slug: Option<String>,
    pub role: Role,
}

impl LoginResponse {
    pub fn user(&self) -> AuthUser {
        AuthUser {
            username: self.username.clone(),
            department_id: self.department_id,
            department_slug: self.department_slug.clone(),
            role: self.role,
        }
    }
}

/// Authenticated account as kept client-side
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthUser {
    pub username: String,
    #[serde(default)]
    pub department_id: Option<i64>,
    #[serde(default)]
    pub department_slug: Option<String>,
    pub role: Role,
}

/// Body of `/api/auth/refresh` and `/api/auth/logout`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshRequest {
    pub refresh_token: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshResponse {
    pub access_token: String,
}
