//! Guest Session (세션) Model
//!
//! A session is one continuous visit: created by a reservation, a QR scan
//! or a typed table code, spanning zero or more orders.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SessionType {
    Reservation,
    Qr,
    Code,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SessionStatus {
    Active,
    Closed,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub id: i64,
    pub department_id: i64,
    #[serde(rename = "type")]
    pub session_type: SessionType,
    #[serde(default)]
    pub reservation_id: Option<i64>,
    #[serde(default)]
    pub table_id: Option<i64>,
    #[serde(default)]
    pub table_code: Option<String>,
    #[serde(default)]
    pub session_code: Option<String>,
    #[serde(default)]
    pub guest_name: String,
    #[serde(default)]
    pub guest_phone: Option<String>,
    #[serde(default)]
    pub people: u32,
    pub status: SessionStatus,
    pub created_at: String,
    #[serde(default)]
    pub closed_at: Option<String>,
}

impl Session {
    pub fn is_active(&self) -> bool {
        self.status == SessionStatus::Active
    }

    pub fn has_table(&self) -> bool {
        self.table_id.is_some()
    }
}

/// `POST /api/{dept}/sessions/start` body
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionStartRequest {
    #[serde(rename = "type")]
    pub session_type: SessionType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reservation_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub table_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session_code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub guest_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub people: Option<u32>,
}

impl SessionStartRequest {
    pub fn reservation(reservation_id: i64) -> Self {
        Self {
            session_type: SessionType::Reservation,
            reservation_id: Some(reservation_id),
            table_id: None,
            session_code: None,
            guest_name: None,
            people: None,
        }
    }

    pub fn code(session_code: impl Into<String>) -> Self {
        Self {
            session_type: SessionType::Code,
            reservation_id: None,
            table_id: None,
            session_code: Some(session_code.into()),
            guest_name: None,
            people: None,
        }
    }

    pub fn qr(table_id: i64) -> Self {
        Self {
            session_type: SessionType::Qr,
            reservation_id: None,
            table_id: Some(table_id),
            session_code: None,
            guest_name: None,
            people: None,
        }
    }

    pub fn with_guest(mut self, name: impl Into<String>, people: u32) -> Self {
        self.guest_name = Some(name.into());
        self.people = Some(people);
        self
    }
}

/// `PATCH /api/{dept}/admin/sessions/{id}/assign-table` body
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssignTableRequest {
    pub table_id: i64,
}
