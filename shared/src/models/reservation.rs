//! Reservation (예약) Model

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReservationStatus {
    Waiting,
    Seated,
    Completed,
    Cancelled,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Reservation {
    pub id: i64,
    pub department_id: i64,
    pub name: String,
    pub phone: String,
    pub reservation_time: String,
    pub people: u32,
    pub status: ReservationStatus,
    #[serde(default)]
    pub table_id: Option<i64>,
    pub created_at: String,
}

/// `POST /api/{dept}/reservations` body
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReservationRequest {
    pub name: String,
    pub phone: String,
    pub reservation_time: String,
    pub people: u32,
}
