//! Department (학과) Model

use serde::{Deserialize, Serialize};

/// Department tenant. Every public and admin route is scoped by `slug`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Department {
    pub id: i64,
    pub slug: String,
    pub name: String,
    #[serde(default)]
    pub active: Option<bool>,
}
