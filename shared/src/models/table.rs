//! Table Model

use serde::{Deserialize, Serialize};

/// Physical table with floor-plan layout coordinates
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Table {
    pub id: i64,
    #[serde(default)]
    pub department_id: Option<i64>,
    pub code: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub capacity: u32,
    #[serde(default)]
    pub pos_x: i32,
    #[serde(default)]
    pub pos_y: i32,
    #[serde(default)]
    pub width: i32,
    #[serde(default)]
    pub height: i32,
    #[serde(default = "default_active")]
    pub active: bool,
}

fn default_active() -> bool {
    true
}

/// Create table payload
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TableCreate {
    pub code: String,
    pub name: Option<String>,
    pub capacity: Option<u32>,
}

/// Update table payload
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TableUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub capacity: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub active: Option<bool>,
}

/// One entry of `PUT /api/{dept}/admin/tables/layout`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TableLayout {
    pub id: i64,
    pub pos_x: i32,
    pub pos_y: i32,
    pub width: i32,
    pub height: i32,
}

impl From<&Table> for TableLayout {
    fn from(table: &Table) -> Self {
        Self {
            id: table.id,
            pos_x: table.pos_x,
            pos_y: table.pos_y,
            width: table.width,
            height: table.height,
        }
    }
}

/// `PUT /api/{dept}/admin/tables/layout` body
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TableLayoutRequest {
    pub tables: Vec<TableLayout>,
}

impl TableLayoutRequest {
    pub fn from_tables<'a>(tables: impl IntoIterator<Item = &'a Table>) -> Self {
        Self {
            tables: tables.into_iter().map(TableLayout::from).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_defaults_active() {
        let table: Table = serde_json::from_str(r#"{"id": 1, "code": "A1"}"#).unwrap();
        assert!(table.active);
        assert_eq!(table.capacity, 0);
    }

    #[test]
    fn test_layout_request_shape() {
        let table: Table = serde_json::from_str(
            r#"{"id": 4, "code": "B2", "posX": 120, "posY": 40, "width": 80, "height": 60}"#,
        )
        .unwrap();
        let body = serde_json::to_value(TableLayoutRequest::from_tables([&table])).unwrap();
        assert_eq!(body["tables"][0]["id"], 4);
        assert_eq!(body["tables"][0]["posX"], 120);
        assert_eq!(body["tables"][0]["height"], 60);
    }
}
