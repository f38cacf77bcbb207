//! Menu Model

use serde::{Deserialize, Serialize};

use super::Department;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MenuCategory {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub display_order: i32,
}

/// Menu item. `price` is whole won.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MenuItem {
    pub id: i64,
    pub category_id: i64,
    pub name: String,
    pub price: i64,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub display_order: i32,
    #[serde(default)]
    pub sold_out: bool,
}

/// `GET /api/{dept}/menus` payload
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MenuResponse {
    #[serde(default)]
    pub department: Option<Department>,
    #[serde(default)]
    pub categories: Vec<MenuCategory>,
    #[serde(default)]
    pub menus: Vec<MenuItem>,
}

impl MenuResponse {
    /// Menus of one category, in display order
    pub fn menus_in(&self, category_id: i64) -> Vec<&MenuItem> {
        let mut items: Vec<&MenuItem> = self
            .menus
            .iter()
            .filter(|m| m.category_id == category_id)
            .collect();
        items.sort_by_key(|m| m.display_order);
        items
    }
}

/// Create menu payload
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MenuCreate {
    pub category_id: i64,
    pub name: String,
    pub price: i64,
    pub description: Option<String>,
    pub image_url: Option<String>,
    pub display_order: Option<i32>,
}

/// Update menu payload
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MenuUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_order: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sold_out: Option<bool>,
}

/// Create / update category payload
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryUpsert {
    pub name: String,
    pub display_order: Option<i32>,
}
