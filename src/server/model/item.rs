use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::server::database::impl_document;

/// Restaurant menu entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct MenuItem {
    #[serde(default)]
    pub id: String,
    pub name: String,
    pub category: String,
    pub price: Decimal,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default = "available")]
    pub is_available: bool,
}

impl_document!(MenuItem, "menu_items", "item");

fn available() -> bool {
    true
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct MenuItemPayload {
    pub name: String,
    pub category: String,
    pub price: Decimal,
    #[serde(default)]
    pub description: String,
    pub image: Option<String>,
    #[serde(default = "available")]
    pub is_available: bool,
}
