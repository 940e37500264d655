use derive_more::Display;
use serde::{Deserialize, Serialize};

use crate::server::database::impl_document;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Display, Serialize, Deserialize)]
pub(crate) enum TableStatus {
    #[default]
    Available,
    Occupied,
    Reserved,
}

/// Restaurant table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct RestaurantTable {
    #[serde(default)]
    pub id: String,
    pub number: String,
    pub capacity: u32,
    pub status: TableStatus,
}

impl_document!(RestaurantTable, "restaurant_tables", "t");

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct TablePayload {
    pub number: String,
    pub capacity: u32,
    #[serde(default)]
    pub status: TableStatus,
}
