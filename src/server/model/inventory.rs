use derive_more::Display;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::server::database::impl_document;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, Serialize, Deserialize)]
pub(crate) enum StockStatus {
    #[serde(rename = "OK")]
    #[display("OK")]
    Ok,
    Low,
}

impl StockStatus {
    pub fn derive(quantity: Decimal, min_threshold: Decimal) -> Self {
        if quantity <= min_threshold {
            StockStatus::Low
        } else {
            StockStatus::Ok
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct InventoryItem {
    #[serde(default)]
    pub id: String,
    pub name: String,
    pub quantity: Decimal,
    pub unit: String,
    pub status: StockStatus,
    pub min_threshold: Decimal,
}

impl_document!(InventoryItem, "inventory", "inv");

impl InventoryItem {
    pub fn refresh_status(&mut self) {
        self.status = StockStatus::derive(self.quantity, self.min_threshold);
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct InventoryPayload {
    pub name: String,
    pub quantity: Decimal,
    pub unit: String,
    pub min_threshold: Decimal,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn low_at_or_below_threshold() {
        assert_eq!(StockStatus::derive(Decimal::from(20), Decimal::from(20)), StockStatus::Low);
        assert_eq!(StockStatus::derive(Decimal::from(21), Decimal::from(20)), StockStatus::Ok);
        assert_eq!(serde_json::to_string(&StockStatus::Ok).unwrap(), "\"OK\"");
    }
}
