use chrono::{DateTime, Utc};
use derive_more::Display;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::server::database::impl_document;
use crate::server::model::checked_sum;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Display, Serialize, Deserialize)]
pub(crate) enum OrderStatus {
    #[default]
    Pending,
    Preparing,
    Served,
    Paid,
}

impl OrderStatus {
    /// Orders only move forward one step at a time.
    pub fn can_transition_to(self, next: OrderStatus) -> bool {
        use OrderStatus::*;
        self == next
            || matches!(
                (self, next),
                (Pending, Preparing) | (Preparing, Served) | (Served, Paid)
            )
    }

    pub fn is_open(self) -> bool {
        self != OrderStatus::Paid
    }
}

/// Snapshot of a menu item at order time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub(crate) struct OrderLine {
    /// menu item id
    pub id: String,
    pub name: String,
    pub price: Decimal,
    pub qty: u32,
}

impl OrderLine {
    pub fn subtotal(&self) -> Option<Decimal> {
        self.price.checked_mul(Decimal::from(self.qty))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct Order {
    #[serde(default)]
    pub id: String,
    pub table_id: String,
    pub table_number: String,
    pub items: Vec<OrderLine>,
    pub total: Decimal,
    pub status: OrderStatus,
    pub timestamp: DateTime<Utc>,
}

impl_document!(Order, "restaurant_orders", "ord");

pub(crate) fn order_total(lines: &[OrderLine]) -> Option<Decimal> {
    checked_sum(
        lines
            .iter()
            .map(OrderLine::subtotal)
            .collect::<Option<Vec<_>>>()?,
    )
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct CartLine {
    pub item_id: String,
    pub qty: u32,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct OrderPayload {
    pub table_id: String,
    pub items: Vec<CartLine>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn total_sums_lines() {
        let lines = vec![
            OrderLine {
                id: "item_1".to_string(),
                name: "Classic Burger".to_string(),
                price: Decimal::from(18),
                qty: 2,
            },
            OrderLine {
                id: "item_6".to_string(),
                name: "Espresso".to_string(),
                price: Decimal::from(4),
                qty: 1,
            },
        ];
        assert_eq!(order_total(&lines), Some(Decimal::from(40)));
    }

    #[test]
    fn forward_only() {
        assert!(OrderStatus::Pending.can_transition_to(OrderStatus::Preparing));
        assert!(OrderStatus::Served.can_transition_to(OrderStatus::Paid));
        assert!(!OrderStatus::Pending.can_transition_to(OrderStatus::Paid));
        assert!(!OrderStatus::Paid.can_transition_to(OrderStatus::Served));
    }
}
