use log::info;

use crate::server::controller::error::ApiError;
use crate::server::database::{Repository, Store};
use crate::server::model::item::{MenuItem, MenuItemPayload};
use crate::server::model::order::{order_total, Order, OrderLine, OrderPayload, OrderStatus};
use crate::server::model::table::{RestaurantTable, TablePayload, TableStatus};
use crate::server::util::time::helper;
use crate::server::util::validation::{
    amount_too_large, validate_max_u32, validate_min_u32, validate_non_negative,
    validate_required_text, MAX_NAME_LEN, MAX_QUANTITY,
};

#[derive(Clone)]
pub(crate) struct RestaurantService {
    menu: Repository<MenuItem>,
    tables: Repository<RestaurantTable>,
    orders: Repository<Order>,
}

impl RestaurantService {
    pub fn new(store: &Store) -> Self {
        Self {
            menu: Repository::new(store.clone()),
            tables: Repository::new(store.clone()),
            orders: Repository::new(store.clone()),
        }
    }

    /// Menu items in one category, or all of them when no category is given.
    pub async fn menu(&self, category: Option<&str>) -> Result<Vec<MenuItem>, ApiError> {
        let category = category.filter(|c| !c.is_empty() && !c.eq_ignore_ascii_case("all"));
        let mut items: Vec<_> = self
            .menu
            .find_all()
            .await?
            .into_iter()
            .filter(|i| category.map_or(true, |c| i.category.eq_ignore_ascii_case(c)))
            .collect();
        items.sort_by(|a, b| a.category.cmp(&b.category).then_with(|| a.name.cmp(&b.name)));
        Ok(items)
    }

    pub async fn create_menu_item(&self, payload: MenuItemPayload) -> Result<MenuItem, ApiError> {
        validate_required_text(&payload.name, "Item name is required", MAX_NAME_LEN)?;
        validate_required_text(&payload.category, "Category is required", MAX_NAME_LEN)?;
        validate_non_negative(payload.price, "Price cannot be negative")?;
        let item = self
            .menu
            .create(MenuItem {
                id: String::new(),
                name: payload.name.trim().to_string(),
                category: payload.category.trim().to_string(),
                price: payload.price,
                description: payload.description,
                image: payload.image,
                is_available: payload.is_available,
            })
            .await?;
        info!("menu item {} added", item.id);
        Ok(item)
    }

    /// Sorted by table number.
    pub async fn tables(&self) -> Result<Vec<RestaurantTable>, ApiError> {
        let mut tables = self.tables.find_all().await?;
        tables.sort_by_key(|t| (t.number.parse::<u32>().unwrap_or(u32::MAX), t.number.clone()));
        Ok(tables)
    }

    pub async fn create_table(&self, payload: TablePayload) -> Result<RestaurantTable, ApiError> {
        validate_required_text(&payload.number, "Table number is required", 16)?;
        validate_min_u32(payload.capacity, 1, "Capacity must be at least 1")?;
        let number = payload.number.trim().to_string();
        if self.tables.find_all().await?.iter().any(|t| t.number == number) {
            return Err(ApiError::conflict(format!("Table {number} already exists")));
        }
        let table = self
            .tables
            .create(RestaurantTable {
                id: String::new(),
                number,
                capacity: payload.capacity,
                status: payload.status,
            })
            .await?;
        Ok(table)
    }

    pub async fn update_table_status(
        &self,
        id: &str,
        status: TableStatus,
    ) -> Result<RestaurantTable, ApiError> {
        let mut table = self.table(id).await?;
        if table.status != status {
            table.status = status;
            self.tables.update(&table).await?;
        }
        Ok(table)
    }

    async fn table(&self, id: &str) -> Result<RestaurantTable, ApiError> {
        self.tables
            .find_by_id(id)
            .await?
            .ok_or_else(|| ApiError::not_found("Table"))
    }

    /// Newest first.
    pub async fn orders(&self) -> Result<Vec<Order>, ApiError> {
        let mut orders = self.orders.find_all().await?;
        orders.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        Ok(orders)
    }

    /// Places an order from a cart. Prices are taken from the menu, not the caller.
    pub async fn create_order(&self, payload: OrderPayload) -> Result<Order, ApiError> {
        if payload.table_id.trim().is_empty() {
            return Err(ApiError::validation("Please select a table"));
        }
        if payload.items.is_empty() {
            return Err(ApiError::validation("Cart is empty"));
        }
        let mut table = self
            .tables
            .find_by_id(&payload.table_id)
            .await?
            .ok_or_else(|| ApiError::validation("Selected table does not exist"))?;

        let mut lines: Vec<OrderLine> = Vec::with_capacity(payload.items.len());
        for cart in payload.items {
            validate_min_u32(cart.qty, 1, "Quantity must be at least 1")?;
            validate_max_u32(cart.qty, MAX_QUANTITY, "Quantity is too large")?;
            let item = self
                .menu
                .find_by_id(&cart.item_id)
                .await?
                .ok_or_else(|| ApiError::validation(format!("Menu item {} does not exist", cart.item_id)))?;
            if !item.is_available {
                return Err(ApiError::validation(format!("{} is not available", item.name)));
            }
            match lines.iter_mut().find(|l| l.id == item.id) {
                Some(line) => {
                    line.qty = line
                        .qty
                        .checked_add(cart.qty)
                        .filter(|qty| *qty <= MAX_QUANTITY)
                        .ok_or_else(|| {
                            ApiError::validation(format!(
                                "Quantity of {} is too large (at most {MAX_QUANTITY})",
                                line.name
                            ))
                        })?;
                }
                None => lines.push(OrderLine {
                    id: item.id,
                    name: item.name,
                    price: item.price,
                    qty: cart.qty,
                }),
            }
        }

        let total = order_total(&lines).ok_or_else(amount_too_large)?;
        let order = self
            .orders
            .create(Order {
                id: String::new(),
                table_id: table.id.clone(),
                table_number: table.number.clone(),
                total,
                items: lines,
                status: OrderStatus::Pending,
                timestamp: helper::get_utc_now(),
            })
            .await?;
        if table.status != TableStatus::Occupied {
            table.status = TableStatus::Occupied;
            self.tables.update(&table).await?;
        }
        info!("order {} placed for table {}, total {}", order.id, order.table_number, order.total);
        Ok(order)
    }

    pub async fn update_order_status(&self, id: &str, status: OrderStatus) -> Result<Order, ApiError> {
        let mut order = self
            .orders
            .find_by_id(id)
            .await?
            .ok_or_else(|| ApiError::not_found("Order"))?;
        if !order.status.can_transition_to(status) {
            return Err(ApiError::illegal_transition(order.status, status));
        }
        if order.status == status {
            return Ok(order);
        }
        order.status = status;
        self.orders.update(&order).await?;

        if status == OrderStatus::Paid {
            let table_busy = self
                .orders
                .find_all()
                .await?
                .iter()
                .any(|o| o.table_id == order.table_id && o.status.is_open());
            if !table_busy {
                if let Some(mut table) = self.tables.find_by_id(&order.table_id).await? {
                    table.status = TableStatus::Available;
                    self.tables.update(&table).await?;
                    info!("table {} released", table.number);
                }
            }
        }
        Ok(order)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::server::model::order::CartLine;
    use crate::server::service::testing::seeded_store;
    use rust_decimal::Decimal;

    fn cart(table_id: &str, items: &[(&str, u32)]) -> OrderPayload {
        OrderPayload {
            table_id: table_id.to_string(),
            items: items
                .iter()
                .map(|(id, qty)| CartLine {
                    item_id: id.to_string(),
                    qty: *qty,
                })
                .collect(),
        }
    }

    #[tokio::test]
    async fn order_total_comes_from_menu_prices() {
        let service = RestaurantService::new(&seeded_store().await);
        let order = service
            .create_order(cart("t1", &[("item_1", 1), ("item_6", 2), ("item_1", 1)]))
            .await
            .unwrap();
        assert_eq!(order.items.len(), 2);
        assert_eq!(order.total, Decimal::from(18 * 2 + 4 * 2));
        let tables = service.tables().await.unwrap();
        assert_eq!(tables[0].status, TableStatus::Occupied);
    }

    #[tokio::test]
    async fn rejects_empty_cart_and_zero_quantity() {
        let service = RestaurantService::new(&seeded_store().await);
        assert!(matches!(
            service.create_order(cart("t1", &[])).await,
            Err(ApiError::BadRequest { .. })
        ));
        assert!(matches!(
            service.create_order(cart("t1", &[("item_2", 0)])).await,
            Err(ApiError::BadRequest { .. })
        ));
        assert!(matches!(
            service.create_order(cart("t9", &[("item_2", 1)])).await,
            Err(ApiError::BadRequest { .. })
        ));
    }

    #[tokio::test]
    async fn quantities_are_capped_after_merging() {
        let service = RestaurantService::new(&seeded_store().await);
        assert!(matches!(
            service.create_order(cart("t1", &[("item_1", u32::MAX), ("item_1", 1)])).await,
            Err(ApiError::BadRequest { .. })
        ));
        let err = service
            .create_order(cart("t1", &[("item_1", 600), ("item_1", 600)]))
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::BadRequest { .. }));
        let order = service
            .create_order(cart("t1", &[("item_1", 500), ("item_1", 499)]))
            .await
            .unwrap();
        assert_eq!(order.items[0].qty, MAX_QUANTITY);
    }

    #[tokio::test]
    async fn paying_last_order_frees_table() {
        let service = RestaurantService::new(&seeded_store().await);
        // ord_1 sits on t2 and is being prepared
        assert!(matches!(
            service.update_order_status("ord_1", OrderStatus::Paid).await,
            Err(ApiError::IllegalTransition { .. })
        ));
        service.update_order_status("ord_1", OrderStatus::Served).await.unwrap();
        service.update_order_status("ord_1", OrderStatus::Paid).await.unwrap();
        let tables = service.tables().await.unwrap();
        assert_eq!(tables[1].status, TableStatus::Available);
    }

    #[tokio::test]
    async fn table_numbers_are_unique() {
        let service = RestaurantService::new(&seeded_store().await);
        let dup = TablePayload {
            number: "3".to_string(),
            capacity: 4,
            status: TableStatus::Available,
        };
        assert!(matches!(service.create_table(dup).await, Err(ApiError::Conflict { .. })));
    }

    #[tokio::test]
    async fn menu_by_category() {
        let service = RestaurantService::new(&seeded_store().await);
        assert_eq!(service.menu(Some("Drinks")).await.unwrap().len(), 2);
        assert_eq!(service.menu(Some("all")).await.unwrap().len(), 6);
    }
}
