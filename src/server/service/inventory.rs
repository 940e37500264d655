use log::{info, warn};

use crate::server::controller::error::ApiError;
use crate::server::database::{Repository, Store};
use crate::server::model::inventory::{InventoryItem, InventoryPayload, StockStatus};
use crate::server::util::validation::{validate_non_negative, validate_required_text, MAX_NAME_LEN};

#[derive(Clone)]
pub(crate) struct InventoryService {
    items: Repository<InventoryItem>,
}

impl InventoryService {
    pub fn new(store: &Store) -> Self {
        Self {
            items: Repository::new(store.clone()),
        }
    }

    pub async fn list(&self) -> Result<Vec<InventoryItem>, ApiError> {
        let mut items = self.items.find_all().await?;
        items.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(items)
    }

    fn validate(payload: &InventoryPayload) -> Result<(), ApiError> {
        validate_required_text(&payload.name, "Item name is required", MAX_NAME_LEN)?;
        validate_required_text(&payload.unit, "Unit is required", 16)?;
        validate_non_negative(payload.quantity, "Quantity cannot be negative")?;
        validate_non_negative(payload.min_threshold, "Minimum threshold cannot be negative")
    }

    fn apply(item: &mut InventoryItem, payload: InventoryPayload) {
        item.name = payload.name.trim().to_string();
        item.quantity = payload.quantity;
        item.unit = payload.unit.trim().to_string();
        item.min_threshold = payload.min_threshold;
        item.refresh_status();
        if item.status == StockStatus::Low {
            warn!("{} is running low ({} {})", item.name, item.quantity, item.unit);
        }
    }

    pub async fn add(&self, payload: InventoryPayload) -> Result<InventoryItem, ApiError> {
        Self::validate(&payload)?;
        let mut item = InventoryItem {
            id: String::new(),
            name: String::new(),
            quantity: payload.quantity,
            unit: String::new(),
            status: StockStatus::Ok,
            min_threshold: payload.min_threshold,
        };
        Self::apply(&mut item, payload);
        let item = self.items.create(item).await?;
        info!("inventory item {} added", item.id);
        Ok(item)
    }

    pub async fn update(&self, id: &str, payload: InventoryPayload) -> Result<InventoryItem, ApiError> {
        Self::validate(&payload)?;
        let mut item = self
            .items
            .find_by_id(id)
            .await?
            .ok_or_else(|| ApiError::not_found("Inventory item"))?;
        Self::apply(&mut item, payload);
        self.items.update(&item).await?;
        Ok(item)
    }

    pub async fn delete(&self, id: &str) -> Result<(), ApiError> {
        self.items.delete(id).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::server::service::testing::seeded_store;
    use rust_decimal::Decimal;

    fn payload(name: &str, quantity: i64, threshold: i64) -> InventoryPayload {
        InventoryPayload {
            name: name.to_string(),
            quantity: Decimal::from(quantity),
            unit: "pcs".to_string(),
            min_threshold: Decimal::from(threshold),
        }
    }

    #[tokio::test]
    async fn status_follows_every_write() {
        let service = InventoryService::new(&seeded_store().await);
        let item = service.add(payload("Napkins", 100, 20)).await.unwrap();
        assert_eq!(item.status, StockStatus::Ok);

        let item = service.update(&item.id, payload("Napkins", 20, 20)).await.unwrap();
        assert_eq!(item.status, StockStatus::Low);

        // Beef Patties restocked
        let item = service.update("inv_2", payload("Beef Patties", 60, 20)).await.unwrap();
        assert_eq!(item.status, StockStatus::Ok);
    }

    #[tokio::test]
    async fn list_is_sorted_and_delete_sticks() {
        let service = InventoryService::new(&seeded_store().await);
        let names: Vec<_> = service.list().await.unwrap().into_iter().map(|i| i.name).collect();
        assert_eq!(names[0], "Beef Patties");
        service.delete("inv_5").await.unwrap();
        assert_eq!(service.list().await.unwrap().len(), 4);
        assert!(matches!(service.delete("inv_5").await, Err(ApiError::NotFound { .. })));
    }

    #[tokio::test]
    async fn negative_quantity_rejected() {
        let service = InventoryService::new(&seeded_store().await);
        assert!(matches!(
            service.add(payload("Forks", -1, 0)).await,
            Err(ApiError::BadRequest { .. })
        ));
    }
}
