use log::info;
use rust_decimal::Decimal;

use crate::server::controller::error::ApiError;
use crate::server::database::{Repository, Store};
use crate::server::model::booking::Booking;
use crate::server::model::guest::{Guest, GuestFilter, GuestPayload, LoyaltyTier};
use crate::server::util::time::helper;
use crate::server::util::validation::{
    validate_email, validate_optional_text, validate_required_text, MAX_NAME_LEN, MAX_NOTE_LEN,
};

#[derive(Clone)]
pub(crate) struct GuestService {
    guests: Repository<Guest>,
    bookings: Repository<Booking>,
}

impl GuestService {
    pub fn new(store: &Store) -> Self {
        Self {
            guests: Repository::new(store.clone()),
            bookings: Repository::new(store.clone()),
        }
    }

    /// Sorted by name.
    pub async fn list(&self, filter: &GuestFilter) -> Result<Vec<Guest>, ApiError> {
        let mut guests: Vec<_> = self
            .guests
            .find_all()
            .await?
            .into_iter()
            .filter(|g| filter.matches(g))
            .collect();
        guests.sort_by(|a, b| a.full_name.cmp(&b.full_name));
        Ok(guests)
    }

    pub async fn get(&self, id: &str) -> Result<Guest, ApiError> {
        self.guests
            .find_by_id(id)
            .await?
            .ok_or_else(|| ApiError::not_found("Guest"))
    }

    fn validate(payload: &GuestPayload) -> Result<(), ApiError> {
        validate_required_text(&payload.full_name, "Full name is required", MAX_NAME_LEN)?;
        validate_email(&payload.email)?;
        validate_required_text(&payload.phone, "Phone number is required", 32)?;
        validate_optional_text(Some(&payload.notes), "Notes", MAX_NOTE_LEN)
    }

    /// New guests start at Bronze with no history.
    pub async fn create(&self, payload: GuestPayload) -> Result<Guest, ApiError> {
        Self::validate(&payload)?;
        let guest = self
            .guests
            .create(Guest {
                id: String::new(),
                full_name: payload.full_name.trim().to_string(),
                email: payload.email.trim().to_string(),
                phone: payload.phone.trim().to_string(),
                address: payload.address,
                nationality: payload.nationality,
                passport_number: payload.passport_number,
                loyalty_tier: LoyaltyTier::Bronze,
                loyalty_points: 0,
                total_stays: 0,
                total_spent: Decimal::ZERO,
                notes: payload.notes,
                last_stay: None,
                created_at: helper::get_utc_now(),
            })
            .await?;
        info!("guest {} created", guest.id);
        Ok(guest)
    }

    pub async fn update(&self, id: &str, payload: GuestPayload) -> Result<Guest, ApiError> {
        Self::validate(&payload)?;
        let mut guest = self.get(id).await?;
        guest.full_name = payload.full_name.trim().to_string();
        guest.email = payload.email.trim().to_string();
        guest.phone = payload.phone.trim().to_string();
        guest.address = payload.address;
        guest.nationality = payload.nationality;
        guest.passport_number = payload.passport_number;
        guest.notes = payload.notes;
        if let Some(tier) = payload.loyalty_tier {
            guest.loyalty_tier = tier;
        }
        self.guests.update(&guest).await?;
        Ok(guest)
    }

    pub async fn delete(&self, id: &str) -> Result<(), ApiError> {
        self.guests.delete(id).await?;
        info!("guest {} deleted", id);
        Ok(())
    }

    /// The guest's bookings, newest first.
    pub async fn history(&self, id: &str) -> Result<Vec<Booking>, ApiError> {
        let guest = self.get(id).await?;
        let mut bookings: Vec<_> = self
            .bookings
            .find_all()
            .await?
            .into_iter()
            .filter(|b| b.guest_id.as_deref() == Some(guest.id.as_str()))
            .collect();
        bookings.sort_by(|a, b| b.check_in_date.cmp(&a.check_in_date));
        Ok(bookings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::server::service::testing::seeded_store;

    #[tokio::test]
    async fn delete_removes_exactly_that_guest() {
        let service = GuestService::new(&seeded_store().await);
        let before: Vec<String> = service
            .list(&GuestFilter::default())
            .await
            .unwrap()
            .into_iter()
            .map(|g| g.id)
            .collect();
        service.delete("guest_3").await.unwrap();
        let after: Vec<String> = service
            .list(&GuestFilter::default())
            .await
            .unwrap()
            .into_iter()
            .map(|g| g.id)
            .collect();
        let expected: Vec<String> = before.into_iter().filter(|id| id != "guest_3").collect();
        assert_eq!(after, expected);
        assert!(matches!(service.get("guest_3").await, Err(ApiError::NotFound { .. })));
    }

    #[tokio::test]
    async fn created_guest_starts_at_bronze() {
        let service = GuestService::new(&seeded_store().await);
        let guest = service
            .create(GuestPayload {
                full_name: "Grace Hopper".to_string(),
                email: "grace@example.com".to_string(),
                phone: "+1 555 0199".to_string(),
                address: String::new(),
                nationality: "USA".to_string(),
                passport_number: String::new(),
                notes: String::new(),
                loyalty_tier: Some(LoyaltyTier::Platinum),
            })
            .await
            .unwrap();
        assert_eq!(guest.loyalty_tier, LoyaltyTier::Bronze);
        assert_eq!(guest.loyalty_points, 0);
        let listed = service.list(&GuestFilter::default()).await.unwrap();
        assert!(listed.iter().any(|g| g.id == guest.id));
    }

    #[tokio::test]
    async fn history_lists_the_guests_bookings() {
        let service = GuestService::new(&seeded_store().await);
        let history = service.history("guest_1").await.unwrap();
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].id, "bk_1");
    }

    #[tokio::test]
    async fn tier_filter_and_name_order() {
        let service = GuestService::new(&seeded_store().await);
        let gold = service
            .list(&GuestFilter {
                search: None,
                loyalty_tier: Some(LoyaltyTier::Gold),
            })
            .await
            .unwrap();
        let names: Vec<_> = gold.iter().map(|g| g.full_name.as_str()).collect();
        assert_eq!(names, vec!["Hiroshi Tanaka", "John Smith"]);
    }
}
