use std::sync::Arc;

use log::{info, warn};
use rand::Rng;
use tokio::sync::Mutex;

use crate::server::controller::error::ApiError;
use crate::server::database::{Repository, Store};
use crate::server::model::booking::{
    nights, stay_total, Booking, BookingFilter, BookingPayload, BookingStatus, PaymentStatus,
};
use crate::server::model::room::Room;
use crate::server::util::time::helper;
use crate::server::util::validation::{
    amount_too_large, validate_email, validate_min_u32, validate_optional_text,
    validate_required_text, MAX_NAME_LEN, MAX_NOTE_LEN,
};

const BOOKING_NUMBER_ATTEMPTS: usize = 50;

#[derive(Clone)]
pub(crate) struct BookingService {
    bookings: Repository<Booking>,
    rooms: Repository<Room>,
    /// Held from the availability check until the write lands.
    write_lock: Arc<Mutex<()>>,
}

impl BookingService {
    pub fn new(store: &Store) -> Self {
        Self {
            bookings: Repository::new(store.clone()),
            rooms: Repository::new(store.clone()),
            write_lock: Arc::new(Mutex::new(())),
        }
    }

    pub async fn all(&self) -> Result<Vec<Booking>, ApiError> {
        Ok(self.bookings.find_all().await?)
    }

    /// Newest first.
    pub async fn list(&self, filter: &BookingFilter) -> Result<Vec<Booking>, ApiError> {
        let mut bookings: Vec<_> = self
            .bookings
            .find_all()
            .await?
            .into_iter()
            .filter(|b| filter.matches(b))
            .collect();
        bookings.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(bookings)
    }

    /// Bookings made under one email address, newest first.
    pub async fn for_email(&self, email: &str) -> Result<Vec<Booking>, ApiError> {
        let email = email.trim().to_lowercase();
        let mut bookings: Vec<_> = self
            .bookings
            .find_all()
            .await?
            .into_iter()
            .filter(|b| b.email.to_lowercase() == email)
            .collect();
        bookings.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(bookings)
    }

    pub async fn get(&self, id: &str) -> Result<Booking, ApiError> {
        self.bookings
            .find_by_id(id)
            .await?
            .ok_or_else(|| ApiError::not_found("Booking"))
    }

    fn validate(payload: &BookingPayload) -> Result<(), ApiError> {
        validate_required_text(&payload.guest_name, "Guest name is required", MAX_NAME_LEN)?;
        validate_email(&payload.email)?;
        validate_required_text(&payload.phone, "Phone number is required", 32)?;
        validate_min_u32(payload.guests, 1, "At least one guest is required")?;
        validate_optional_text(Some(&payload.notes), "Notes", MAX_NOTE_LEN)?;
        if payload.check_out_date <= payload.check_in_date {
            return Err(ApiError::validation("Check-out date must be after check-in date"));
        }
        Ok(())
    }

    async fn room(&self, id: &str) -> Result<Room, ApiError> {
        self.rooms
            .find_by_id(id)
            .await?
            .ok_or_else(|| ApiError::validation("Selected room does not exist"))
    }

    /// The room must exist and be free for `[check_in, check_out)`.
    async fn bookable_room(&self, payload: &BookingPayload, own_id: Option<&str>) -> Result<Room, ApiError> {
        let room = self.room(&payload.room_id).await?;
        let clash = self.bookings.find_all().await?.into_iter().find(|b| {
            Some(b.id.as_str()) != own_id
                && b.room_id == room.id
                && b.status.is_active()
                && b.overlaps(payload.check_in_date, payload.check_out_date)
        });
        if let Some(clash) = clash {
            warn!(
                "room {} already booked by {} for overlapping dates",
                room.room_number, clash.booking_number
            );
            return Err(ApiError::conflict(format!(
                "Room {} is already booked for the selected dates",
                room.room_number
            )));
        }
        Ok(room)
    }

    /// `BK-YYYYMMDD-NNN`, redrawn until it does not collide.
    async fn next_booking_number(&self) -> Result<String, ApiError> {
        let taken: Vec<String> = self
            .bookings
            .find_all()
            .await?
            .into_iter()
            .map(|b| b.booking_number)
            .collect();
        let day = helper::today().format("%Y%m%d").to_string();
        let mut rng = rand::thread_rng();
        for _ in 0..BOOKING_NUMBER_ATTEMPTS {
            let candidate = format!("BK-{day}-{:03}", rng.gen_range(1..1000));
            if !taken.contains(&candidate) {
                return Ok(candidate);
            }
        }
        Err(ApiError::conflict("Could not allocate a booking number, please retry"))
    }

    pub async fn create(&self, payload: BookingPayload) -> Result<Booking, ApiError> {
        Self::validate(&payload)?;
        let status = payload.status.unwrap_or(BookingStatus::Pending);
        if !matches!(status, BookingStatus::Pending | BookingStatus::Confirmed) {
            return Err(ApiError::validation("New bookings must be pending or confirmed"));
        }
        let _guard = self.write_lock.lock().await;
        let room = self.bookable_room(&payload, None).await?;
        let total_amount = stay_total(room.price, nights(payload.check_in_date, payload.check_out_date))
            .ok_or_else(amount_too_large)?;
        let booking = Booking {
            id: String::new(),
            booking_number: self.next_booking_number().await?,
            guest_id: payload.guest_id.filter(|g| !g.is_empty()),
            guest_name: payload.guest_name.trim().to_string(),
            email: payload.email.trim().to_string(),
            phone: payload.phone.trim().to_string(),
            total_amount,
            room_id: room.id,
            room_number: room.room_number,
            room_type: room.room_type_name,
            check_in_date: payload.check_in_date,
            check_out_date: payload.check_out_date,
            status,
            payment_status: payload.payment_status.unwrap_or(PaymentStatus::Pending),
            guests: payload.guests,
            notes: payload.notes,
            created_at: helper::get_utc_now(),
        };
        let booking = self.bookings.create(booking).await?;
        info!("booking {} created for room {}", booking.booking_number, booking.room_number);
        Ok(booking)
    }

    /// Rooms and dates are re-checked only while the stay is still open, and
    /// the total is recomputed only when the room or the dates move.
    pub async fn update(&self, id: &str, payload: BookingPayload) -> Result<Booking, ApiError> {
        Self::validate(&payload)?;
        let _guard = self.write_lock.lock().await;
        let mut booking = self.get(id).await?;
        if let Some(status) = payload.status {
            if !booking.status.can_transition_to(status) {
                return Err(ApiError::illegal_transition(booking.status, status));
            }
            booking.status = status;
        }
        let stay_moved = booking.room_id != payload.room_id
            || booking.check_in_date != payload.check_in_date
            || booking.check_out_date != payload.check_out_date;
        if booking.status.is_open() {
            let room = self.bookable_room(&payload, Some(id)).await?;
            if stay_moved {
                booking.reassign(room, &payload)?;
            }
        } else if stay_moved {
            let room = self.room(&payload.room_id).await?;
            booking.reassign(room, &payload)?;
        }
        booking.guest_id = payload.guest_id.filter(|g| !g.is_empty()).or(booking.guest_id);
        booking.guest_name = payload.guest_name.trim().to_string();
        booking.email = payload.email.trim().to_string();
        booking.phone = payload.phone.trim().to_string();
        booking.guests = payload.guests;
        booking.notes = payload.notes;
        if let Some(payment_status) = payload.payment_status {
            booking.payment_status = payment_status;
        }
        self.bookings.update(&booking).await?;
        Ok(booking)
    }

    pub async fn update_status(&self, id: &str, status: BookingStatus) -> Result<Booking, ApiError> {
        let _guard = self.write_lock.lock().await;
        let mut booking = self.get(id).await?;
        if !booking.status.can_transition_to(status) {
            return Err(ApiError::illegal_transition(booking.status, status));
        }
        if booking.status != status {
            info!("booking {} {} -> {}", booking.booking_number, booking.status, status);
            booking.status = status;
            self.bookings.update(&booking).await?;
        }
        Ok(booking)
    }

    pub async fn delete(&self, id: &str) -> Result<(), ApiError> {
        let _guard = self.write_lock.lock().await;
        self.bookings.delete(id).await?;
        info!("booking {} deleted", id);
        Ok(())
    }
}

impl Booking {
    fn reassign(&mut self, room: Room, payload: &BookingPayload) -> Result<(), ApiError> {
        self.total_amount = stay_total(room.price, nights(payload.check_in_date, payload.check_out_date))
            .ok_or_else(amount_too_large)?;
        self.room_id = room.id;
        self.room_number = room.room_number;
        self.room_type = room.room_type_name;
        self.check_in_date = payload.check_in_date;
        self.check_out_date = payload.check_out_date;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::server::model::booking::tests::date;
    use crate::server::database::memory::Latency;
    use crate::server::service::testing::{seeded_store, seeded_store_with_latency};
    use chrono::NaiveDate;
    use rust_decimal::Decimal;

    fn payload(room_id: &str, check_in: NaiveDate, check_out: NaiveDate) -> BookingPayload {
        BookingPayload {
            guest_id: None,
            guest_name: "Ada Lovelace".to_string(),
            email: "ada@example.com".to_string(),
            phone: "+44 20 0000 0000".to_string(),
            room_id: room_id.to_string(),
            check_in_date: check_in,
            check_out_date: check_out,
            guests: 2,
            notes: String::new(),
            status: None,
            payment_status: None,
        }
    }

    #[tokio::test]
    async fn total_is_rate_times_nights() {
        let service = BookingService::new(&seeded_store().await);
        // room 5 is a 99/night standard room
        let booking = service
            .create(payload("5", date(2024, 4, 1), date(2024, 4, 4)))
            .await
            .unwrap();
        assert_eq!(booking.total_amount, Decimal::from(297));
        assert_eq!(booking.status, BookingStatus::Pending);
        assert!(booking.booking_number.starts_with("BK-20240315-"));
        assert_eq!(booking.booking_number.len(), "BK-20240315-001".len());
        assert_eq!(service.get(&booking.id).await.unwrap(), booking);
    }

    #[tokio::test]
    async fn check_out_must_follow_check_in() {
        let service = BookingService::new(&seeded_store().await);
        let err = service
            .create(payload("5", date(2024, 4, 4), date(2024, 4, 4)))
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "Check-out date must be after check-in date");
    }

    #[tokio::test]
    async fn overlapping_stays_are_rejected() {
        let service = BookingService::new(&seeded_store().await);
        service
            .create(payload("5", date(2024, 4, 1), date(2024, 4, 4)))
            .await
            .unwrap();
        assert!(matches!(
            service.create(payload("5", date(2024, 4, 3), date(2024, 4, 6))).await,
            Err(ApiError::Conflict { .. })
        ));
        // back-to-back is fine
        service
            .create(payload("5", date(2024, 4, 4), date(2024, 4, 6)))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn illegal_status_changes_are_rejected() {
        let service = BookingService::new(&seeded_store().await);
        // bk_5 is cancelled
        assert!(matches!(
            service.update_status("bk_5", BookingStatus::Confirmed).await,
            Err(ApiError::IllegalTransition { .. })
        ));
        let b = service.update_status("bk_1", BookingStatus::CheckedOut).await.unwrap();
        assert_eq!(b.status, BookingStatus::CheckedOut);
    }

    #[tokio::test]
    async fn search_and_status_filter() {
        let service = BookingService::new(&seeded_store().await);
        let filter = BookingFilter {
            search: Some("smith".to_string()),
            status: Some(BookingStatus::CheckedIn),
        };
        let found = service.list(&filter).await.unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].id, "bk_1");
    }

    #[tokio::test]
    async fn delete_removes_booking() {
        let service = BookingService::new(&seeded_store().await);
        service.delete("bk_3").await.unwrap();
        let all = service.list(&BookingFilter::default()).await.unwrap();
        assert!(all.iter().all(|b| b.id != "bk_3"));
        assert_eq!(all.len(), 4);
    }

    #[tokio::test]
    async fn concurrent_bookings_cannot_share_a_room() {
        let service = BookingService::new(&seeded_store_with_latency(Latency::range(5, 5)).await);
        let (first, second) = tokio::join!(
            service.create(payload("5", date(2024, 4, 1), date(2024, 4, 3))),
            service.create(payload("5", date(2024, 4, 1), date(2024, 4, 3))),
        );
        let created = [&first, &second].iter().filter(|r| r.is_ok()).count();
        assert_eq!(created, 1);
        assert!(matches!(
            first.err().or(second.err()),
            Some(ApiError::Conflict { .. })
        ));
        let in_room_5 = service
            .all()
            .await
            .unwrap()
            .into_iter()
            .filter(|b| b.room_id == "5" && b.check_in_date == date(2024, 4, 1))
            .count();
        assert_eq!(in_room_5, 1);
    }

    #[tokio::test]
    async fn closed_bookings_can_be_edited_without_a_clash() {
        let service = BookingService::new(&seeded_store().await);
        // bk_5 is a cancelled stay in room 2 for 03-12..03-14
        let cancelled = service.get("bk_5").await.unwrap();
        service
            .create(payload("2", cancelled.check_in_date, cancelled.check_out_date))
            .await
            .unwrap();
        let mut edit = payload("2", cancelled.check_in_date, cancelled.check_out_date);
        edit.notes = "Refund issued".to_string();
        let edited = service.update("bk_5", edit).await.unwrap();
        assert_eq!(edited.notes, "Refund issued");
        assert_eq!(edited.status, BookingStatus::Cancelled);
        assert_eq!(edited.total_amount, cancelled.total_amount);
    }

    #[tokio::test]
    async fn total_is_kept_unless_the_stay_moves() {
        let store = seeded_store().await;
        let service = BookingService::new(&store);
        let rooms: Repository<Room> = Repository::new(store);
        let mut room = rooms.get("1").await.unwrap();
        room.price = Decimal::from(150);
        rooms.update(&room).await.unwrap();

        // bk_1 is checked in to room 1 at 99/night for 5 nights
        let stay = service.get("bk_1").await.unwrap();
        let mut edit = payload("1", stay.check_in_date, stay.check_out_date);
        edit.guests = 3;
        let edited = service.update("bk_1", edit).await.unwrap();
        assert_eq!(edited.total_amount, Decimal::from(495));
        assert_eq!(edited.guests, 3);

        let extended = payload("1", stay.check_in_date, stay.check_out_date + chrono::Duration::days(1));
        let edited = service.update("bk_1", extended).await.unwrap();
        assert_eq!(edited.total_amount, Decimal::from(900));
    }
}
