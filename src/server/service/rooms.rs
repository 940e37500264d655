use std::sync::Arc;

use log::info;
use tokio::sync::Mutex;

use crate::server::controller::error::ApiError;
use crate::server::database::{DocumentStore, Repository, Store, StoredObject};
use crate::server::model::booking::Booking;
use crate::server::model::room::{
    Room, RoomFilter, RoomImage, RoomList, RoomPayload, RoomStats, RoomStatus, RoomType,
    RoomTypePayload,
};
use crate::server::util::time::{helper, millis};
use crate::server::util::validation::{validate_non_negative, validate_required_text, MAX_NAME_LEN};

pub(crate) const MAX_IMAGE_BYTES: usize = 5 * 1024 * 1024;

#[derive(Clone)]
pub(crate) struct RoomService {
    store: Store,
    rooms: Repository<Room>,
    types: Repository<RoomType>,
    bookings: Repository<Booking>,
    /// Serialises room-number checks with the writes that follow them.
    write_lock: Arc<Mutex<()>>,
}

impl RoomService {
    pub fn new(store: &Store) -> Self {
        Self {
            store: store.clone(),
            rooms: Repository::new(store.clone()),
            types: Repository::new(store.clone()),
            bookings: Repository::new(store.clone()),
            write_lock: Arc::new(Mutex::new(())),
        }
    }

    // ---- room types ----

    pub async fn list_types(&self) -> Result<Vec<RoomType>, ApiError> {
        let mut types = self.types.find_all().await?;
        types.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(types)
    }

    pub async fn get_type(&self, id: &str) -> Result<RoomType, ApiError> {
        self.types
            .find_by_id(id)
            .await?
            .ok_or_else(|| ApiError::not_found("Room type"))
    }

    fn validate_type(payload: &RoomTypePayload) -> Result<(), ApiError> {
        validate_required_text(&payload.name, "Room type name is required", MAX_NAME_LEN)?;
        validate_non_negative(payload.base_price, "Base price cannot be negative")?;
        if payload.max_occupancy < 1 {
            return Err(ApiError::validation("Max occupancy must be at least 1"));
        }
        Ok(())
    }

    pub async fn create_type(&self, payload: RoomTypePayload) -> Result<RoomType, ApiError> {
        Self::validate_type(&payload)?;
        let created = self
            .types
            .create(RoomType {
                id: String::new(),
                name: payload.name.trim().to_string(),
                description: payload.description,
                base_price: payload.base_price,
                max_occupancy: payload.max_occupancy,
                bed_type: payload.bed_type,
                size: payload.size,
                amenities: payload.amenities,
            })
            .await?;
        info!("room type {} created", created.id);
        Ok(created)
    }

    /// Renaming a type also renames it on every room of that type.
    pub async fn update_type(&self, id: &str, payload: RoomTypePayload) -> Result<RoomType, ApiError> {
        Self::validate_type(&payload)?;
        let mut room_type = self.get_type(id).await?;
        let renamed = room_type.name != payload.name.trim();
        room_type.name = payload.name.trim().to_string();
        room_type.description = payload.description;
        room_type.base_price = payload.base_price;
        room_type.max_occupancy = payload.max_occupancy;
        room_type.bed_type = payload.bed_type;
        room_type.size = payload.size;
        room_type.amenities = payload.amenities;
        self.types.update(&room_type).await?;

        if renamed {
            for mut room in self.rooms.find_all().await? {
                if room.room_type_id == room_type.id {
                    room.room_type_name = room_type.name.clone();
                    self.rooms.update(&room).await?;
                }
            }
        }
        Ok(room_type)
    }

    pub async fn delete_type(&self, id: &str) -> Result<(), ApiError> {
        let in_use = self
            .rooms
            .find_all()
            .await?
            .iter()
            .filter(|r| r.room_type_id == id)
            .count();
        if in_use > 0 {
            return Err(ApiError::conflict(format!(
                "Room type is still used by {in_use} room(s)"
            )));
        }
        self.types.delete(id).await?;
        info!("room type {} deleted", id);
        Ok(())
    }

    // ---- rooms ----

    /// Filtered rooms sorted by number, with stats over the whole list.
    pub async fn list(&self, filter: &RoomFilter) -> Result<RoomList, ApiError> {
        let mut all = self.rooms.find_all().await?;
        all.sort_by(|a, b| a.room_number.cmp(&b.room_number));
        let stats = RoomStats::from_rooms(&all);
        let rooms = all.into_iter().filter(|r| filter.matches(r)).collect();
        Ok(RoomList { rooms, stats })
    }

    pub async fn stats(&self) -> Result<RoomStats, ApiError> {
        Ok(RoomStats::from_rooms(&self.rooms.find_all().await?))
    }

    pub async fn get(&self, id: &str) -> Result<Room, ApiError> {
        self.rooms
            .find_by_id(id)
            .await?
            .ok_or_else(|| ApiError::not_found("Room"))
    }

    pub async fn get_by_number(&self, number: &str) -> Result<Room, ApiError> {
        self.find_by_number(number)
            .await?
            .ok_or_else(|| ApiError::not_found("Room"))
    }

    async fn find_by_number(&self, number: &str) -> Result<Option<Room>, ApiError> {
        let number = number.trim();
        Ok(self
            .rooms
            .find_all()
            .await?
            .into_iter()
            .find(|r| r.room_number == number))
    }

    async fn check_payload(&self, payload: &RoomPayload, own_id: Option<&str>) -> Result<RoomType, ApiError> {
        validate_required_text(&payload.room_number, "Room number is required", 16)?;
        if let Some(price) = payload.price {
            validate_non_negative(price, "Price cannot be negative")?;
        }
        if let Some(existing) = self.find_by_number(&payload.room_number).await? {
            if Some(existing.id.as_str()) != own_id {
                return Err(ApiError::conflict("Room number already exists"));
            }
        }
        self.types
            .find_by_id(&payload.room_type_id)
            .await?
            .ok_or_else(|| ApiError::validation("Room type does not exist"))
    }

    pub async fn create(&self, payload: RoomPayload) -> Result<Room, ApiError> {
        let _guard = self.write_lock.lock().await;
        let room_type = self.check_payload(&payload, None).await?;
        let room = self
            .rooms
            .create(Room {
                id: String::new(),
                room_number: payload.room_number.trim().to_string(),
                room_type_id: room_type.id,
                room_type_name: room_type.name,
                floor: payload.floor,
                status: payload.status.unwrap_or(RoomStatus::Available),
                price: payload.price.unwrap_or(room_type.base_price),
                images: vec![],
            })
            .await?;
        info!("room {} ({}) created", room.room_number, room.id);
        Ok(room)
    }

    pub async fn update(&self, id: &str, payload: RoomPayload) -> Result<Room, ApiError> {
        let _guard = self.write_lock.lock().await;
        let mut room = self.get(id).await?;
        let room_type = self.check_payload(&payload, Some(id)).await?;
        if let Some(status) = payload.status {
            if !room.status.can_transition_to(status) {
                return Err(ApiError::illegal_transition(room.status, status));
            }
            room.status = status;
        }
        room.room_number = payload.room_number.trim().to_string();
        room.floor = payload.floor;
        room.price = payload.price.unwrap_or(room.price);
        room.room_type_id = room_type.id;
        room.room_type_name = room_type.name;
        self.rooms.update(&room).await?;
        Ok(room)
    }

    pub async fn update_status(&self, id: &str, status: RoomStatus) -> Result<Room, ApiError> {
        let mut room = self.get(id).await?;
        if !room.status.can_transition_to(status) {
            return Err(ApiError::illegal_transition(room.status, status));
        }
        if room.status != status {
            info!("room {} {} -> {}", room.room_number, room.status, status);
            room.status = status;
            self.rooms.update(&room).await?;
        }
        Ok(room)
    }

    /// Rooms holding live bookings cannot be removed.
    pub async fn delete(&self, id: &str) -> Result<(), ApiError> {
        let room = self.get(id).await?;
        let today = helper::today();
        let booked = self
            .bookings
            .find_all()
            .await?
            .into_iter()
            .any(|b| b.room_id == room.id && b.status.is_open() && b.check_out_date >= today);
        if booked {
            return Err(ApiError::conflict("Room has upcoming bookings"));
        }
        for image in &room.images {
            self.store.delete_object(&image.path).await?;
        }
        self.rooms.delete(id).await?;
        info!("room {} ({}) deleted", room.room_number, room.id);
        Ok(())
    }

    // ---- images ----

    pub async fn upload_image(
        &self,
        id: &str,
        file_name: &str,
        content_type: &str,
        bytes: Vec<u8>,
    ) -> Result<Room, ApiError> {
        let mut room = self.get(id).await?;
        if !content_type.starts_with("image/") {
            return Err(ApiError::validation("Only image uploads are accepted"));
        }
        if bytes.is_empty() || bytes.len() > MAX_IMAGE_BYTES {
            return Err(ApiError::validation("Image must be between 1 byte and 5 MB"));
        }
        let file_name = sanitize_file_name(file_name)?;
        let path = format!("rooms/{}/{}_{}", room.id, millis(helper::get_utc_now()), file_name);
        self.store
            .put_object(
                &path,
                StoredObject {
                    content_type: content_type.to_string(),
                    bytes,
                },
            )
            .await?;
        room.images.push(RoomImage {
            path,
            file_name,
            content_type: content_type.to_string(),
        });
        self.rooms.update(&room).await?;
        Ok(room)
    }

    pub async fn delete_image(&self, id: &str, path: &str) -> Result<Room, ApiError> {
        let mut room = self.get(id).await?;
        let before = room.images.len();
        room.images.retain(|i| i.path != path);
        if room.images.len() == before {
            return Err(ApiError::not_found("Image"));
        }
        self.store.delete_object(path).await?;
        self.rooms.update(&room).await?;
        Ok(room)
    }

    pub async fn image(&self, path: &str) -> Result<StoredObject, ApiError> {
        self.store
            .get_object(path)
            .await?
            .ok_or_else(|| ApiError::not_found("Image"))
    }
}

/// Last path segment, restricted to a safe character set.
fn sanitize_file_name(name: &str) -> Result<String, ApiError> {
    let base = name.rsplit(['/', '\\']).next().unwrap_or_default().trim();
    let cleaned: String = base
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') {
                c
            } else {
                '_'
            }
        })
        .collect();
    if cleaned.is_empty() || cleaned.chars().all(|c| c == '.') {
        return Err(ApiError::validation("File name is required"));
    }
    Ok(cleaned)
}
