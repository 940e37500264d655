use derive_more::Display;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::server::database::impl_document;
use crate::server::model::{contains_ci, search_term};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub(crate) enum RoomStatus {
    #[display("available")]
    Available,
    #[display("occupied")]
    Occupied,
    #[display("reserved")]
    Reserved,
    #[display("maintenance")]
    Maintenance,
    #[display("cleaning")]
    Cleaning,
}

impl RoomStatus {
    /// Whether a room may move from `self` to `next`. Same status is a no-op.
    pub fn can_transition_to(self, next: RoomStatus) -> bool {
        use RoomStatus::*;
        self == next
            || matches!(
                (self, next),
                (Available, Occupied | Reserved | Maintenance | Cleaning)
                    | (Reserved, Occupied | Available | Maintenance)
                    | (Occupied, Cleaning | Available | Maintenance)
                    | (Cleaning, Available | Maintenance)
                    | (Maintenance, Available | Cleaning)
            )
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct RoomType {
    #[serde(default)]
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub base_price: Decimal,
    pub max_occupancy: u32,
    #[serde(default)]
    pub bed_type: String,
    /// square metres
    #[serde(default)]
    pub size: u32,
    #[serde(default)]
    pub amenities: Vec<String>,
}

impl_document!(RoomType, "roomTypes", "type");

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct RoomImage {
    pub path: String,
    pub file_name: String,
    pub content_type: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct Room {
    #[serde(default)]
    pub id: String,
    pub room_number: String,
    pub room_type_id: String,
    #[serde(default)]
    pub room_type_name: String,
    pub floor: u32,
    pub status: RoomStatus,
    pub price: Decimal,
    #[serde(default)]
    pub images: Vec<RoomImage>,
}

impl_document!(Room, "rooms", "room");

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct RoomTypePayload {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub base_price: Decimal,
    pub max_occupancy: u32,
    #[serde(default)]
    pub bed_type: String,
    #[serde(default)]
    pub size: u32,
    #[serde(default)]
    pub amenities: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct RoomPayload {
    pub room_number: String,
    pub room_type_id: String,
    pub floor: u32,
    pub status: Option<RoomStatus>,
    /// defaults to the room type's base price
    pub price: Option<Decimal>,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct StatusUpdate<S> {
    pub status: S,
}

/// List filter; every present field must match.
#[derive(Debug, Clone, Default)]
pub(crate) struct RoomFilter {
    pub search: Option<String>,
    pub status: Option<RoomStatus>,
    pub room_type: Option<String>,
    pub floor: Option<u32>,
}

impl RoomFilter {
    pub fn matches(&self, room: &Room) -> bool {
        if let Some(term) = search_term(self.search.as_deref()) {
            if !contains_ci(&room.room_number, &term) && !contains_ci(&room.room_type_name, &term) {
                return false;
            }
        }
        self.status.map_or(true, |s| room.status == s)
            && self
                .room_type
                .as_deref()
                .map_or(true, |t| room.room_type_id == t)
            && self.floor.map_or(true, |f| room.floor == f)
    }
}

/// Status breakdown over the whole room list.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct RoomStats {
    pub total: usize,
    pub available: usize,
    pub occupied: usize,
    pub reserved: usize,
    pub maintenance: usize,
    pub cleaning: usize,
    /// percent, rounded
    pub occupancy_rate: u32,
}

impl RoomStats {
    pub fn from_rooms(rooms: &[Room]) -> Self {
        let mut stats = RoomStats {
            total: rooms.len(),
            ..RoomStats::default()
        };
        for room in rooms {
            match room.status {
                RoomStatus::Available => stats.available += 1,
                RoomStatus::Occupied => stats.occupied += 1,
                RoomStatus::Reserved => stats.reserved += 1,
                RoomStatus::Maintenance => stats.maintenance += 1,
                RoomStatus::Cleaning => stats.cleaning += 1,
            }
        }
        if stats.total > 0 {
            stats.occupancy_rate =
                ((stats.occupied as f64 / stats.total as f64) * 100.0).round() as u32;
        }
        stats
    }
}

#[derive(Debug, Clone, Serialize)]
pub(crate) struct RoomList {
    pub rooms: Vec<Room>,
    pub stats: RoomStats,
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub fn room(id: &str, number: &str, status: RoomStatus) -> Room {
        Room {
            id: id.to_string(),
            room_number: number.to_string(),
            room_type_id: "type-1".to_string(),
            room_type_name: "Standard Room".to_string(),
            floor: number[..1].parse().unwrap_or(1),
            status,
            price: Decimal::from(99),
            images: vec![],
        }
    }

    fn sample() -> Vec<Room> {
        let mut deluxe = room("3", "103", RoomStatus::Available);
        deluxe.room_type_id = "type-2".to_string();
        deluxe.room_type_name = "Deluxe Room".to_string();
        vec![
            room("1", "101", RoomStatus::Available),
            room("2", "102", RoomStatus::Occupied),
            deluxe,
            room("5", "201", RoomStatus::Available),
        ]
    }

    #[test]
    fn status_filter_returns_exact_subset() {
        let rooms = sample();
        let filter = RoomFilter {
            status: Some(RoomStatus::Available),
            ..RoomFilter::default()
        };
        let ids: Vec<_> = rooms.iter().filter(|r| filter.matches(r)).map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["1", "3", "5"]);
    }

    #[test]
    fn search_and_status_intersect() {
        let rooms = sample();
        let filter = RoomFilter {
            search: Some("DELUXE".to_string()),
            status: Some(RoomStatus::Available),
            ..RoomFilter::default()
        };
        let ids: Vec<_> = rooms.iter().filter(|r| filter.matches(r)).map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["3"]);

        let filter = RoomFilter {
            search: Some("10".to_string()),
            status: Some(RoomStatus::Occupied),
            ..RoomFilter::default()
        };
        let ids: Vec<_> = rooms.iter().filter(|r| filter.matches(r)).map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["2"]);
    }

    #[test]
    fn stats_count_every_status() {
        let stats = RoomStats::from_rooms(&sample());
        assert_eq!(stats.total, 4);
        assert_eq!(stats.available, 3);
        assert_eq!(stats.occupied, 1);
        assert_eq!(stats.occupancy_rate, 25);
        assert_eq!(RoomStats::from_rooms(&[]).occupancy_rate, 0);
    }

    #[test]
    fn transitions() {
        assert!(RoomStatus::Available.can_transition_to(RoomStatus::Reserved));
        assert!(RoomStatus::Occupied.can_transition_to(RoomStatus::Cleaning));
        assert!(RoomStatus::Cleaning.can_transition_to(RoomStatus::Cleaning));
        assert!(!RoomStatus::Cleaning.can_transition_to(RoomStatus::Occupied));
        assert!(!RoomStatus::Maintenance.can_transition_to(RoomStatus::Reserved));
    }

    #[test]
    fn wire_form_is_lowercase() {
        assert_eq!(serde_json::to_string(&RoomStatus::Maintenance).unwrap(), "\"maintenance\"");
        assert_eq!(RoomStatus::Cleaning.to_string(), "cleaning");
    }
}
