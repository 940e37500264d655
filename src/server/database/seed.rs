//! Development data set loaded into the in-memory store.

use chrono::{DateTime, Duration, NaiveDate, NaiveTime, Utc};
use log::info;
use rust_decimal::Decimal;

use crate::server::database::{Document, Repository, Store, StoreError};
use crate::server::model::booking::{nights, stay_total, Booking, BookingStatus, PaymentStatus};
use crate::server::model::guest::{Guest, LoyaltyTier};
use crate::server::model::housekeeping::{HousekeepingTask, Priority, TaskStatus, UNASSIGNED};
use crate::server::model::inventory::{InventoryItem, StockStatus};
use crate::server::model::invoice::{invoice_total, Invoice, InvoiceStatus, LineItem, Payment};
use crate::server::model::item::MenuItem;
use crate::server::model::order::{order_total, Order, OrderLine, OrderStatus};
use crate::server::model::room::{Room, RoomStatus, RoomType};
use crate::server::model::staff::{Department, Shift, Staff, StaffStatus};
use crate::server::model::table::{RestaurantTable, TableStatus};

async fn insert_all<T: Document>(store: &Store, docs: Vec<T>) -> Result<usize, StoreError> {
    let repo = Repository::<T>::new(store.clone());
    let count = docs.len();
    for doc in docs {
        repo.create(doc).await?;
    }
    Ok(count)
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

fn at(day: NaiveDate, hour: u32) -> chrono::NaiveDateTime {
    day.and_time(NaiveTime::from_hms_opt(hour, 0, 0).unwrap_or_default())
}

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap_or_default()
}

fn room_types() -> Vec<RoomType> {
    let base = ["WiFi", "TV", "Air Conditioning", "Mini Bar"];
    let deluxe = [&base[..], &["Coffee Maker", "Balcony"][..]].concat();
    let suite = [&base[..], &["Coffee Maker", "Living Room", "Jacuzzi", "Ocean View"][..]].concat();
    let presidential = [&suite[..], &["Butler Service", "Private Terrace"][..]].concat();
    vec![
        RoomType {
            id: "type-1".to_string(),
            name: "Standard Room".to_string(),
            description: "Comfortable room with essential amenities for a pleasant stay.".to_string(),
            base_price: Decimal::from(99),
            max_occupancy: 2,
            bed_type: "Queen".to_string(),
            size: 28,
            amenities: strings(&base),
        },
        RoomType {
            id: "type-2".to_string(),
            name: "Deluxe Room".to_string(),
            description: "Spacious room with premium amenities and city view.".to_string(),
            base_price: Decimal::from(149),
            max_occupancy: 2,
            bed_type: "King".to_string(),
            size: 35,
            amenities: strings(&deluxe),
        },
        RoomType {
            id: "type-3".to_string(),
            name: "Executive Suite".to_string(),
            description: "Luxurious suite with separate living area and premium services.".to_string(),
            base_price: Decimal::from(249),
            max_occupancy: 3,
            bed_type: "King".to_string(),
            size: 55,
            amenities: strings(&suite),
        },
        RoomType {
            id: "type-4".to_string(),
            name: "Presidential Suite".to_string(),
            description: "The ultimate luxury experience with exclusive amenities and services.".to_string(),
            base_price: Decimal::from(499),
            max_occupancy: 4,
            bed_type: "King + Twin".to_string(),
            size: 100,
            amenities: strings(&presidential),
        },
    ]
}

fn rooms(types: &[RoomType]) -> Vec<Room> {
    use RoomStatus::*;
    let layout = [
        ("101", 0, Available),
        ("102", 0, Occupied),
        ("103", 1, Available),
        ("104", 1, Cleaning),
        ("201", 0, Available),
        ("202", 1, Reserved),
        ("203", 2, Occupied),
        ("204", 2, Maintenance),
        ("301", 1, Available),
        ("302", 2, Available),
        ("303", 3, Occupied),
        ("304", 3, Available),
    ];
    layout
        .iter()
        .enumerate()
        .map(|(i, (number, type_idx, status))| {
            let room_type = &types[*type_idx];
            Room {
                id: (i + 1).to_string(),
                room_number: number.to_string(),
                room_type_id: room_type.id.clone(),
                room_type_name: room_type.name.clone(),
                floor: number[..1].parse().unwrap_or(1),
                status: *status,
                price: room_type.base_price,
                images: vec![],
            }
        })
        .collect()
}

struct StaySeed<'a> {
    id: &'a str,
    seq: u32,
    guest: usize,
    room: usize,
    from: i64,
    to: i64,
    status: BookingStatus,
    payment_status: PaymentStatus,
    guests: u32,
    notes: &'a str,
    created: i64,
}

fn bookings(guests: &[Guest], rooms: &[Room], today: NaiveDate, now: DateTime<Utc>) -> Vec<Booking> {
    use BookingStatus::*;
    let stays = [
        StaySeed { id: "bk_1", seq: 1, guest: 0, room: 0, from: -2, to: 3, status: CheckedIn, payment_status: PaymentStatus::Paid, guests: 2, notes: "Late arrival", created: -7 },
        StaySeed { id: "bk_2", seq: 3, guest: 1, room: 6, from: 5, to: 10, status: Confirmed, payment_status: PaymentStatus::DepositPaid, guests: 2, notes: "Anniversary celebration", created: -5 },
        StaySeed { id: "bk_3", seq: 2, guest: 2, room: 9, from: -5, to: -1, status: CheckedOut, payment_status: PaymentStatus::Paid, guests: 1, notes: "", created: -15 },
        StaySeed { id: "bk_4", seq: 5, guest: 3, room: 10, from: 20, to: 25, status: Pending, payment_status: PaymentStatus::Pending, guests: 4, notes: "VIP guest", created: 0 },
        StaySeed { id: "bk_5", seq: 1, guest: 4, room: 1, from: -3, to: -1, status: Cancelled, payment_status: PaymentStatus::Refunded, guests: 2, notes: "Cancelled due to flight delay", created: -10 },
    ];
    stays
        .iter()
        .map(|s| {
            let (guest, room) = (&guests[s.guest], &rooms[s.room]);
            let created_at = now + Duration::days(s.created);
            let (check_in, check_out) = (today + Duration::days(s.from), today + Duration::days(s.to));
            Booking {
                id: s.id.to_string(),
                booking_number: format!("BK-{}-{:03}", created_at.format("%Y%m%d"), s.seq),
                guest_id: Some(guest.id.clone()),
                guest_name: guest.full_name.clone(),
                email: guest.email.clone(),
                phone: guest.phone.clone(),
                room_id: room.id.clone(),
                room_number: room.room_number.clone(),
                room_type: room.room_type_name.clone(),
                check_in_date: check_in,
                check_out_date: check_out,
                status: s.status,
                payment_status: s.payment_status,
                total_amount: stay_total(room.price, nights(check_in, check_out)).unwrap_or_default(),
                guests: s.guests,
                notes: s.notes.to_string(),
                created_at,
            }
        })
        .collect()
}

#[allow(clippy::too_many_arguments)]
fn guest(
    n: u32,
    name: &str,
    email: &str,
    phone: &str,
    address: &str,
    nationality: &str,
    passport: &str,
    tier: LoyaltyTier,
    points: u64,
    stays: u32,
    spent: i64,
    notes: &str,
    last_stay: NaiveDate,
    created_at: &str,
) -> Guest {
    Guest {
        id: format!("guest_{n}"),
        full_name: name.to_string(),
        email: email.to_string(),
        phone: phone.to_string(),
        address: address.to_string(),
        nationality: nationality.to_string(),
        passport_number: passport.to_string(),
        loyalty_tier: tier,
        loyalty_points: points,
        total_stays: stays,
        total_spent: Decimal::from(spent),
        notes: notes.to_string(),
        last_stay: Some(last_stay),
        created_at: created_at.parse().unwrap_or_default(),
    }
}

fn guests() -> Vec<Guest> {
    use LoyaltyTier::*;
    vec![
        guest(1, "John Smith", "john.smith@example.com", "+1 (555) 123-4567", "123 Main St, New York, NY", "USA", "A12345678", Gold, 12500, 5, 4500, "Prefers high floor, allergy to peanuts", date(2023, 10, 25), "2023-01-15T10:00:00Z"),
        guest(2, "Sarah Johnson", "sarah.j@example.com", "+1 (555) 987-6543", "456 Oak Ave, Los Angeles, CA", "USA", "B87654321", Platinum, 25400, 12, 15200, "VIP Guest, prefers early check-in", date(2023, 11, 5), "2022-05-20T14:30:00Z"),
        guest(3, "Michael Brown", "mbrown@example.com", "+1 (555) 456-7890", "789 Pine Rd, Chicago, IL", "USA", "C11223344", Silver, 3500, 2, 800, "", date(2023, 9, 15), "2023-08-01T09:15:00Z"),
        guest(4, "Emily Davis", "emily.d@example.com", "+44 20 7123 4567", "10 Downing St, London, UK", "UK", "UK99887766", Bronze, 1000, 1, 1200, "Vegetarian", date(2023, 12, 10), "2023-11-15T16:45:00Z"),
        guest(5, "Hiroshi Tanaka", "h.tanaka@example.jp", "+81 3 1234 5678", "1-1-1 Shibuya, Tokyo, Japan", "Japan", "JP55443322", Gold, 18000, 8, 9500, "Requires translator if possible", date(2023, 7, 20), "2022-11-10T11:20:00Z"),
    ]
}

fn staff() -> Vec<Staff> {
    use Shift::*;
    let rows = [
        ("Alice Richardson", "alice.r", "+1 (555) 111-2222", "General Manager", "Management", StaffStatus::Active, date(2020, 3, 15), 85000, Day),
        ("David Chen", "david.c", "+1 (555) 333-4444", "Receptionist", "Front Desk", StaffStatus::Active, date(2022, 6, 10), 45000, Morning),
        ("Maria Rodriguez", "maria.r", "+1 (555) 555-6666", "Housekeeping Supervisor", "Housekeeping", StaffStatus::Active, date(2021, 1, 20), 48000, Day),
        ("James Wilson", "james.w", "+1 (555) 777-8888", "Chef de Cuisine", "Kitchen", StaffStatus::Active, date(2021, 11, 5), 65000, Evening),
        ("Sarah Lee", "sarah.l", "+1 (555) 999-0000", "Concierge", "Front Desk", StaffStatus::OnLeave, date(2023, 2, 14), 42000, Day),
        ("Robert Taylor", "robert.t", "+1 (555) 123-0987", "Maintenance Tech", "Maintenance", StaffStatus::Active, date(2022, 8, 30), 50000, Night),
    ];
    rows.iter()
        .enumerate()
        .map(|(i, (name, mailbox, phone, role, department, status, joined, salary, shift))| Staff {
            id: format!("staff_{}", i + 1),
            full_name: name.to_string(),
            email: format!("{mailbox}@luxestay.com"),
            phone: phone.to_string(),
            role: role.to_string(),
            department: department.to_string(),
            status: *status,
            join_date: *joined,
            salary: Decimal::from(*salary),
            shift: *shift,
        })
        .collect()
}

fn departments() -> Vec<Department> {
    [
        ("Management", "Alice Richardson"),
        ("Front Desk", "David Chen"),
        ("Housekeeping", "Maria Rodriguez"),
        ("Kitchen", "James Wilson"),
        ("Maintenance", "Robert Taylor"),
        ("Security", "Michael Guard"),
    ]
    .iter()
    .enumerate()
    .map(|(i, (name, head))| Department {
        id: format!("dept_{}", i + 1),
        name: name.to_string(),
        head: head.to_string(),
        staff_count: 0,
    })
    .collect()
}

fn tasks(rooms: &[Room], staff: &[Staff], today: NaiveDate) -> Vec<HousekeepingTask> {
    let rows = [
        (0, "Cleaning", TaskStatus::Pending, Priority::High, Some(2), at(today, 14), "Guest checking in at 3 PM"),
        (6, "Deep Clean", TaskStatus::InProgress, Priority::Normal, Some(4), at(today, 16), "Monthly deep clean"),
        (11, "Inspection", TaskStatus::Completed, Priority::Normal, Some(0), at(today - Duration::days(1), 11), "Routine inspection"),
        (1, "Cleaning", TaskStatus::Pending, Priority::Normal, None, at(today + Duration::days(1), 10), "Checkout cleaning"),
    ];
    rows.iter()
        .enumerate()
        .map(|(i, (room, kind, status, priority, assignee, due, notes))| {
            let assignee = assignee.map(|a| &staff[a]);
            HousekeepingTask {
                id: format!("task_{}", i + 1),
                room_id: rooms[*room].id.clone(),
                room_number: rooms[*room].room_number.clone(),
                task_type: kind.to_string(),
                status: *status,
                priority: *priority,
                assigned_to: assignee.map_or(UNASSIGNED.to_string(), |s| s.full_name.clone()),
                assigned_to_id: assignee.map(|s| s.id.clone()),
                due_date: *due,
                notes: notes.to_string(),
            }
        })
        .collect()
}

fn menu() -> Vec<MenuItem> {
    [
        ("Classic Burger", "Mains", 18, "Beef patty, lettuce, tomato, cheese, house sauce"),
        ("Caesar Salad", "Starters", 12, "Romaine hearts, parmesan, croutons, caesar dressing"),
        ("Grilled Salmon", "Mains", 26, "Fresh atlantic salmon with seasonal vegetables"),
        ("Chocolate Lava Cake", "Desserts", 10, "Warm chocolate cake with vanilla ice cream"),
        ("Signature Cocktail", "Drinks", 14, "House special blend"),
        ("Espresso", "Drinks", 4, "Single shot espresso"),
    ]
    .iter()
    .enumerate()
    .map(|(i, (name, category, price, description))| MenuItem {
        id: format!("item_{}", i + 1),
        name: name.to_string(),
        category: category.to_string(),
        price: Decimal::from(*price),
        description: description.to_string(),
        image: None,
        is_available: true,
    })
    .collect()
}

fn tables() -> Vec<RestaurantTable> {
    use TableStatus::*;
    [(2, Available), (2, Occupied), (4, Available), (4, Reserved), (6, Available), (8, Available)]
        .iter()
        .enumerate()
        .map(|(i, (capacity, status))| RestaurantTable {
            id: format!("t{}", i + 1),
            number: (i + 1).to_string(),
            capacity: *capacity,
            status: *status,
        })
        .collect()
}

fn orders(menu: &[MenuItem], tables: &[RestaurantTable], today: NaiveDate) -> Vec<Order> {
    let burger = &menu[0];
    let items = vec![OrderLine {
        id: burger.id.clone(),
        name: burger.name.clone(),
        price: burger.price,
        qty: 2,
    }];
    vec![Order {
        id: "ord_1".to_string(),
        table_id: tables[1].id.clone(),
        table_number: tables[1].number.clone(),
        total: order_total(&items).unwrap_or_default(),
        items,
        status: OrderStatus::Preparing,
        timestamp: at(today, 12).and_utc() + Duration::minutes(30),
    }]
}

fn inventory() -> Vec<InventoryItem> {
    [
        ("Burger Buns", 45, "pcs", 20),
        ("Beef Patties", 12, "pcs", 20),
        ("Lettuce", 5, "kg", 2),
        ("Coffee Beans", 2, "kg", 5),
        ("Milk", 10, "L", 5),
    ]
    .iter()
    .enumerate()
    .map(|(i, (name, qty, unit, threshold))| {
        let (quantity, min_threshold) = (Decimal::from(*qty), Decimal::from(*threshold));
        InventoryItem {
            id: format!("inv_{}", i + 1),
            name: name.to_string(),
            quantity,
            unit: unit.to_string(),
            status: StockStatus::derive(quantity, min_threshold),
            min_threshold,
        }
    })
    .collect()
}

fn invoices(guests: &[Guest], today: NaiveDate) -> Vec<Invoice> {
    let line = |description: &str, amount: i64, category: &str| LineItem {
        description: description.to_string(),
        amount: Decimal::from(amount),
        category: category.to_string(),
    };
    let open_items = vec![
        line("Room Charge (5 nights)", 2500, "Room"),
        line("Room Service", 150, "Food"),
        line("Spa Access", 200, "Service"),
    ];
    let settled_items = vec![line("Room Charge (3 nights)", 900, "Room")];
    vec![
        Invoice {
            id: "inv_001".to_string(),
            guest_id: Some(guests[0].id.clone()),
            guest_name: guests[0].full_name.clone(),
            booking_id: Some("bk_1".to_string()),
            total: invoice_total(&open_items).unwrap_or_default(),
            items: open_items,
            status: InvoiceStatus::Unpaid,
            issue_date: today - Duration::days(2),
            due_date: Some(today + Duration::days(3)),
            payments: vec![],
            refunds: vec![],
        },
        Invoice {
            id: "inv_002".to_string(),
            guest_id: Some(guests[1].id.clone()),
            guest_name: guests[1].full_name.clone(),
            booking_id: Some("bk_2".to_string()),
            total: invoice_total(&settled_items).unwrap_or_default(),
            items: settled_items,
            status: InvoiceStatus::Paid,
            issue_date: today - Duration::days(10),
            due_date: Some(today - Duration::days(7)),
            payments: vec![Payment {
                id: "pay_1".to_string(),
                amount: Decimal::from(900),
                date: today - Duration::days(9),
                method: "Credit Card".to_string(),
            }],
            refunds: vec![],
        },
    ]
}

/// Load the development data set. Dates are relative to `now`.
pub(crate) async fn seed(store: &Store, now: DateTime<Utc>) -> Result<(), StoreError> {
    let today = now.date_naive();
    let types = room_types();
    let rooms = rooms(&types);
    let guests = guests();
    let staff = staff();
    let menu = menu();
    let tables = tables();

    let mut loaded = 0;
    loaded += insert_all(store, bookings(&guests, &rooms, today, now)).await?;
    loaded += insert_all(store, tasks(&rooms, &staff, today)).await?;
    loaded += insert_all(store, orders(&menu, &tables, today)).await?;
    loaded += insert_all(store, invoices(&guests, today)).await?;
    loaded += insert_all(store, types).await?;
    loaded += insert_all(store, rooms).await?;
    loaded += insert_all(store, guests).await?;
    loaded += insert_all(store, staff).await?;
    loaded += insert_all(store, departments()).await?;
    loaded += insert_all(store, menu).await?;
    loaded += insert_all(store, tables).await?;
    loaded += insert_all(store, inventory()).await?;
    info!("seeded {} documents into the {} store", loaded, store.backend_name());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::server::database::memory::MemoryStore;

    #[tokio::test]
    async fn seeds_the_development_data_set() {
        let store = Store::Memory(MemoryStore::new());
        let now = "2024-03-15T09:00:00Z".parse::<DateTime<Utc>>().unwrap();
        seed(&store, now).await.unwrap();

        let rooms = Repository::<Room>::new(store.clone()).find_all().await.unwrap();
        assert_eq!(rooms.len(), 12);
        let bookings = Repository::<Booking>::new(store.clone()).find_all().await.unwrap();
        assert_eq!(bookings.len(), 5);
        // every booking points at a real room
        assert!(bookings.iter().all(|b| rooms.iter().any(|r| r.id == b.room_id)));
        let bk_1 = bookings.iter().find(|b| b.id == "bk_1").unwrap();
        assert_eq!(bk_1.total_amount, Decimal::from(99 * 5));
        assert_eq!(bk_1.booking_number, "BK-20240308-001");

        let inventory = Repository::<InventoryItem>::new(store.clone()).find_all().await.unwrap();
        let low: Vec<_> = inventory
            .iter()
            .filter(|i| i.status == StockStatus::Low)
            .map(|i| i.name.as_str())
            .collect();
        assert_eq!(low, vec!["Beef Patties", "Coffee Beans"]);

        let invoices = Repository::<Invoice>::new(store).find_all().await.unwrap();
        assert_eq!(invoices[0].total, Decimal::from(2850));
    }
}
