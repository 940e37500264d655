//! Month view of which room is booked on which day.

use chrono::{Datelike, Months, NaiveDate};
use serde::Serialize;

use crate::server::controller::error::ApiError;
use crate::server::model::booking::{Booking, BookingStatus};
use crate::server::model::room::Room;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub(crate) struct YearMonth {
    pub year: i32,
    pub month: u32,
}

impl YearMonth {
    pub fn new(year: i32, month: u32) -> Result<Self, ApiError> {
        NaiveDate::from_ymd_opt(year, month, 1)
            .map(|_| Self { year, month })
            .ok_or_else(|| ApiError::validation(format!("Invalid month: {year}-{month}")))
    }

    fn first_day(self) -> NaiveDate {
        NaiveDate::from_ymd_opt(self.year, self.month, 1).unwrap_or_default()
    }

    pub fn from_date(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }

    pub fn previous(self) -> Self {
        Self::from_date(self.first_day() - Months::new(1))
    }

    pub fn next(self) -> Self {
        Self::from_date(self.first_day() + Months::new(1))
    }

    pub fn days(self) -> Vec<NaiveDate> {
        let first = self.first_day();
        first
            .iter_days()
            .take_while(|d| d.month() == first.month())
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct CalendarDay {
    pub date: NaiveDate,
    pub weekday: String,
    pub is_today: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct CalendarCell {
    pub date: NaiveDate,
    pub booking_id: Option<String>,
    pub status: Option<BookingStatus>,
    pub is_start: bool,
    /// guest name, on start cells only
    pub label: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct CalendarRow {
    pub room_id: String,
    pub room_number: String,
    pub room_type: String,
    pub cells: Vec<CalendarCell>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct MonthCalendar {
    pub month: YearMonth,
    pub previous: YearMonth,
    pub next: YearMonth,
    pub days: Vec<CalendarDay>,
    pub rows: Vec<CalendarRow>,
}

/// First non-cancelled booking of the room whose inclusive stay covers `day`.
fn booking_on<'a>(room: &Room, bookings: &'a [Booking], day: NaiveDate) -> Option<&'a Booking> {
    bookings
        .iter()
        .find(|b| b.room_id == room.id && b.status.is_active() && b.covers(day))
}

fn row(room: &Room, bookings: &[Booking], days: &[NaiveDate]) -> CalendarRow {
    let mut previous: Option<&Booking> = None;
    let cells = days
        .iter()
        .map(|&day| {
            let current = booking_on(room, bookings, day);
            let is_start = match (current, previous) {
                (Some(c), Some(p)) => c.id != p.id,
                (Some(_), None) => true,
                _ => false,
            };
            previous = current;
            CalendarCell {
                date: day,
                booking_id: current.map(|b| b.id.clone()),
                status: current.map(|b| b.status),
                is_start,
                label: current.filter(|_| is_start).map(|b| b.guest_name.clone()),
            }
        })
        .collect();
    CalendarRow {
        room_id: room.id.clone(),
        room_number: room.room_number.clone(),
        room_type: room.room_type_name.clone(),
        cells,
    }
}

/// One row per room, sorted by room number, one cell per day of the month.
pub(crate) fn month_calendar(
    month: YearMonth,
    rooms: &[Room],
    bookings: &[Booking],
    today: NaiveDate,
) -> MonthCalendar {
    let days = month.days();
    let mut rooms: Vec<&Room> = rooms.iter().collect();
    rooms.sort_by(|a, b| a.room_number.cmp(&b.room_number));
    MonthCalendar {
        month,
        previous: month.previous(),
        next: month.next(),
        days: days
            .iter()
            .map(|&date| CalendarDay {
                date,
                weekday: date.format("%a").to_string(),
                is_today: date == today,
            })
            .collect(),
        rows: rooms.into_iter().map(|r| row(r, bookings, &days)).collect(),
    }
}
