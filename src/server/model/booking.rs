use chrono::{DateTime, NaiveDate, Utc};
use derive_more::Display;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::server::database::impl_document;
use crate::server::model::{contains_ci, search_term};
use crate::server::util::time::days_between;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub(crate) enum BookingStatus {
    #[display("pending")]
    Pending,
    #[display("confirmed")]
    Confirmed,
    #[display("checked_in")]
    CheckedIn,
    #[display("checked_out")]
    CheckedOut,
    #[display("cancelled")]
    Cancelled,
}

impl BookingStatus {
    pub fn can_transition_to(self, next: BookingStatus) -> bool {
        use BookingStatus::*;
        self == next
            || matches!(
                (self, next),
                (Pending, Confirmed | CheckedIn | Cancelled)
                    | (Confirmed, CheckedIn | Cancelled)
                    | (CheckedIn, CheckedOut | Cancelled)
                    | (CheckedOut, Cancelled)
            )
    }

    /// Counts against room availability.
    pub fn is_active(self) -> bool {
        !matches!(self, BookingStatus::Cancelled)
    }

    /// Guest has not left yet.
    pub fn is_open(self) -> bool {
        matches!(
            self,
            BookingStatus::Pending | BookingStatus::Confirmed | BookingStatus::CheckedIn
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub(crate) enum PaymentStatus {
    #[display("pending")]
    Pending,
    #[display("deposit_paid")]
    DepositPaid,
    #[display("paid")]
    Paid,
    #[display("refunded")]
    Refunded,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct Booking {
    #[serde(default)]
    pub id: String,
    pub booking_number: String,
    #[serde(default)]
    pub guest_id: Option<String>,
    pub guest_name: String,
    pub email: String,
    pub phone: String,
    pub room_id: String,
    pub room_number: String,
    #[serde(default)]
    pub room_type: String,
    pub check_in_date: NaiveDate,
    pub check_out_date: NaiveDate,
    pub status: BookingStatus,
    pub payment_status: PaymentStatus,
    pub total_amount: Decimal,
    pub guests: u32,
    #[serde(default)]
    pub notes: String,
    pub created_at: DateTime<Utc>,
}

impl_document!(Booking, "bookings", "bk");

impl Booking {
    pub fn nights(&self) -> i64 {
        nights(self.check_in_date, self.check_out_date)
    }

    /// Half-open `[check_in, check_out)` overlap, the nights actually occupied.
    pub fn overlaps(&self, check_in: NaiveDate, check_out: NaiveDate) -> bool {
        self.check_in_date < check_out && check_in < self.check_out_date
    }

    /// Inclusive containment used by the availability calendar.
    pub fn covers(&self, day: NaiveDate) -> bool {
        self.check_in_date <= day && day <= self.check_out_date
    }
}

pub(crate) fn nights(check_in: NaiveDate, check_out: NaiveDate) -> i64 {
    days_between(check_in, check_out)
}

pub(crate) fn stay_total(nightly_rate: Decimal, nights: i64) -> Option<Decimal> {
    nightly_rate.checked_mul(Decimal::from(nights.max(0)))
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct BookingPayload {
    pub guest_id: Option<String>,
    pub guest_name: String,
    pub email: String,
    pub phone: String,
    pub room_id: String,
    pub check_in_date: NaiveDate,
    pub check_out_date: NaiveDate,
    pub guests: u32,
    #[serde(default)]
    pub notes: String,
    pub status: Option<BookingStatus>,
    pub payment_status: Option<PaymentStatus>,
}

#[derive(Debug, Clone, Default)]
pub(crate) struct BookingFilter {
    pub search: Option<String>,
    pub status: Option<BookingStatus>,
}

impl BookingFilter {
    pub fn matches(&self, booking: &Booking) -> bool {
        if let Some(term) = search_term(self.search.as_deref()) {
            if !contains_ci(&booking.guest_name, &term)
                && !contains_ci(&booking.booking_number, &term)
                && !contains_ci(&booking.room_number, &term)
            {
                return false;
            }
        }
        self.status.map_or(true, |s| booking.status == s)
    }
}
