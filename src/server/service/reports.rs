//! Dashboard and revenue figures computed from the live collections.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;

use crate::server::controller::error::ApiError;
use crate::server::database::{Repository, Store};
use crate::server::model::booking::{Booking, BookingStatus};
use crate::server::model::housekeeping::{HousekeepingTask, TaskStatus};
use crate::server::model::inventory::{InventoryItem, StockStatus};
use crate::server::model::invoice::{Invoice, InvoiceStatus};
use crate::server::model::room::{Room, RoomStats};
use crate::server::service::availability::YearMonth;

const REVENUE_MONTHS: usize = 6;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct Dashboard {
    pub room_stats: RoomStats,
    pub arrivals: Vec<Booking>,
    pub departures: Vec<Booking>,
    pub pending_tasks: Vec<HousekeepingTask>,
    pub low_stock: Vec<InventoryItem>,
    pub active_bookings: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub(crate) struct MonthlyRevenue {
    /// `YYYY-MM`
    pub month: String,
    pub revenue: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub(crate) struct CategoryShare {
    pub category: String,
    pub amount: Decimal,
    /// percent, one decimal place
    pub percentage: Decimal,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct RevenueReport {
    pub total_revenue: Decimal,
    pub occupancy_rate: u32,
    pub active_bookings: usize,
    pub monthly_revenue: Vec<MonthlyRevenue>,
    pub revenue_by_category: Vec<CategoryShare>,
}

fn is_active_stay(booking: &Booking) -> bool {
    matches!(booking.status, BookingStatus::Confirmed | BookingStatus::CheckedIn)
}

#[derive(Clone)]
pub(crate) struct ReportService {
    rooms: Repository<Room>,
    bookings: Repository<Booking>,
    tasks: Repository<HousekeepingTask>,
    inventory: Repository<InventoryItem>,
    invoices: Repository<Invoice>,
}

impl ReportService {
    pub fn new(store: &Store) -> Self {
        Self {
            rooms: Repository::new(store.clone()),
            bookings: Repository::new(store.clone()),
            tasks: Repository::new(store.clone()),
            inventory: Repository::new(store.clone()),
            invoices: Repository::new(store.clone()),
        }
    }

    pub async fn dashboard(&self, today: NaiveDate) -> Result<Dashboard, ApiError> {
        let room_stats = RoomStats::from_rooms(&self.rooms.find_all().await?);
        let bookings = self.bookings.find_all().await?;
        let arrivals = bookings
            .iter()
            .filter(|b| {
                b.check_in_date == today
                    && matches!(b.status, BookingStatus::Pending | BookingStatus::Confirmed)
            })
            .cloned()
            .collect();
        let departures = bookings
            .iter()
            .filter(|b| b.check_out_date == today && b.status == BookingStatus::CheckedIn)
            .cloned()
            .collect();
        let mut pending_tasks: Vec<_> = self
            .tasks
            .find_all()
            .await?
            .into_iter()
            .filter(|t| t.status == TaskStatus::Pending)
            .collect();
        pending_tasks.sort_by(|a, b| a.due_date.cmp(&b.due_date));
        let low_stock = self
            .inventory
            .find_all()
            .await?
            .into_iter()
            .filter(|i| i.status == StockStatus::Low)
            .collect();
        Ok(Dashboard {
            room_stats,
            arrivals,
            departures,
            pending_tasks,
            low_stock,
            active_bookings: bookings.iter().filter(|b| is_active_stay(b)).count(),
        })
    }

    pub async fn revenue(&self, today: NaiveDate) -> Result<RevenueReport, ApiError> {
        let invoices = self.invoices.find_all().await?;
        let rooms = self.rooms.find_all().await?;
        let bookings = self.bookings.find_all().await?;
        Ok(RevenueReport {
            total_revenue: invoices
                .iter()
                .map(|i| i.total_paid().saturating_sub(i.total_refunded()))
                .fold(Decimal::ZERO, Decimal::saturating_add),
            occupancy_rate: RoomStats::from_rooms(&rooms).occupancy_rate,
            active_bookings: bookings.iter().filter(|b| is_active_stay(b)).count(),
            monthly_revenue: monthly_revenue(&invoices, today),
            revenue_by_category: category_shares(&invoices),
        })
    }
}

/// Net takings per month for the six months ending with `today`'s month, oldest first.
fn monthly_revenue(invoices: &[Invoice], today: NaiveDate) -> Vec<MonthlyRevenue> {
    let mut months = vec![YearMonth::from_date(today)];
    while months.len() < REVENUE_MONTHS {
        let earliest = months[months.len() - 1].previous();
        months.push(earliest);
    }
    months.reverse();

    let mut totals: BTreeMap<(i32, u32), Decimal> =
        months.iter().map(|m| ((m.year, m.month), Decimal::ZERO)).collect();
    let mut add = |date: NaiveDate, amount: Decimal| {
        let m = YearMonth::from_date(date);
        if let Some(total) = totals.get_mut(&(m.year, m.month)) {
            *total = total.saturating_add(amount);
        }
    };
    for invoice in invoices {
        for payment in &invoice.payments {
            add(payment.date, payment.amount);
        }
        for refund in &invoice.refunds {
            add(refund.date, -refund.amount);
        }
    }
    totals
        .into_iter()
        .map(|((year, month), revenue)| MonthlyRevenue {
            month: format!("{year:04}-{month:02}"),
            revenue,
        })
        .collect()
}

/// Billed amounts per line-item category over invoices that were not refunded.
fn category_shares(invoices: &[Invoice]) -> Vec<CategoryShare> {
    let mut amounts: BTreeMap<&str, Decimal> = BTreeMap::new();
    for invoice in invoices.iter().filter(|i| i.status != InvoiceStatus::Refunded) {
        for item in &invoice.items {
            let amount = amounts.entry(item.category.as_str()).or_default();
            *amount = amount.saturating_add(item.amount);
        }
    }
    let total = amounts.values().copied().fold(Decimal::ZERO, Decimal::saturating_add);
    amounts
        .into_iter()
        .map(|(category, amount)| CategoryShare {
            category: category.to_string(),
            amount,
            percentage: if total.is_zero() {
                Decimal::ZERO
            } else {
                (amount / total * Decimal::ONE_HUNDRED).round_dp(1)
            },
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::server::service::testing::{now, seeded_store};
    use std::str::FromStr;

    #[tokio::test]
    async fn dashboard_from_seed() {
        let service = ReportService::new(&seeded_store().await);
        let dashboard = service.dashboard(now().date_naive()).await.unwrap();
        assert_eq!(dashboard.room_stats.occupancy_rate, 25);
        assert!(dashboard.arrivals.is_empty());
        assert_eq!(dashboard.pending_tasks.len(), 2);
        assert_eq!(dashboard.low_stock.len(), 2);
        assert_eq!(dashboard.active_bookings, 2);
    }

    #[tokio::test]
    async fn departures_on_check_out_day() {
        let service = ReportService::new(&seeded_store().await);
        // bk_1 is checked in until today + 3
        let day = now().date_naive() + chrono::Duration::days(3);
        let dashboard = service.dashboard(day).await.unwrap();
        let ids: Vec<_> = dashboard.departures.iter().map(|b| b.id.as_str()).collect();
        assert_eq!(ids, vec!["bk_1"]);
    }

    #[tokio::test]
    async fn revenue_from_seed() {
        let service = ReportService::new(&seeded_store().await);
        let report = service.revenue(now().date_naive()).await.unwrap();
        assert_eq!(report.total_revenue, Decimal::from(900));
        assert_eq!(report.active_bookings, 2);

        let months: Vec<_> = report.monthly_revenue.iter().map(|m| m.month.as_str()).collect();
        assert_eq!(months, vec!["2023-10", "2023-11", "2023-12", "2024-01", "2024-02", "2024-03"]);
        assert_eq!(report.monthly_revenue[5].revenue, Decimal::from(900));
        assert_eq!(report.monthly_revenue[0].revenue, Decimal::ZERO);

        let room = report
            .revenue_by_category
            .iter()
            .find(|c| c.category == "Room")
            .unwrap();
        assert_eq!(room.amount, Decimal::from(3400));
        assert_eq!(room.percentage, Decimal::from_str("90.7").unwrap());
    }
}
