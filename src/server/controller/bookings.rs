use actix_web::{delete, get, patch, post, put, web, HttpResponse};
use serde::Deserialize;

use crate::server::controller::error::ApiError;
use crate::server::controller::extract::StaffUser;
use crate::server::controller::{created, deleted, ok};
use crate::server::model::booking::{BookingFilter, BookingPayload, BookingStatus};
use crate::server::model::room::{RoomFilter, StatusUpdate};
use crate::server::model::{parse_filter, CommonRequestParams};
use crate::server::service::availability::{month_calendar, YearMonth};
use crate::server::state::AppState;
use crate::server::util::time::helper;

#[derive(Debug, Default, Deserialize)]
pub(crate) struct BookingQuery {
    pub search: Option<String>,
    pub status: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct MonthQuery {
    pub year: Option<i32>,
    pub month: Option<u32>,
}

#[get("/bookings")]
pub(crate) async fn list_bookings(
    _user: StaffUser,
    query: web::Query<BookingQuery>,
    page: web::Query<CommonRequestParams>,
    data: web::Data<AppState>,
) -> Result<HttpResponse, ApiError> {
    let filter = BookingFilter {
        search: query.search.clone(),
        status: parse_filter(query.status.as_deref())?,
    };
    Ok(ok(page.paginate(data.bookings.list(&filter).await?)))
}

#[get("/bookings/{id}")]
pub(crate) async fn get_booking(
    _user: StaffUser,
    id: web::Path<String>,
    data: web::Data<AppState>,
) -> Result<HttpResponse, ApiError> {
    Ok(ok(data.bookings.get(&id).await?))
}

#[post("/bookings")]
pub(crate) async fn create_booking(
    _user: StaffUser,
    body: web::Json<BookingPayload>,
    data: web::Data<AppState>,
) -> Result<HttpResponse, ApiError> {
    Ok(created(data.bookings.create(body.into_inner()).await?))
}

#[put("/bookings/{id}")]
pub(crate) async fn update_booking(
    _user: StaffUser,
    id: web::Path<String>,
    body: web::Json<BookingPayload>,
    data: web::Data<AppState>,
) -> Result<HttpResponse, ApiError> {
    Ok(ok(data.bookings.update(&id, body.into_inner()).await?))
}

#[patch("/bookings/{id}/status")]
pub(crate) async fn update_booking_status(
    _user: StaffUser,
    id: web::Path<String>,
    body: web::Json<StatusUpdate<BookingStatus>>,
    data: web::Data<AppState>,
) -> Result<HttpResponse, ApiError> {
    Ok(ok(data.bookings.update_status(&id, body.status).await?))
}

#[delete("/bookings/{id}")]
pub(crate) async fn delete_booking(
    _user: StaffUser,
    id: web::Path<String>,
    data: web::Data<AppState>,
) -> Result<HttpResponse, ApiError> {
    data.bookings.delete(&id).await?;
    Ok(deleted())
}

#[get("/availability")]
/// Month grid of room occupancy, the current month unless `year`/`month` are given.
pub(crate) async fn availability(
    _user: StaffUser,
    query: web::Query<MonthQuery>,
    data: web::Data<AppState>,
) -> Result<HttpResponse, ApiError> {
    let today = helper::today();
    let month = match (query.year, query.month) {
        (Some(year), Some(month)) => YearMonth::new(year, month)?,
        (None, None) => YearMonth::from_date(today),
        _ => return Err(ApiError::validation("Both year and month are required")),
    };
    let rooms = data.rooms.list(&RoomFilter::default()).await?.rooms;
    let bookings = data.bookings.all().await?;
    Ok(ok(month_calendar(month, &rooms, &bookings, today)))
}
