//! HTTP handlers, one module per area. Every handler answers with the
//! [`ApiResponse`] envelope; failures go through [`error::ApiError`].

use actix_web::HttpResponse;
use serde::Serialize;

use crate::server::model::ApiResponse;

pub(crate) mod auth;
pub(crate) mod billing;
pub(crate) mod bookings;
pub(crate) mod customer;
pub(crate) mod error;
pub(crate) mod extract;
pub(crate) mod guests;
pub(crate) mod housekeeping;
pub(crate) mod inventory;
pub(crate) mod reports;
pub(crate) mod restaurant;
pub(crate) mod rooms;
pub(crate) mod staff;
pub(crate) mod theme;

pub(crate) fn ok<T: Serialize>(data: T) -> HttpResponse {
    HttpResponse::Ok().json(ApiResponse::ok(data))
}

pub(crate) fn created<T: Serialize>(data: T) -> HttpResponse {
    HttpResponse::Created().json(ApiResponse::ok(data))
}

pub(crate) fn deleted() -> HttpResponse {
    HttpResponse::Ok().json(ApiResponse::ok(serde_json::json!({ "deleted": true })))
}
