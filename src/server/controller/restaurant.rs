use actix_web::{get, patch, post, web, HttpResponse};
use serde::Deserialize;

use crate::server::controller::error::ApiError;
use crate::server::controller::extract::StaffUser;
use crate::server::controller::{created, ok};
use crate::server::model::item::MenuItemPayload;
use crate::server::model::order::{OrderPayload, OrderStatus};
use crate::server::model::room::StatusUpdate;
use crate::server::model::table::{TablePayload, TableStatus};
use crate::server::model::CommonRequestParams;
use crate::server::state::AppState;

#[derive(Debug, Default, Deserialize)]
pub(crate) struct MenuQuery {
    pub category: Option<String>,
}

#[get("/menu")]
pub(crate) async fn list_menu(
    _user: StaffUser,
    query: web::Query<MenuQuery>,
    data: web::Data<AppState>,
) -> Result<HttpResponse, ApiError> {
    Ok(ok(data.restaurant.menu(query.category.as_deref()).await?))
}

#[post("/menu")]
pub(crate) async fn create_menu_item(
    _user: StaffUser,
    body: web::Json<MenuItemPayload>,
    data: web::Data<AppState>,
) -> Result<HttpResponse, ApiError> {
    Ok(created(data.restaurant.create_menu_item(body.into_inner()).await?))
}

#[get("/tables")]
pub(crate) async fn list_tables(_user: StaffUser, data: web::Data<AppState>) -> Result<HttpResponse, ApiError> {
    Ok(ok(data.restaurant.tables().await?))
}

#[post("/tables")]
pub(crate) async fn create_table(
    _user: StaffUser,
    body: web::Json<TablePayload>,
    data: web::Data<AppState>,
) -> Result<HttpResponse, ApiError> {
    Ok(created(data.restaurant.create_table(body.into_inner()).await?))
}

#[patch("/tables/{id}/status")]
pub(crate) async fn update_table_status(
    _user: StaffUser,
    id: web::Path<String>,
    body: web::Json<StatusUpdate<TableStatus>>,
    data: web::Data<AppState>,
) -> Result<HttpResponse, ApiError> {
    Ok(ok(data.restaurant.update_table_status(&id, body.status).await?))
}

#[get("/orders")]
pub(crate) async fn list_orders(
    _user: StaffUser,
    page: web::Query<CommonRequestParams>,
    data: web::Data<AppState>,
) -> Result<HttpResponse, ApiError> {
    Ok(ok(page.paginate(data.restaurant.orders().await?)))
}

#[post("/orders")]
pub(crate) async fn create_order(
    _user: StaffUser,
    body: web::Json<OrderPayload>,
    data: web::Data<AppState>,
) -> Result<HttpResponse, ApiError> {
    Ok(created(data.restaurant.create_order(body.into_inner()).await?))
}

#[patch("/orders/{id}/status")]
pub(crate) async fn update_order_status(
    _user: StaffUser,
    id: web::Path<String>,
    body: web::Json<StatusUpdate<OrderStatus>>,
    data: web::Data<AppState>,
) -> Result<HttpResponse, ApiError> {
    Ok(ok(data.restaurant.update_order_status(&id, body.status).await?))
}
