use actix_web::http::header::CONTENT_TYPE;
use actix_web::{delete, get, patch, post, put, web, HttpRequest, HttpResponse};
use serde::Deserialize;

use crate::server::controller::error::ApiError;
use crate::server::controller::extract::StaffUser;
use crate::server::controller::{created, deleted, ok};
use crate::server::model::room::{RoomFilter, RoomPayload, RoomStatus, RoomTypePayload, StatusUpdate};
use crate::server::model::{parse_filter, CommonRequestParams};
use crate::server::state::AppState;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct RoomQuery {
    pub search: Option<String>,
    pub status: Option<String>,
    pub room_type: Option<String>,
    pub floor: Option<String>,
}

impl RoomQuery {
    pub fn filter(&self) -> Result<RoomFilter, ApiError> {
        let floor = match self.floor.as_deref().map(str::trim) {
            None | Some("") | Some("all") => None,
            Some(f) => Some(
                f.parse()
                    .map_err(|_| ApiError::validation(format!("Invalid floor: {f}")))?,
            ),
        };
        Ok(RoomFilter {
            search: self.search.clone(),
            status: parse_filter(self.status.as_deref())?,
            room_type: self
                .room_type
                .clone()
                .filter(|t| !t.is_empty() && t != "all"),
            floor,
        })
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct UploadQuery {
    pub file_name: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ImageQuery {
    pub path: String,
}

#[get("/rooms")]
pub(crate) async fn list_rooms(
    _user: StaffUser,
    query: web::Query<RoomQuery>,
    page: web::Query<CommonRequestParams>,
    data: web::Data<AppState>,
) -> Result<HttpResponse, ApiError> {
    let mut list = data.rooms.list(&query.filter()?).await?;
    list.rooms = page.paginate(list.rooms);
    Ok(ok(list))
}

#[get("/rooms/stats")]
pub(crate) async fn room_stats(_user: StaffUser, data: web::Data<AppState>) -> Result<HttpResponse, ApiError> {
    Ok(ok(data.rooms.stats().await?))
}

#[get("/rooms/by-number/{number}")]
pub(crate) async fn get_room_by_number(
    _user: StaffUser,
    number: web::Path<String>,
    data: web::Data<AppState>,
) -> Result<HttpResponse, ApiError> {
    Ok(ok(data.rooms.get_by_number(&number).await?))
}

#[get("/rooms/{id}")]
pub(crate) async fn get_room(
    _user: StaffUser,
    id: web::Path<String>,
    data: web::Data<AppState>,
) -> Result<HttpResponse, ApiError> {
    Ok(ok(data.rooms.get(&id).await?))
}

#[post("/rooms")]
pub(crate) async fn create_room(
    _user: StaffUser,
    body: web::Json<RoomPayload>,
    data: web::Data<AppState>,
) -> Result<HttpResponse, ApiError> {
    Ok(created(data.rooms.create(body.into_inner()).await?))
}

#[put("/rooms/{id}")]
pub(crate) async fn update_room(
    _user: StaffUser,
    id: web::Path<String>,
    body: web::Json<RoomPayload>,
    data: web::Data<AppState>,
) -> Result<HttpResponse, ApiError> {
    Ok(ok(data.rooms.update(&id, body.into_inner()).await?))
}

#[patch("/rooms/{id}/status")]
pub(crate) async fn update_room_status(
    _user: StaffUser,
    id: web::Path<String>,
    body: web::Json<StatusUpdate<RoomStatus>>,
    data: web::Data<AppState>,
) -> Result<HttpResponse, ApiError> {
    Ok(ok(data.rooms.update_status(&id, body.status).await?))
}

#[delete("/rooms/{id}")]
pub(crate) async fn delete_room(
    _user: StaffUser,
    id: web::Path<String>,
    data: web::Data<AppState>,
) -> Result<HttpResponse, ApiError> {
    data.rooms.delete(&id).await?;
    Ok(deleted())
}

#[post("/rooms/{id}/images")]
/// Raw image body; the name comes from `?fileName=` and the type from `Content-Type`.
pub(crate) async fn upload_room_image(
    _user: StaffUser,
    id: web::Path<String>,
    query: web::Query<UploadQuery>,
    req: HttpRequest,
    body: web::Bytes,
    data: web::Data<AppState>,
) -> Result<HttpResponse, ApiError> {
    let content_type = req
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default();
    let room = data
        .rooms
        .upload_image(&id, &query.file_name, content_type, body.to_vec())
        .await?;
    Ok(created(room))
}

#[delete("/rooms/{id}/images")]
pub(crate) async fn delete_room_image(
    _user: StaffUser,
    id: web::Path<String>,
    query: web::Query<ImageQuery>,
    data: web::Data<AppState>,
) -> Result<HttpResponse, ApiError> {
    Ok(ok(data.rooms.delete_image(&id, &query.path).await?))
}

#[get("/room-types")]
pub(crate) async fn list_room_types(_user: StaffUser, data: web::Data<AppState>) -> Result<HttpResponse, ApiError> {
    Ok(ok(data.rooms.list_types().await?))
}

#[get("/room-types/{id}")]
pub(crate) async fn get_room_type(
    _user: StaffUser,
    id: web::Path<String>,
    data: web::Data<AppState>,
) -> Result<HttpResponse, ApiError> {
    Ok(ok(data.rooms.get_type(&id).await?))
}

#[post("/room-types")]
pub(crate) async fn create_room_type(
    _user: StaffUser,
    body: web::Json<RoomTypePayload>,
    data: web::Data<AppState>,
) -> Result<HttpResponse, ApiError> {
    Ok(created(data.rooms.create_type(body.into_inner()).await?))
}

#[put("/room-types/{id}")]
pub(crate) async fn update_room_type(
    _user: StaffUser,
    id: web::Path<String>,
    body: web::Json<RoomTypePayload>,
    data: web::Data<AppState>,
) -> Result<HttpResponse, ApiError> {
    Ok(ok(data.rooms.update_type(&id, body.into_inner()).await?))
}

#[delete("/room-types/{id}")]
pub(crate) async fn delete_room_type(
    _user: StaffUser,
    id: web::Path<String>,
    data: web::Data<AppState>,
) -> Result<HttpResponse, ApiError> {
    data.rooms.delete_type(&id).await?;
    Ok(deleted())
}
