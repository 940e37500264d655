//! Guest-facing endpoints: the public catalogue, stored images and the
//! signed-in customer's own bookings and profile.

use actix_web::{get, patch, post, web, HttpResponse};
use serde::Deserialize;

use crate::server::controller::error::ApiError;
use crate::server::controller::extract::CurrentUser;
use crate::server::controller::rooms::RoomQuery;
use crate::server::controller::{created, ok};
use crate::server::model::booking::{Booking, BookingPayload, BookingStatus};
use crate::server::model::user::ProfileUpdate;
use crate::server::model::CommonRequestParams;
use crate::server::service::auth::Session;
use crate::server::state::AppState;

/// What a customer may fill in; contact email and status are theirs to keep.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct CustomerBooking {
    #[serde(default)]
    pub guest_name: String,
    #[serde(default)]
    pub phone: String,
    pub room_id: String,
    pub check_in_date: chrono::NaiveDate,
    pub check_out_date: chrono::NaiveDate,
    pub guests: u32,
    #[serde(default)]
    pub notes: String,
}

#[get("/rooms")]
pub(crate) async fn browse_rooms(
    query: web::Query<RoomQuery>,
    page: web::Query<CommonRequestParams>,
    data: web::Data<AppState>,
) -> Result<HttpResponse, ApiError> {
    let list = data.rooms.list(&query.filter()?).await?;
    Ok(ok(page.paginate(list.rooms)))
}

#[get("/rooms/{id}")]
pub(crate) async fn room_details(id: web::Path<String>, data: web::Data<AppState>) -> Result<HttpResponse, ApiError> {
    Ok(ok(data.rooms.get(&id).await?))
}

#[get("/room-types")]
pub(crate) async fn browse_room_types(data: web::Data<AppState>) -> Result<HttpResponse, ApiError> {
    Ok(ok(data.rooms.list_types().await?))
}

#[get("/room-types/{id}")]
pub(crate) async fn room_type_details(id: web::Path<String>, data: web::Data<AppState>) -> Result<HttpResponse, ApiError> {
    Ok(ok(data.rooms.get_type(&id).await?))
}

#[get("/images/{path:.*}")]
pub(crate) async fn image(path: web::Path<String>, data: web::Data<AppState>) -> Result<HttpResponse, ApiError> {
    let object = data.rooms.image(&path).await?;
    Ok(HttpResponse::Ok()
        .content_type(object.content_type)
        .body(object.bytes))
}

pub(crate) async fn own_booking(data: &AppState, user: &Session, id: &str) -> Result<Booking, ApiError> {
    let booking = data.bookings.get(id).await?;
    if booking.email.eq_ignore_ascii_case(&user.email) {
        Ok(booking)
    } else {
        // someone else's booking looks the same as a missing one
        Err(ApiError::not_found("Booking"))
    }
}

#[get("/bookings")]
pub(crate) async fn my_bookings(
    user: CurrentUser,
    page: web::Query<CommonRequestParams>,
    data: web::Data<AppState>,
) -> Result<HttpResponse, ApiError> {
    Ok(ok(page.paginate(data.bookings.for_email(&user.email).await?)))
}

#[get("/bookings/{id}")]
pub(crate) async fn my_booking(
    user: CurrentUser,
    id: web::Path<String>,
    data: web::Data<AppState>,
) -> Result<HttpResponse, ApiError> {
    Ok(ok(own_booking(&data, &user, &id).await?))
}

#[post("/bookings")]
pub(crate) async fn book_room(
    user: CurrentUser,
    body: web::Json<CustomerBooking>,
    data: web::Data<AppState>,
) -> Result<HttpResponse, ApiError> {
    let body = body.into_inner();
    let profile = data.auth.current_user(&user).await?;
    let guest_name = if body.guest_name.trim().is_empty() {
        profile.display_name
    } else {
        body.guest_name
    };
    let phone = if body.phone.trim().is_empty() {
        profile.phone
    } else {
        body.phone
    };
    let payload = BookingPayload {
        guest_id: None,
        guest_name,
        email: profile.email,
        phone,
        room_id: body.room_id,
        check_in_date: body.check_in_date,
        check_out_date: body.check_out_date,
        guests: body.guests,
        notes: body.notes,
        status: Some(BookingStatus::Pending),
        payment_status: None,
    };
    Ok(created(data.bookings.create(payload).await?))
}

#[patch("/bookings/{id}/cancel")]
pub(crate) async fn cancel_my_booking(
    user: CurrentUser,
    id: web::Path<String>,
    data: web::Data<AppState>,
) -> Result<HttpResponse, ApiError> {
    let booking = own_booking(&data, &user, &id).await?;
    Ok(ok(data
        .bookings
        .update_status(&booking.id, BookingStatus::Cancelled)
        .await?))
}

#[get("/profile")]
pub(crate) async fn my_profile(user: CurrentUser, data: web::Data<AppState>) -> Result<HttpResponse, ApiError> {
    Ok(ok(data.auth.current_user(&user).await?))
}

#[patch("/profile")]
pub(crate) async fn update_my_profile(
    user: CurrentUser,
    body: web::Json<ProfileUpdate>,
    data: web::Data<AppState>,
) -> Result<HttpResponse, ApiError> {
    Ok(ok(data.auth.update_profile(&user, body.into_inner()).await?))
}

#[cfg(test)]
mod tests {
    use actix_web::http::StatusCode;
    use actix_web::test::{self, TestRequest};
    use serde_json::{json, Value};

    use crate::server::controller::testing::{app, bearer, data, state};
    use crate::server::model::booking::{Booking, BookingStatus};
    use crate::server::model::user::RegisterRequest;
    use crate::server::state::AppState;

    async fn sign_up(state: &AppState) -> String {
        state
            .auth
            .register(RegisterRequest {
                email: "Jane@Example.com".to_string(),
                password: "secret1".to_string(),
                display_name: "Jane Smith".to_string(),
                phone: "+1 555 0100".to_string(),
                role: None,
            })
            .await
            .unwrap()
            .token
    }

    #[actix_web::test]
    async fn catalogue_is_public() {
        let app = test::init_service(app(state().await)).await;
        let req = TestRequest::get().uri("/v1/rooms?floor=1").to_request();
        let rooms: Vec<Value> = data(test::call_service(&app, req).await).await;
        assert_eq!(rooms.len(), 4);

        let req = TestRequest::get().uri("/v1/room-types").to_request();
        let types: Vec<Value> = data(test::call_service(&app, req).await).await;
        assert!(!types.is_empty());

        let req = TestRequest::get().uri("/v1/images/rooms/1/missing.png").to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::NOT_FOUND);
    }

    #[actix_web::test]
    async fn customer_books_and_cancels() {
        let state = state().await;
        let token = sign_up(&state).await;
        let app = test::init_service(app(state)).await;

        let req = TestRequest::post()
            .uri("/v1/bookings")
            .insert_header(bearer(&token))
            .set_json(json!({
                "roomId": "5",
                "checkInDate": "2024-04-01",
                "checkOutDate": "2024-04-03",
                "guests": 2
            }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::CREATED);
        let booking: Booking = data(resp).await;
        assert_eq!(booking.guest_name, "Jane Smith");
        assert_eq!(booking.email, "jane@example.com");
        assert_eq!(booking.status, BookingStatus::Pending);

        let req = TestRequest::get()
            .uri("/v1/bookings")
            .insert_header(bearer(&token))
            .to_request();
        let mine: Vec<Booking> = data(test::call_service(&app, req).await).await;
        assert_eq!(mine.len(), 1);

        // seeded bookings belong to other guests
        let req = TestRequest::get()
            .uri("/v1/bookings/bk_1")
            .insert_header(bearer(&token))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::NOT_FOUND);

        let req = TestRequest::patch()
            .uri(&format!("/v1/bookings/{}/cancel", booking.id))
            .insert_header(bearer(&token))
            .to_request();
        let cancelled: Booking = data(test::call_service(&app, req).await).await;
        assert_eq!(cancelled.status, BookingStatus::Cancelled);
    }

    #[actix_web::test]
    async fn profile_update() {
        let state = state().await;
        let token = sign_up(&state).await;
        let app = test::init_service(app(state)).await;
        let req = TestRequest::patch()
            .uri("/v1/profile")
            .insert_header(bearer(&token))
            .set_json(json!({ "displayName": "Jane Doe" }))
            .to_request();
        let profile: Value = data(test::call_service(&app, req).await).await;
        assert_eq!(profile["displayName"], "Jane Doe");
        assert_eq!(profile["phone"], "+1 555 0100");

        let req = TestRequest::get().uri("/v1/profile").to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::UNAUTHORIZED);
    }
}
