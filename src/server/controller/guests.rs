use actix_web::{delete, get, post, put, web, HttpResponse};
use serde::Deserialize;

use crate::server::controller::error::ApiError;
use crate::server::controller::extract::StaffUser;
use crate::server::controller::{created, deleted, ok};
use crate::server::model::guest::{GuestFilter, GuestPayload};
use crate::server::model::{parse_filter, CommonRequestParams};
use crate::server::service::loyalty::{self, SpinRequest};
use crate::server::state::AppState;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct GuestQuery {
    pub search: Option<String>,
    pub loyalty_tier: Option<String>,
}

#[get("/guests")]
pub(crate) async fn list_guests(
    _user: StaffUser,
    query: web::Query<GuestQuery>,
    page: web::Query<CommonRequestParams>,
    data: web::Data<AppState>,
) -> Result<HttpResponse, ApiError> {
    let filter = GuestFilter {
        search: query.search.clone(),
        loyalty_tier: parse_filter(query.loyalty_tier.as_deref())?,
    };
    Ok(ok(page.paginate(data.guests.list(&filter).await?)))
}

#[get("/guests/{id}")]
pub(crate) async fn get_guest(
    _user: StaffUser,
    id: web::Path<String>,
    data: web::Data<AppState>,
) -> Result<HttpResponse, ApiError> {
    Ok(ok(data.guests.get(&id).await?))
}

#[get("/guests/{id}/history")]
pub(crate) async fn guest_history(
    _user: StaffUser,
    id: web::Path<String>,
    data: web::Data<AppState>,
) -> Result<HttpResponse, ApiError> {
    Ok(ok(data.guests.history(&id).await?))
}

#[post("/guests")]
pub(crate) async fn create_guest(
    _user: StaffUser,
    body: web::Json<GuestPayload>,
    data: web::Data<AppState>,
) -> Result<HttpResponse, ApiError> {
    Ok(created(data.guests.create(body.into_inner()).await?))
}

#[put("/guests/{id}")]
pub(crate) async fn update_guest(
    _user: StaffUser,
    id: web::Path<String>,
    body: web::Json<GuestPayload>,
    data: web::Data<AppState>,
) -> Result<HttpResponse, ApiError> {
    Ok(ok(data.guests.update(&id, body.into_inner()).await?))
}

#[delete("/guests/{id}")]
pub(crate) async fn delete_guest(
    _user: StaffUser,
    id: web::Path<String>,
    data: web::Data<AppState>,
) -> Result<HttpResponse, ApiError> {
    data.guests.delete(&id).await?;
    Ok(deleted())
}

#[get("/loyalty/prizes")]
pub(crate) async fn list_prizes(_user: StaffUser) -> HttpResponse {
    ok(loyalty::PRIZES)
}

#[post("/loyalty/spin")]
pub(crate) async fn spin_wheel(_user: StaffUser, body: web::Json<SpinRequest>) -> Result<HttpResponse, ApiError> {
    Ok(ok(loyalty::spin(&body, &mut rand::thread_rng())?))
}

#[cfg(test)]
mod tests {
    use actix_web::http::StatusCode;
    use actix_web::test::{self, TestRequest};
    use serde_json::{json, Value};

    use crate::server::controller::testing::{admin_token, app, bearer, data, state};
    use crate::server::model::guest::Guest;
    use crate::server::service::loyalty::PRIZES;

    #[actix_web::test]
    async fn tier_filter_and_paging() {
        let state = state().await;
        let token = admin_token(&state).await;
        let app = test::init_service(app(state)).await;
        let req = TestRequest::get()
            .uri("/v1/admin/guests?loyaltyTier=Gold")
            .insert_header(bearer(&token))
            .to_request();
        let guests: Vec<Guest> = data(test::call_service(&app, req).await).await;
        let names: Vec<_> = guests.iter().map(|g| g.full_name.as_str()).collect();
        assert_eq!(names, vec!["Hiroshi Tanaka", "John Smith"]);

        let req = TestRequest::get()
            .uri("/v1/admin/guests?page=1&page_size=2")
            .insert_header(bearer(&token))
            .to_request();
        let guests: Vec<Guest> = data(test::call_service(&app, req).await).await;
        assert_eq!(guests.len(), 2);
        assert_eq!(guests[0].full_name, "John Smith");
    }

    #[actix_web::test]
    async fn spin_needs_a_name() {
        let state = state().await;
        let token = admin_token(&state).await;
        let app = test::init_service(app(state)).await;
        let req = TestRequest::post()
            .uri("/v1/admin/loyalty/spin")
            .insert_header(bearer(&token))
            .set_json(json!({ "guestName": "  " }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["error"], "Please enter guest name first");

        let req = TestRequest::post()
            .uri("/v1/admin/loyalty/spin")
            .insert_header(bearer(&token))
            .set_json(json!({ "guestName": "Emily Davis", "previousRotation": 720.0 }))
            .to_request();
        let result: Value = data(test::call_service(&app, req).await).await;
        let rotation = result["rotation"].as_f64().unwrap();
        assert!((2520.0..2880.0).contains(&rotation));
        let index = result["index"].as_u64().unwrap() as usize;
        assert_eq!(result["prize"], PRIZES[index]);
    }
}
