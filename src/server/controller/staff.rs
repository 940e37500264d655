//! Staff records and account administration, managers and admins only.

use actix_web::{delete, get, patch, post, put, web, HttpResponse};
use serde::Deserialize;

use crate::server::controller::error::ApiError;
use crate::server::controller::extract::ManagerUser;
use crate::server::controller::{created, deleted, ok};
use crate::server::model::staff::{StaffFilter, StaffPayload};
use crate::server::model::user::{RegisterRequest, UserAdminUpdate, UserProfile};
use crate::server::model::CommonRequestParams;
use crate::server::state::AppState;

#[derive(Debug, Default, Deserialize)]
pub(crate) struct StaffQuery {
    pub search: Option<String>,
    pub department: Option<String>,
}

#[get("/staff")]
pub(crate) async fn list_staff(
    _user: ManagerUser,
    query: web::Query<StaffQuery>,
    page: web::Query<CommonRequestParams>,
    data: web::Data<AppState>,
) -> Result<HttpResponse, ApiError> {
    let filter = StaffFilter {
        search: query.search.clone(),
        department: query.department.clone(),
    };
    Ok(ok(page.paginate(data.staff.list(&filter).await?)))
}

#[get("/staff/{id}")]
pub(crate) async fn get_staff(
    _user: ManagerUser,
    id: web::Path<String>,
    data: web::Data<AppState>,
) -> Result<HttpResponse, ApiError> {
    Ok(ok(data.staff.get(&id).await?))
}

#[post("/staff")]
pub(crate) async fn create_staff(
    _user: ManagerUser,
    body: web::Json<StaffPayload>,
    data: web::Data<AppState>,
) -> Result<HttpResponse, ApiError> {
    Ok(created(data.staff.create(body.into_inner()).await?))
}

#[put("/staff/{id}")]
pub(crate) async fn update_staff(
    _user: ManagerUser,
    id: web::Path<String>,
    body: web::Json<StaffPayload>,
    data: web::Data<AppState>,
) -> Result<HttpResponse, ApiError> {
    Ok(ok(data.staff.update(&id, body.into_inner()).await?))
}

#[delete("/staff/{id}")]
pub(crate) async fn delete_staff(
    _user: ManagerUser,
    id: web::Path<String>,
    data: web::Data<AppState>,
) -> Result<HttpResponse, ApiError> {
    data.staff.delete(&id).await?;
    Ok(deleted())
}

#[get("/departments")]
pub(crate) async fn list_departments(_user: ManagerUser, data: web::Data<AppState>) -> Result<HttpResponse, ApiError> {
    Ok(ok(data.staff.departments().await?))
}

#[get("/users")]
pub(crate) async fn list_users(
    _user: ManagerUser,
    page: web::Query<CommonRequestParams>,
    data: web::Data<AppState>,
) -> Result<HttpResponse, ApiError> {
    Ok(ok(page.paginate(data.auth.list_users().await?)))
}

#[post("/users")]
/// Create an account for someone else. Roles other than customer need an admin.
pub(crate) async fn create_user(
    user: ManagerUser,
    body: web::Json<RegisterRequest>,
    data: web::Data<AppState>,
) -> Result<HttpResponse, ApiError> {
    let account = data.auth.create_account(body.into_inner(), Some(&user.0)).await?;
    Ok(created(UserProfile::from(&account)))
}

#[patch("/users/{id}")]
pub(crate) async fn update_user(
    user: ManagerUser,
    id: web::Path<String>,
    body: web::Json<UserAdminUpdate>,
    data: web::Data<AppState>,
) -> Result<HttpResponse, ApiError> {
    Ok(ok(data.auth.update_user(&user, &id, body.into_inner()).await?))
}

#[cfg(test)]
mod tests {
    use actix_web::http::StatusCode;
    use actix_web::test::{self, TestRequest};
    use serde_json::json;

    use crate::server::controller::testing::{admin_token, app, bearer, data, state};
    use crate::server::model::staff::Department;
    use crate::server::model::user::{Role, UserProfile};

    #[actix_web::test]
    async fn receptionists_cannot_manage_staff() {
        let state = state().await;
        let token = admin_token(&state).await;
        let app = test::init_service(app(state)).await;

        let req = TestRequest::post()
            .uri("/v1/admin/users")
            .insert_header(bearer(&token))
            .set_json(json!({
                "email": "desk@luxestay.com",
                "password": "frontdesk",
                "displayName": "Front Desk",
                "role": "receptionist"
            }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::CREATED);
        let profile: UserProfile = data(resp).await;
        assert_eq!(profile.role, Role::Receptionist);

        let req = TestRequest::post()
            .uri("/v1/auth/sign-in")
            .set_json(json!({ "email": "desk@luxestay.com", "password": "frontdesk" }))
            .to_request();
        let session: serde_json::Value = data(test::call_service(&app, req).await).await;
        let desk_token = session["token"].as_str().unwrap().to_string();

        let req = TestRequest::get()
            .uri("/v1/admin/staff")
            .insert_header(bearer(&desk_token))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::FORBIDDEN);

        // but the front desk can still see the guest list
        let req = TestRequest::get()
            .uri("/v1/admin/guests")
            .insert_header(bearer(&desk_token))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::OK);
    }

    #[actix_web::test]
    async fn departments_with_counts() {
        let state = state().await;
        let token = admin_token(&state).await;
        let app = test::init_service(app(state)).await;
        let req = TestRequest::get()
            .uri("/v1/admin/departments")
            .insert_header(bearer(&token))
            .to_request();
        let departments: Vec<Department> = data(test::call_service(&app, req).await).await;
        assert_eq!(departments.len(), 6);
        let kitchen = departments.iter().find(|d| d.name == "Kitchen").unwrap();
        assert_eq!(kitchen.staff_count, 1);
    }
}
