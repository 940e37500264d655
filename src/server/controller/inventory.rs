use actix_web::{delete, get, post, put, web, HttpResponse};

use crate::server::controller::error::ApiError;
use crate::server::controller::extract::StaffUser;
use crate::server::controller::{created, deleted, ok};
use crate::server::model::inventory::InventoryPayload;
use crate::server::model::CommonRequestParams;
use crate::server::state::AppState;

#[get("/inventory")]
pub(crate) async fn list_inventory(
    _user: StaffUser,
    page: web::Query<CommonRequestParams>,
    data: web::Data<AppState>,
) -> Result<HttpResponse, ApiError> {
    Ok(ok(page.paginate(data.inventory.list().await?)))
}

#[post("/inventory")]
pub(crate) async fn add_inventory_item(
    _user: StaffUser,
    body: web::Json<InventoryPayload>,
    data: web::Data<AppState>,
) -> Result<HttpResponse, ApiError> {
    Ok(created(data.inventory.add(body.into_inner()).await?))
}

#[put("/inventory/{id}")]
pub(crate) async fn update_inventory_item(
    _user: StaffUser,
    id: web::Path<String>,
    body: web::Json<InventoryPayload>,
    data: web::Data<AppState>,
) -> Result<HttpResponse, ApiError> {
    Ok(ok(data.inventory.update(&id, body.into_inner()).await?))
}

#[delete("/inventory/{id}")]
pub(crate) async fn delete_inventory_item(
    _user: StaffUser,
    id: web::Path<String>,
    data: web::Data<AppState>,
) -> Result<HttpResponse, ApiError> {
    data.inventory.delete(&id).await?;
    Ok(deleted())
}

#[cfg(test)]
mod tests {
    use actix_web::test::{self, TestRequest};
    use serde_json::{json, Value};

    use crate::server::controller::testing::{admin_token, app, bearer, data, state};

    #[actix_web::test]
    async fn update_recomputes_status() {
        let state = state().await;
        let token = admin_token(&state).await;
        let app = test::init_service(app(state)).await;
        let req = TestRequest::put()
            .uri("/v1/admin/inventory/inv_4")
            .insert_header(bearer(&token))
            .set_json(json!({ "name": "Coffee Beans", "quantity": 12, "unit": "kg", "minThreshold": 5 }))
            .to_request();
        let item: Value = data(test::call_service(&app, req).await).await;
        assert_eq!(item["status"], "OK");
    }
}
