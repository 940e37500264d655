use actix_web::{delete, get, patch, post, web, HttpResponse};
use serde::Deserialize;

use crate::server::controller::error::ApiError;
use crate::server::controller::extract::StaffUser;
use crate::server::controller::{created, deleted, ok};
use crate::server::model::housekeeping::{TaskFilter, TaskPayload, TaskStatus};
use crate::server::model::room::StatusUpdate;
use crate::server::model::{parse_filter, CommonRequestParams};
use crate::server::state::AppState;

#[derive(Debug, Default, Deserialize)]
pub(crate) struct TaskQuery {
    pub status: Option<String>,
    pub assignee: Option<String>,
}

#[get("/housekeeping")]
pub(crate) async fn list_tasks(
    _user: StaffUser,
    query: web::Query<TaskQuery>,
    page: web::Query<CommonRequestParams>,
    data: web::Data<AppState>,
) -> Result<HttpResponse, ApiError> {
    let filter = TaskFilter {
        status: parse_filter(query.status.as_deref())?,
        assignee: query.assignee.clone(),
    };
    Ok(ok(page.paginate(data.housekeeping.list(&filter).await?)))
}

#[post("/housekeeping")]
pub(crate) async fn create_task(
    _user: StaffUser,
    body: web::Json<TaskPayload>,
    data: web::Data<AppState>,
) -> Result<HttpResponse, ApiError> {
    Ok(created(data.housekeeping.create(body.into_inner()).await?))
}

#[patch("/housekeeping/{id}/status")]
pub(crate) async fn update_task_status(
    _user: StaffUser,
    id: web::Path<String>,
    body: web::Json<StatusUpdate<TaskStatus>>,
    data: web::Data<AppState>,
) -> Result<HttpResponse, ApiError> {
    Ok(ok(data.housekeeping.update_status(&id, body.status).await?))
}

#[delete("/housekeeping/{id}")]
pub(crate) async fn delete_task(
    _user: StaffUser,
    id: web::Path<String>,
    data: web::Data<AppState>,
) -> Result<HttpResponse, ApiError> {
    data.housekeeping.delete(&id).await?;
    Ok(deleted())
}
