use actix_web::{get, web, HttpResponse};

use crate::server::controller::error::ApiError;
use crate::server::controller::extract::StaffUser;
use crate::server::controller::ok;
use crate::server::state::AppState;
use crate::server::util::time::helper;

#[get("/dashboard")]
pub(crate) async fn dashboard(_user: StaffUser, data: web::Data<AppState>) -> Result<HttpResponse, ApiError> {
    Ok(ok(data.reports.dashboard(helper::today()).await?))
}

#[get("/reports/revenue")]
pub(crate) async fn revenue_report(_user: StaffUser, data: web::Data<AppState>) -> Result<HttpResponse, ApiError> {
    Ok(ok(data.reports.revenue(helper::today()).await?))
}
