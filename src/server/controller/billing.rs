use actix_web::{get, post, put, web, HttpResponse};
use serde::Deserialize;

use crate::server::controller::error::ApiError;
use crate::server::controller::extract::StaffUser;
use crate::server::controller::{created, ok};
use crate::server::model::invoice::{
    InvoiceFilter, InvoicePayload, InvoiceView, PaymentPayload, RefundPayload,
};
use crate::server::model::{parse_filter, CommonRequestParams};
use crate::server::state::AppState;

#[derive(Debug, Default, Deserialize)]
pub(crate) struct InvoiceQuery {
    pub status: Option<String>,
    pub search: Option<String>,
}

#[get("/invoices")]
pub(crate) async fn list_invoices(
    _user: StaffUser,
    query: web::Query<InvoiceQuery>,
    page: web::Query<CommonRequestParams>,
    data: web::Data<AppState>,
) -> Result<HttpResponse, ApiError> {
    let filter = InvoiceFilter {
        status: parse_filter(query.status.as_deref())?,
        search: query.search.clone(),
    };
    let invoices = data.billing.list(&filter).await?;
    Ok(ok(page
        .paginate(invoices)
        .into_iter()
        .map(InvoiceView::from)
        .collect::<Vec<_>>()))
}

#[get("/invoices/{id}")]
pub(crate) async fn get_invoice(
    _user: StaffUser,
    id: web::Path<String>,
    data: web::Data<AppState>,
) -> Result<HttpResponse, ApiError> {
    Ok(ok(InvoiceView::from(data.billing.get(&id).await?)))
}

#[post("/invoices")]
pub(crate) async fn create_invoice(
    _user: StaffUser,
    body: web::Json<InvoicePayload>,
    data: web::Data<AppState>,
) -> Result<HttpResponse, ApiError> {
    Ok(created(InvoiceView::from(data.billing.create(body.into_inner()).await?)))
}

#[put("/invoices/{id}")]
pub(crate) async fn update_invoice(
    _user: StaffUser,
    id: web::Path<String>,
    body: web::Json<InvoicePayload>,
    data: web::Data<AppState>,
) -> Result<HttpResponse, ApiError> {
    Ok(ok(InvoiceView::from(data.billing.update(&id, body.into_inner()).await?)))
}

#[post("/invoices/{id}/payments")]
pub(crate) async fn record_payment(
    _user: StaffUser,
    id: web::Path<String>,
    body: web::Json<PaymentPayload>,
    data: web::Data<AppState>,
) -> Result<HttpResponse, ApiError> {
    Ok(ok(InvoiceView::from(data.billing.record_payment(&id, body.into_inner()).await?)))
}

#[post("/invoices/{id}/refunds")]
pub(crate) async fn record_refund(
    _user: StaffUser,
    id: web::Path<String>,
    body: web::Json<RefundPayload>,
    data: web::Data<AppState>,
) -> Result<HttpResponse, ApiError> {
    Ok(ok(InvoiceView::from(data.billing.record_refund(&id, body.into_inner()).await?)))
}
