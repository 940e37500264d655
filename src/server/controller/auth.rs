use actix_web::{get, post, web, HttpResponse};

use crate::server::controller::error::ApiError;
use crate::server::controller::extract::CurrentUser;
use crate::server::controller::{created, ok};
use crate::server::model::user::{
    ChangePasswordRequest, FederatedSignInRequest, RegisterRequest, ResetPasswordRequest,
    SignInRequest,
};
use crate::server::state::AppState;

#[post("/auth/register")]
pub(crate) async fn register(body: web::Json<RegisterRequest>, data: web::Data<AppState>) -> Result<HttpResponse, ApiError> {
    Ok(created(data.auth.register(body.into_inner()).await?))
}

#[post("/auth/sign-in")]
pub(crate) async fn sign_in(body: web::Json<SignInRequest>, data: web::Data<AppState>) -> Result<HttpResponse, ApiError> {
    Ok(ok(data.auth.sign_in(body.into_inner()).await?))
}

#[post("/auth/federated")]
pub(crate) async fn federated_sign_in(
    body: web::Json<FederatedSignInRequest>,
    data: web::Data<AppState>,
) -> Result<HttpResponse, ApiError> {
    Ok(ok(data.auth.federated_sign_in(body.into_inner()).await?))
}

#[post("/auth/sign-out")]
pub(crate) async fn sign_out(user: CurrentUser, data: web::Data<AppState>) -> Result<HttpResponse, ApiError> {
    data.auth.sign_out(&user.token)?;
    Ok(ok(serde_json::json!({ "signedOut": true })))
}

#[get("/auth/me")]
pub(crate) async fn me(user: CurrentUser, data: web::Data<AppState>) -> Result<HttpResponse, ApiError> {
    Ok(ok(data.auth.current_user(&user).await?))
}

#[post("/auth/password")]
pub(crate) async fn change_password(
    user: CurrentUser,
    body: web::Json<ChangePasswordRequest>,
    data: web::Data<AppState>,
) -> Result<HttpResponse, ApiError> {
    data.auth.change_password(&user, body.into_inner()).await?;
    Ok(ok(serde_json::json!({ "changed": true })))
}

#[post("/auth/password-reset")]
pub(crate) async fn request_password_reset(
    body: web::Json<ResetPasswordRequest>,
    data: web::Data<AppState>,
) -> Result<HttpResponse, ApiError> {
    data.auth.request_password_reset(body.into_inner()).await?;
    Ok(ok(serde_json::json!({ "sent": true })))
}
