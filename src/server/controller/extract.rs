//! Caller identity extractors.
//!
//! The bearer token in `Authorization` is resolved against the session store.
//! [`StaffUser`] and [`ManagerUser`] additionally check the role and answer
//! 403 when it is not high enough.

use std::future::{ready, Ready};
use std::ops::Deref;

use actix_web::dev::Payload;
use actix_web::http::header::AUTHORIZATION;
use actix_web::{web, FromRequest, HttpRequest};
use log::error;

use crate::server::controller::error::ApiError;
use crate::server::service::auth::Session;
use crate::server::state::AppState;

fn bearer_token(req: &HttpRequest) -> Option<&str> {
    req.headers()
        .get(AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|t| !t.is_empty())
}

fn resolve(req: &HttpRequest) -> Result<Session, ApiError> {
    let Some(state) = req.app_data::<web::Data<AppState>>() else {
        error!("app state is not registered");
        return Err(ApiError::DbError);
    };
    let token = bearer_token(req).ok_or(ApiError::Unauthorized)?;
    Ok(state.auth.session(token)?)
}

/// Any signed-in user.
#[derive(Debug, Clone)]
pub(crate) struct CurrentUser(pub Session);

impl Deref for CurrentUser {
    type Target = Session;

    fn deref(&self) -> &Session {
        &self.0
    }
}

impl FromRequest for CurrentUser {
    type Error = ApiError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        ready(resolve(req).map(CurrentUser))
    }
}

/// Admin, manager, receptionist or staff.
#[derive(Debug, Clone)]
pub(crate) struct StaffUser(pub Session);

impl Deref for StaffUser {
    type Target = Session;

    fn deref(&self) -> &Session {
        &self.0
    }
}

impl FromRequest for StaffUser {
    type Error = ApiError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        ready(resolve(req).and_then(|s| {
            if s.role.is_staff() {
                Ok(StaffUser(s))
            } else {
                Err(ApiError::Forbidden)
            }
        }))
    }
}

/// Admin or manager.
#[derive(Debug, Clone)]
pub(crate) struct ManagerUser(pub Session);

impl Deref for ManagerUser {
    type Target = Session;

    fn deref(&self) -> &Session {
        &self.0
    }
}

impl FromRequest for ManagerUser {
    type Error = ApiError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        ready(resolve(req).and_then(|s| {
            if s.role.is_manager() {
                Ok(ManagerUser(s))
            } else {
                Err(ApiError::Forbidden)
            }
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::test::TestRequest;

    #[test]
    fn bearer_token_parsing() {
        let req = TestRequest::default()
            .insert_header((AUTHORIZATION, "Bearer abc123"))
            .to_http_request();
        assert_eq!(bearer_token(&req), Some("abc123"));

        let req = TestRequest::default()
            .insert_header((AUTHORIZATION, "Basic abc123"))
            .to_http_request();
        assert_eq!(bearer_token(&req), None);

        let req = TestRequest::default().to_http_request();
        assert_eq!(bearer_token(&req), None);
    }
}
