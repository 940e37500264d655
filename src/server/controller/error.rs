use actix_web::http::StatusCode;
use actix_web::{error, HttpResponse};
use derive_more::{Display, Error};
use log::error;

use crate::server::database::StoreError;
use crate::server::model::ApiResponse;
use crate::server::service::auth::AuthError;

#[derive(Debug, Display, Error)]
pub(crate) enum ApiError {
    #[display("server is busy")]
    ServerIsBusy,
    #[display("{message}")]
    BadRequest { message: String },
    #[display("{what} not found")]
    NotFound { what: String },
    #[display("{message}")]
    Conflict { message: String },
    #[display("cannot change status from {from} to {to}")]
    IllegalTransition { from: String, to: String },
    #[display("please sign in to continue")]
    Unauthorized,
    #[display("you do not have permission to perform this action")]
    Forbidden,
    #[display("{_0}")]
    Auth(AuthError),
    #[display("database error")]
    DbError,
    #[display("timeout occurred")]
    Timeout,
}

impl ApiError {
    pub fn validation(message: impl Into<String>) -> Self {
        ApiError::BadRequest {
            message: message.into(),
        }
    }

    pub fn not_found(what: impl Into<String>) -> Self {
        ApiError::NotFound { what: what.into() }
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        ApiError::Conflict {
            message: message.into(),
        }
    }

    pub fn illegal_transition(from: impl std::fmt::Display, to: impl std::fmt::Display) -> Self {
        ApiError::IllegalTransition {
            from: from.to_string(),
            to: to.to_string(),
        }
    }
}

impl From<StoreError> for ApiError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::NotFound { collection, id } => {
                ApiError::not_found(format!("{collection}/{id}"))
            }
            StoreError::Duplicate { collection, id } => {
                ApiError::conflict(format!("{collection}/{id} already exists"))
            }
            StoreError::Busy => ApiError::ServerIsBusy,
            StoreError::Timeout => ApiError::Timeout,
            e => {
                error!("store failure, {}", e);
                ApiError::DbError
            }
        }
    }
}

impl From<AuthError> for ApiError {
    fn from(e: AuthError) -> Self {
        ApiError::Auth(e)
    }
}

impl error::ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::ServerIsBusy => StatusCode::SERVICE_UNAVAILABLE,
            ApiError::BadRequest { .. } => StatusCode::BAD_REQUEST,
            ApiError::NotFound { .. } => StatusCode::NOT_FOUND,
            ApiError::Conflict { .. } | ApiError::IllegalTransition { .. } => StatusCode::CONFLICT,
            ApiError::Unauthorized => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden => StatusCode::FORBIDDEN,
            ApiError::Auth(e) => e.status_code(),
            ApiError::DbError => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::Timeout => StatusCode::GATEWAY_TIMEOUT,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(ApiResponse::<()>::failure(self.to_string()))
    }
}
