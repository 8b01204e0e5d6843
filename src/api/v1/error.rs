use crate::api::v1::handler::ApiResponse;
use crate::application_port::*;
use serde::{Deserialize, Serialize};
use std::convert::Infallible;
use thiserror::Error;
use tracing::warn;
use warp::http::StatusCode;
use warp::{Rejection, reject};

pub async fn recover_error(err: Rejection) -> Result<impl warp::Reply, Infallible> {
    let code = if let Some(code) = err.find::<ApiErrorCode>() {
        *code
    } else if err.find::<reject::MissingHeader>().is_some()
        || err.find::<reject::InvalidHeader>().is_some()
    {
        ApiErrorCode::InvalidToken
    } else if err.find::<warp::filters::body::BodyDeserializeError>().is_some()
        || err.find::<reject::UnsupportedMediaType>().is_some()
        || err.find::<reject::PayloadTooLarge>().is_some()
        || err.find::<reject::LengthRequired>().is_some()
    {
        ApiErrorCode::BadRequest
    } else if err.is_not_found() {
        ApiErrorCode::RouteNotFound
    } else if err.find::<reject::MethodNotAllowed>().is_some() {
        ApiErrorCode::MethodNotAllowed
    } else {
        warn!("Unhandled rejection: {:?}", err);
        ApiErrorCode::InternalError
    };

    let json = warp::reply::json(&ApiResponse::<()>::err(code, code.to_string()));
    Ok(warp::reply::with_status(json, code.status()))
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ApiError {
    pub code: ApiErrorCode,
    pub message: String,
}

#[derive(Debug, Clone, Copy, Eq, PartialEq, Error, Serialize, Deserialize)]
pub enum ApiErrorCode {
    #[error("Cannot send a connection request to yourself")]
    InvalidTarget,
    #[error("User not found")]
    UserNotFound,
    #[error("A pending request already exists between these users")]
    DuplicatePending,
    #[error("Users are already connected")]
    AlreadyConnected,
    #[error("Connection request not found")]
    NotFound,
    #[error("Only the addressee may resolve this request")]
    Forbidden,
    #[error("Connection request already resolved")]
    AlreadyResolved,
    #[error("Token is not valid")]
    InvalidToken,
    #[error("Token has expired")]
    TokenExpired,
    #[error("Malformed request")]
    BadRequest,
    #[error("No such route")]
    RouteNotFound,
    #[error("Method not allowed")]
    MethodNotAllowed,
    #[error("Internal error")]
    InternalError,
}

impl ApiErrorCode {
    pub fn internal<E: std::fmt::Display>(error: E) -> ApiErrorCode {
        warn!("Internal error: {}", error);
        ApiErrorCode::InternalError
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ApiErrorCode::InvalidTarget | ApiErrorCode::BadRequest => StatusCode::BAD_REQUEST,
            ApiErrorCode::InvalidToken | ApiErrorCode::TokenExpired => StatusCode::UNAUTHORIZED,
            ApiErrorCode::Forbidden => StatusCode::FORBIDDEN,
            ApiErrorCode::UserNotFound | ApiErrorCode::NotFound | ApiErrorCode::RouteNotFound => {
                StatusCode::NOT_FOUND
            }
            ApiErrorCode::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            ApiErrorCode::DuplicatePending
            | ApiErrorCode::AlreadyConnected
            | ApiErrorCode::AlreadyResolved => StatusCode::CONFLICT,
            ApiErrorCode::InternalError => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl reject::Reject for ApiErrorCode {}

impl From<ConnectionError> for ApiErrorCode {
    fn from(error: ConnectionError) -> Self {
        match error {
            ConnectionError::InvalidTarget => ApiErrorCode::InvalidTarget,
            ConnectionError::UserNotFound => ApiErrorCode::UserNotFound,
            ConnectionError::DuplicatePending => ApiErrorCode::DuplicatePending,
            ConnectionError::AlreadyConnected => ApiErrorCode::AlreadyConnected,
            ConnectionError::NotFound => ApiErrorCode::NotFound,
            ConnectionError::Forbidden => ApiErrorCode::Forbidden,
            ConnectionError::AlreadyResolved => ApiErrorCode::AlreadyResolved,
            ConnectionError::Store(e) => ApiErrorCode::internal(e),
        }
    }
}

impl From<IdentityError> for ApiErrorCode {
    fn from(error: IdentityError) -> Self {
        match error {
            IdentityError::TokenInvalid => ApiErrorCode::InvalidToken,
            IdentityError::TokenExpired => ApiErrorCode::TokenExpired,
            IdentityError::Internal(e) => ApiErrorCode::internal(e),
        }
    }
}
