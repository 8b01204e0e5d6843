use super::error::*;
use crate::application_port::ConnectionService;
use crate::domain_model::{ConnectionRequestId, Decision, UserId};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use warp::http::StatusCode;
use warp::{self, reject};

#[derive(Debug, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: Option<T>,
    pub error: Option<ApiError>,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn ok(data: T) -> Self {
        ApiResponse {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    pub fn err(code: ApiErrorCode, message: impl Into<String>) -> Self {
        ApiResponse {
            success: false,
            data: None,
            error: Some(ApiError {
                code,
                message: message.into(),
            }),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SendRequestBody {
    pub target_id: UserId,
}

pub async fn send_request(
    body: SendRequestBody,
    user_id: UserId,
    connection_service: Arc<dyn ConnectionService>,
) -> Result<impl warp::Reply, warp::Rejection> {
    let request = connection_service
        .send_request(user_id, body.target_id)
        .await
        .map_err(ApiErrorCode::from)
        .map_err(reject::custom)?;

    Ok(warp::reply::with_status(
        warp::reply::json(&ApiResponse::ok(request)),
        StatusCode::CREATED,
    ))
}

pub async fn list_outgoing(
    user_id: UserId,
    connection_service: Arc<dyn ConnectionService>,
) -> Result<impl warp::Reply, warp::Rejection> {
    let requests = connection_service
        .list_outgoing(user_id)
        .await
        .map_err(ApiErrorCode::from)
        .map_err(reject::custom)?;

    Ok(warp::reply::json(&ApiResponse::ok(requests)))
}

pub async fn list_incoming(
    user_id: UserId,
    connection_service: Arc<dyn ConnectionService>,
) -> Result<impl warp::Reply, warp::Rejection> {
    let requests = connection_service
        .list_incoming(user_id)
        .await
        .map_err(ApiErrorCode::from)
        .map_err(reject::custom)?;

    Ok(warp::reply::json(&ApiResponse::ok(requests)))
}

pub async fn list_connections(
    user_id: UserId,
    connection_service: Arc<dyn ConnectionService>,
) -> Result<impl warp::Reply, warp::Rejection> {
    let connections = connection_service
        .list_connections(user_id)
        .await
        .map_err(ApiErrorCode::from)
        .map_err(reject::custom)?;

    Ok(warp::reply::json(&ApiResponse::ok(connections)))
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ResolveBody {
    pub action: Decision,
}

pub async fn resolve_request(
    request_id: ConnectionRequestId,
    body: ResolveBody,
    user_id: UserId,
    connection_service: Arc<dyn ConnectionService>,
) -> Result<impl warp::Reply, warp::Rejection> {
    let request = connection_service
        .resolve_request(user_id, request_id, body.action)
        .await
        .map_err(ApiErrorCode::from)
        .map_err(reject::custom)?;

    Ok(warp::reply::json(&ApiResponse::ok(request)))
}
