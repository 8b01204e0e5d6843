use super::error::*;
use super::handler;
use crate::application_port::IdentityService;
use crate::domain_model::{ConnectionRequestId, UserId};
use crate::server::Server;
use nanoid::nanoid;
use std::convert::Infallible;
use std::sync::Arc;
use warp::{Filter, http, reject};

const MAX_BODY_BYTES: u64 = 16 * 1024;

/// All v1 routes, rooted at `/api/v1`, with error recovery and a request span.
pub fn routes(
    server: Arc<Server>,
) -> impl Filter<Extract = (impl warp::Reply,), Error = Infallible> + Clone {
    let send_request = warp::path!("connections" / "requests")
        .and(warp::post())
        .and(warp::body::content_length_limit(MAX_BODY_BYTES))
        .and(warp::body::json())
        .and(with_verification(server.identity_service.clone()))
        .and(with(server.connection_service.clone()))
        .and_then(handler::send_request);

    let list_outgoing = warp::path!("connections" / "requests" / "outgoing")
        .and(warp::get())
        .and(with_verification(server.identity_service.clone()))
        .and(with(server.connection_service.clone()))
        .and_then(handler::list_outgoing);

    let list_incoming = warp::path!("connections" / "requests" / "incoming")
        .and(warp::get())
        .and(with_verification(server.identity_service.clone()))
        .and(with(server.connection_service.clone()))
        .and_then(handler::list_incoming);

    let list_connections = warp::path!("connections")
        .and(warp::get())
        .and(with_verification(server.identity_service.clone()))
        .and(with(server.connection_service.clone()))
        .and_then(handler::list_connections);

    let resolve_request = warp::path!("connections" / "requests" / ConnectionRequestId / "resolve")
        .and(warp::post())
        .and(warp::body::content_length_limit(MAX_BODY_BYTES))
        .and(warp::body::json())
        .and(with_verification(server.identity_service.clone()))
        .and(with(server.connection_service.clone()))
        .and_then(handler::resolve_request);

    let api = send_request
        .or(list_outgoing)
        .or(list_incoming)
        .or(list_connections)
        .or(resolve_request);

    warp::path("api")
        .and(warp::path("v1"))
        .and(api)
        .recover(recover_error)
        .with(warp::trace(|info| {
            tracing::info_span!(
                "http",
                id = %nanoid!(10),
                method = %info.method(),
                path = %info.path(),
            )
        }))
}

fn with<ServiceType>(
    service: Arc<ServiceType>,
) -> impl Filter<Extract = (Arc<ServiceType>,), Error = Infallible> + Clone
where
    ServiceType: Send + Sync + ?Sized,
{
    warp::any().map(move || service.clone())
}

fn with_verification(
    identity_service: Arc<dyn IdentityService>,
) -> impl Filter<Extract = (UserId,), Error = warp::Rejection> + Clone {
    warp::header::<String>(http::header::AUTHORIZATION.as_ref()).and_then(move |token: String| {
        let identity_service = identity_service.clone();
        async move {
            if let Some(token) = token.strip_prefix("Bearer ") {
                let user_id = identity_service
                    .verify_token(token)
                    .await
                    .map_err(ApiErrorCode::from)
                    .map_err(reject::custom)?;
                Ok(user_id)
            } else {
                Err(reject::custom(ApiErrorCode::InvalidToken))
            }
        }
    })
}
