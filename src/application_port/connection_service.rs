use crate::domain_model::*;
use chrono::{DateTime, Utc};

#[derive(Debug, thiserror::Error)]
pub enum ConnectionError {
    #[error("cannot send a connection request to yourself")]
    InvalidTarget,
    #[error("user not found")]
    UserNotFound,
    #[error("a pending request already exists between these users")]
    DuplicatePending,
    #[error("users are already connected")]
    AlreadyConnected,
    #[error("connection request not found")]
    NotFound,
    #[error("only the addressee may resolve this request")]
    Forbidden,
    #[error("connection request already resolved")]
    AlreadyResolved,
    #[error("store error: {0}")]
    Store(String),
}

#[async_trait::async_trait]
pub trait ConnectionService: Send + Sync {
    async fn send_request(
        &self,
        requester: UserId,
        target: UserId,
    ) -> Result<ConnectionRequest, ConnectionError>;
    async fn list_outgoing(&self, user_id: UserId)
    -> Result<Vec<ConnectionRequest>, ConnectionError>;
    async fn list_incoming(&self, user_id: UserId)
    -> Result<Vec<ConnectionRequest>, ConnectionError>;
    async fn list_connections(&self, user_id: UserId) -> Result<Vec<UserId>, ConnectionError>;
    async fn resolve_request(
        &self,
        caller: UserId,
        request_id: ConnectionRequestId,
        decision: Decision,
    ) -> Result<ConnectionRequest, ConnectionError>;
    /// Administrative: drop rejected history resolved before `before`.
    async fn purge_rejected(&self, before: DateTime<Utc>) -> Result<u64, ConnectionError>;
}
