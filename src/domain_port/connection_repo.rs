use crate::application_port::*;
use crate::domain_model::*;
use chrono::{DateTime, Utc};

/// Result of trying to occupy an unordered pair with a new pending request.
#[derive(Debug)]
pub enum PairClaim {
    Won,
    /// The pair is already occupied by this open (pending or accepted) record.
    Existing(ConnectionRequest),
}

#[async_trait::async_trait]
pub trait ConnectionRepo: Send + Sync {
    /// Atomically insert `request` unless an open record exists for its pair.
    async fn claim_pair(&self, request: &ConnectionRequest) -> Result<PairClaim, ConnectionError>;

    async fn list_pending_from(
        &self,
        requester: UserId,
    ) -> Result<Vec<ConnectionRequest>, ConnectionError>;

    async fn list_pending_to(&self, target: UserId)
    -> Result<Vec<ConnectionRequest>, ConnectionError>;

    /// Accepted records touching `user_id`, most recently resolved first.
    async fn list_accepted_for(
        &self,
        user_id: UserId,
    ) -> Result<Vec<ConnectionRequest>, ConnectionError>;

    /// Load, check and update the record under one lock or transaction.
    async fn resolve(
        &self,
        request_id: ConnectionRequestId,
        caller: UserId,
        decision: Decision,
        resolved_at: DateTime<Utc>,
    ) -> Result<ConnectionRequest, ConnectionError>;

    async fn purge_rejected(&self, before: DateTime<Utc>) -> Result<u64, ConnectionError>;
}
