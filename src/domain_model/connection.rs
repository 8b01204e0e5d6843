use crate::application_port::ConnectionError;
use crate::domain_model::{UserId, UserPair};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(
    Debug, Clone, Copy, Ord, PartialOrd, Eq, PartialEq, Hash, Serialize, Deserialize, sqlx::Type,
)]
#[sqlx(transparent)]
pub struct ConnectionRequestId(pub uuid::Uuid);

impl ConnectionRequestId {
    pub fn generate() -> Self {
        ConnectionRequestId(uuid::Uuid::now_v7())
    }
}

impl fmt::Display for ConnectionRequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for ConnectionRequestId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        uuid::Uuid::from_str(s).map(ConnectionRequestId)
    }
}

#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConnectionStatus {
    Pending,
    Accepted,
    Rejected,
}

impl ConnectionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ConnectionStatus::Pending => "pending",
            ConnectionStatus::Accepted => "accepted",
            ConnectionStatus::Rejected => "rejected",
        }
    }

    /// Pending and accepted records both occupy the pair.
    pub fn is_open(&self) -> bool {
        matches!(self, ConnectionStatus::Pending | ConnectionStatus::Accepted)
    }
}

impl FromStr for ConnectionStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(ConnectionStatus::Pending),
            "accepted" => Ok(ConnectionStatus::Accepted),
            "rejected" => Ok(ConnectionStatus::Rejected),
            other => Err(format!("unknown connection status: {other}")),
        }
    }
}

/// What the target chose to do with a pending request.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Decision {
    Accept,
    Reject,
}

impl Decision {
    pub fn outcome(&self) -> ConnectionStatus {
        match self {
            Decision::Accept => ConnectionStatus::Accepted,
            Decision::Reject => ConnectionStatus::Rejected,
        }
    }
}

#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectionRequest {
    pub id: ConnectionRequestId,
    pub requester_id: UserId,
    pub target_id: UserId,
    pub status: ConnectionStatus,
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resolved_at: Option<DateTime<Utc>>,
}

impl ConnectionRequest {
    pub fn new_pending(
        requester_id: UserId,
        target_id: UserId,
        created_at: DateTime<Utc>,
    ) -> Result<Self, ConnectionError> {
        if requester_id == target_id {
            return Err(ConnectionError::InvalidTarget);
        }

        Ok(ConnectionRequest {
            id: ConnectionRequestId::generate(),
            requester_id,
            target_id,
            status: ConnectionStatus::Pending,
            created_at,
            resolved_at: None,
        })
    }

    pub fn pair(&self) -> UserPair {
        UserPair::new(self.requester_id, self.target_id)
    }

    /// Applies the target's decision. Only `pending -> accepted|rejected` is legal,
    /// and only the target may drive it.
    pub fn resolve(
        &self,
        caller: UserId,
        decision: Decision,
        resolved_at: DateTime<Utc>,
    ) -> Result<Self, ConnectionError> {
        if caller != self.target_id {
            return Err(ConnectionError::Forbidden);
        }
        if self.status != ConnectionStatus::Pending {
            return Err(ConnectionError::AlreadyResolved);
        }

        Ok(ConnectionRequest {
            status: decision.outcome(),
            resolved_at: Some(resolved_at),
            ..self.clone()
        })
    }
}

/// Classifies the open record that blocked a new request for the same pair.
pub fn conflict_error(existing: ConnectionStatus) -> ConnectionError {
    match existing {
        ConnectionStatus::Accepted => ConnectionError::AlreadyConnected,
        _ => ConnectionError::DuplicatePending,
    }
}
