use crate::application_port::*;
use crate::domain_model::*;
use crate::domain_port::*;
use chrono::{DateTime, Utc};
use std::cmp::Reverse;
use tokio::sync::Mutex;

/// Process-local relationship store. One mutex serializes every check-and-write,
/// which gives the same pair guarantees as the unique index in MySQL.
#[derive(Default)]
pub struct MemoryConnectionRepo {
    // insertion order doubles as the tiebreaker for equal timestamps
    records: Mutex<Vec<ConnectionRequest>>,
}

impl MemoryConnectionRepo {
    pub fn new() -> Self {
        Self::default()
    }

    async fn pending_where<F>(&self, pred: F) -> Vec<ConnectionRequest>
    where
        F: Fn(&ConnectionRequest) -> bool,
    {
        let records = self.records.lock().await;
        let mut found: Vec<(usize, &ConnectionRequest)> = records
            .iter()
            .enumerate()
            .filter(|(_, r)| r.status == ConnectionStatus::Pending && pred(r))
            .collect();
        found.sort_by_key(|(seq, r)| (Reverse(r.created_at), Reverse(*seq)));
        found.into_iter().map(|(_, r)| r.clone()).collect()
    }
}

#[async_trait::async_trait]
impl ConnectionRepo for MemoryConnectionRepo {
    async fn claim_pair(&self, request: &ConnectionRequest) -> Result<PairClaim, ConnectionError> {
        let pair = request.pair();
        let mut records = self.records.lock().await;

        if let Some(existing) = records
            .iter()
            .find(|r| r.status.is_open() && r.pair() == pair)
        {
            return Ok(PairClaim::Existing(existing.clone()));
        }

        records.push(request.clone());
        Ok(PairClaim::Won)
    }

    async fn list_pending_from(
        &self,
        requester: UserId,
    ) -> Result<Vec<ConnectionRequest>, ConnectionError> {
        Ok(self.pending_where(|r| r.requester_id == requester).await)
    }

    async fn list_pending_to(
        &self,
        target: UserId,
    ) -> Result<Vec<ConnectionRequest>, ConnectionError> {
        Ok(self.pending_where(|r| r.target_id == target).await)
    }

    async fn list_accepted_for(
        &self,
        user_id: UserId,
    ) -> Result<Vec<ConnectionRequest>, ConnectionError> {
        let records = self.records.lock().await;
        let mut found: Vec<(usize, &ConnectionRequest)> = records
            .iter()
            .enumerate()
            .filter(|(_, r)| {
                r.status == ConnectionStatus::Accepted
                    && (r.requester_id == user_id || r.target_id == user_id)
            })
            .collect();
        found.sort_by_key(|(seq, r)| (Reverse(r.resolved_at), Reverse(*seq)));
        Ok(found.into_iter().map(|(_, r)| r.clone()).collect())
    }

    async fn resolve(
        &self,
        request_id: ConnectionRequestId,
        caller: UserId,
        decision: Decision,
        resolved_at: DateTime<Utc>,
    ) -> Result<ConnectionRequest, ConnectionError> {
        let mut records = self.records.lock().await;
        let record = records
            .iter_mut()
            .find(|r| r.id == request_id)
            .ok_or(ConnectionError::NotFound)?;

        let resolved = record.resolve(caller, decision, resolved_at)?;
        *record = resolved.clone();
        Ok(resolved)
    }

    async fn purge_rejected(&self, before: DateTime<Utc>) -> Result<u64, ConnectionError> {
        let mut records = self.records.lock().await;
        let len = records.len();
        records.retain(|r| {
            !(r.status == ConnectionStatus::Rejected && r.resolved_at.is_some_and(|at| at < before))
        });
        Ok((len - records.len()) as u64)
    }
}
