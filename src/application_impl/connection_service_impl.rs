use crate::application_port::*;
use crate::domain_model::*;
use crate::domain_port::*;
use crate::logger::*;
use chrono::{DateTime, SubsecRound, Utc};
use std::collections::HashSet;
use std::sync::Arc;

pub struct RealConnectionService {
    user_repo: Arc<dyn UserRepo>,
    connection_repo: Arc<dyn ConnectionRepo>,
    connection_cache: Arc<dyn ConnectionCache>,
}

impl RealConnectionService {
    pub fn new(
        user_repo: Arc<dyn UserRepo>,
        connection_repo: Arc<dyn ConnectionRepo>,
        connection_cache: Arc<dyn ConnectionCache>,
    ) -> Self {
        Self {
            user_repo,
            connection_repo,
            connection_cache,
        }
    }

    // the MySQL backend stores microseconds
    fn now() -> DateTime<Utc> {
        Utc::now().trunc_subsecs(6)
    }

    // best-effort; cache errors never fail the call
    async fn invalidate(&self, users: &[UserId]) {
        if let Err(e) = self.connection_cache.invalidate(users).await {
            warn!("invalidate connection cache: {e}");
        }
    }
}

#[async_trait::async_trait]
impl ConnectionService for RealConnectionService {
    async fn send_request(
        &self,
        requester: UserId,
        target: UserId,
    ) -> Result<ConnectionRequest, ConnectionError> {
        let request = ConnectionRequest::new_pending(requester, target, Self::now())?;

        if !self.user_repo.id_exists(target).await? {
            return Err(ConnectionError::UserNotFound);
        }

        match self.connection_repo.claim_pair(&request).await? {
            PairClaim::Won => {
                self.invalidate(&[requester, target]).await;
                info!(request_id = %request.id, %requester, %target, "connection request sent");
                Ok(request)
            }
            PairClaim::Existing(existing) => {
                debug!(
                    existing = %existing.id,
                    status = existing.status.as_str(),
                    "pair already occupied"
                );
                Err(conflict_error(existing.status))
            }
        }
    }

    async fn list_outgoing(
        &self,
        user_id: UserId,
    ) -> Result<Vec<ConnectionRequest>, ConnectionError> {
        self.connection_repo.list_pending_from(user_id).await
    }

    async fn list_incoming(
        &self,
        user_id: UserId,
    ) -> Result<Vec<ConnectionRequest>, ConnectionError> {
        self.connection_repo.list_pending_to(user_id).await
    }

    async fn list_connections(&self, user_id: UserId) -> Result<Vec<UserId>, ConnectionError> {
        // the generation is taken before the store read so a concurrent invalidate voids the fill
        let generation = match self.connection_cache.get(user_id).await {
            Ok(CacheLookup::Hit(connections)) => return Ok(connections),
            Ok(CacheLookup::Miss { generation }) => Some(generation),
            Err(e) => {
                warn!("read connection cache: {e}");
                None
            }
        };

        let accepted = self.connection_repo.list_accepted_for(user_id).await?;
        let mut seen = HashSet::with_capacity(accepted.len());
        let connections: Vec<UserId> = accepted
            .iter()
            .map(|request| request.pair().other(user_id))
            .filter(|other| seen.insert(*other))
            .collect();

        if let Some(generation) = generation {
            if let Err(e) = self
                .connection_cache
                .put(user_id, generation, &connections)
                .await
            {
                warn!("fill connection cache: {e}");
            }
        }

        Ok(connections)
    }

    async fn resolve_request(
        &self,
        caller: UserId,
        request_id: ConnectionRequestId,
        decision: Decision,
    ) -> Result<ConnectionRequest, ConnectionError> {
        let resolved = self
            .connection_repo
            .resolve(request_id, caller, decision, Self::now())
            .await?;

        self.invalidate(&[resolved.requester_id, resolved.target_id])
            .await;
        info!(
            %request_id,
            requester = %resolved.requester_id,
            target = %resolved.target_id,
            status = resolved.status.as_str(),
            "connection request resolved"
        );

        Ok(resolved)
    }

    async fn purge_rejected(&self, before: DateTime<Utc>) -> Result<u64, ConnectionError> {
        let purged = self.connection_repo.purge_rejected(before).await?;
        info!(%before, purged, "purged rejected connection requests");
        Ok(purged)
    }
}
