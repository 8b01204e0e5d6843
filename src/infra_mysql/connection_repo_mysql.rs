use super::util::{is_dup_key, store_err};
use crate::application_port::*;
use crate::domain_model::*;
use crate::domain_port::*;
use crate::logger::*;
use chrono::{DateTime, Utc};
use sqlx::mysql::MySqlRow;
use sqlx::{MySqlPool, Row};

const COLUMNS: &str =
    "request_id, requester_id, target_id, status, created_at, resolved_at FROM connection_request";

// the open row we collided with can be resolved before we read it back
const CLAIM_ATTEMPTS: usize = 3;

pub struct MySqlConnectionRepo {
    pool: MySqlPool,
}

impl MySqlConnectionRepo {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }

    async fn fetch_all(
        &self,
        sql: &str,
        binds: &[UserId],
    ) -> Result<Vec<ConnectionRequest>, ConnectionError> {
        let mut query = sqlx::query(sql);
        for user_id in binds {
            query = query.bind(*user_id);
        }

        let rows = query
            .fetch_all(&self.pool)
            .await
            .map_err(store_err("select connection requests"))?;

        rows.iter().map(decode_request).collect()
    }
}

fn decode_request(row: &MySqlRow) -> Result<ConnectionRequest, ConnectionError> {
    let decode = |e: sqlx::Error| ConnectionError::Store(format!("decode connection_request: {e}"));

    let status = row
        .try_get::<String, _>("status")
        .map_err(decode)?
        .parse::<ConnectionStatus>()
        .map_err(ConnectionError::Store)?;

    Ok(ConnectionRequest {
        id: row.try_get("request_id").map_err(decode)?,
        requester_id: row.try_get("requester_id").map_err(decode)?,
        target_id: row.try_get("target_id").map_err(decode)?,
        status,
        created_at: row.try_get("created_at").map_err(decode)?,
        resolved_at: row.try_get("resolved_at").map_err(decode)?,
    })
}

#[async_trait::async_trait]
impl ConnectionRepo for MySqlConnectionRepo {
    async fn claim_pair(&self, request: &ConnectionRequest) -> Result<PairClaim, ConnectionError> {
        let pair = request.pair();

        for _ in 0..CLAIM_ATTEMPTS {
            let res = sqlx::query(
                r#"
INSERT INTO connection_request
    (request_id, requester_id, target_id, user_min, user_max, status, created_at)
VALUES (?, ?, ?, ?, ?, 'pending', ?)
"#,
            )
            .bind(request.id)
            .bind(request.requester_id)
            .bind(request.target_id)
            .bind(pair.min())
            .bind(pair.max())
            .bind(request.created_at)
            .execute(&self.pool)
            .await;

            match res {
                Ok(_) => return Ok(PairClaim::Won),
                Err(e) if is_dup_key(&e) => {
                    let row = sqlx::query(&format!(
                        "SELECT {COLUMNS} WHERE user_min = ? AND user_max = ? AND open_slot = 1"
                    ))
                    .bind(pair.min())
                    .bind(pair.max())
                    .fetch_optional(&self.pool)
                    .await
                    .map_err(store_err("select open pair"))?;

                    match row {
                        Some(row) => return Ok(PairClaim::Existing(decode_request(&row)?)),
                        None => debug!(request_id = %request.id, "open pair vanished, retrying claim"),
                    }
                }
                Err(e) => return Err(ConnectionError::Store(format!("insert connection_request: {e}"))),
            }
        }

        Err(ConnectionError::Store(
            "pair claim kept conflicting".to_string(),
        ))
    }

    async fn list_pending_from(
        &self,
        requester: UserId,
    ) -> Result<Vec<ConnectionRequest>, ConnectionError> {
        self.fetch_all(
            &format!(
                "SELECT {COLUMNS} WHERE requester_id = ? AND status = 'pending' \
                 ORDER BY created_at DESC, request_id DESC"
            ),
            &[requester],
        )
        .await
    }

    async fn list_pending_to(
        &self,
        target: UserId,
    ) -> Result<Vec<ConnectionRequest>, ConnectionError> {
        self.fetch_all(
            &format!(
                "SELECT {COLUMNS} WHERE target_id = ? AND status = 'pending' \
                 ORDER BY created_at DESC, request_id DESC"
            ),
            &[target],
        )
        .await
    }

    async fn list_accepted_for(
        &self,
        user_id: UserId,
    ) -> Result<Vec<ConnectionRequest>, ConnectionError> {
        self.fetch_all(
            &format!(
                "SELECT {COLUMNS} WHERE status = 'accepted' AND (requester_id = ? OR target_id = ?) \
                 ORDER BY resolved_at DESC, request_id DESC"
            ),
            &[user_id, user_id],
        )
        .await
    }

    async fn resolve(
        &self,
        request_id: ConnectionRequestId,
        caller: UserId,
        decision: Decision,
        resolved_at: DateTime<Utc>,
    ) -> Result<ConnectionRequest, ConnectionError> {
        let mut tx = self.pool.begin().await.map_err(store_err("begin resolve"))?;

        // row lock: a concurrent resolve waits here and then sees the terminal state
        let row = sqlx::query(&format!("SELECT {COLUMNS} WHERE request_id = ? FOR UPDATE"))
            .bind(request_id)
            .fetch_optional(&mut *tx)
            .await
            .map_err(store_err("lock connection_request"))?;

        let current = match row {
            Some(row) => decode_request(&row)?,
            None => return Err(ConnectionError::NotFound),
        };
        let resolved = current.resolve(caller, decision, resolved_at)?;

        sqlx::query("UPDATE connection_request SET status = ?, resolved_at = ? WHERE request_id = ?")
            .bind(resolved.status.as_str())
            .bind(resolved_at)
            .bind(request_id)
            .execute(&mut *tx)
            .await
            .map_err(store_err("update connection_request"))?;

        tx.commit().await.map_err(store_err("commit resolve"))?;

        Ok(resolved)
    }

    async fn purge_rejected(&self, before: DateTime<Utc>) -> Result<u64, ConnectionError> {
        let result = sqlx::query(
            "DELETE FROM connection_request WHERE status = 'rejected' AND resolved_at < ?",
        )
        .bind(before)
        .execute(&self.pool)
        .await
        .map_err(store_err("purge connection_request"))?;

        Ok(result.rows_affected())
    }
}
