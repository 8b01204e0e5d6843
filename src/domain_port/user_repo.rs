use crate::application_port::*;
use crate::domain_model::*;

#[async_trait::async_trait]
pub trait UserRepo: Send + Sync {
    /// Insert the user if missing. Used to seed development directories.
    async fn upsert(&self, user_id: UserId, username: &str) -> Result<(), ConnectionError>;

    /// True for registered, active users only.
    async fn id_exists(&self, user_id: UserId) -> Result<bool, ConnectionError>;
}
