use crate::application_port::*;
use crate::domain_model::*;
use crate::domain_port::*;
use dashmap::DashMap;

#[derive(Default)]
pub struct MemoryUserRepo {
    users: DashMap<UserId, String>,
}

impl MemoryUserRepo {
    pub fn new() -> Self {
        Self::default()
    }

    /// Directory holding `UserId::from_username(name)` for every name.
    pub fn with_usernames<I, S>(usernames: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let repo = Self::new();
        for name in usernames {
            let name = name.as_ref();
            repo.users.insert(UserId::from_username(name), name.to_string());
        }
        repo
    }
}

#[async_trait::async_trait]
impl UserRepo for MemoryUserRepo {
    async fn upsert(&self, user_id: UserId, username: &str) -> Result<(), ConnectionError> {
        self.users
            .entry(user_id)
            .or_insert_with(|| username.to_string());
        Ok(())
    }

    async fn id_exists(&self, user_id: UserId) -> Result<bool, ConnectionError> {
        Ok(self.users.contains_key(&user_id))
    }
}
