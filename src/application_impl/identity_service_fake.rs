use crate::application_port::*;
use crate::domain_model::UserId;

const FAKE_TOKEN_PREFIX: &str = "fake-access-token:";

#[derive(Debug, Default)]
pub struct FakeIdentityService;

impl FakeIdentityService {
    pub fn new() -> Self {
        Self
    }

    /// Token that `verify_token` maps back to `UserId::from_username(username)`.
    pub fn token_for(username: &str) -> String {
        format!("{FAKE_TOKEN_PREFIX}{username}")
    }
}

// Dev-only: any username is accepted, no signature involved.
#[async_trait::async_trait]
impl IdentityService for FakeIdentityService {
    async fn verify_token(&self, token: &str) -> Result<UserId, IdentityError> {
        match token.strip_prefix(FAKE_TOKEN_PREFIX) {
            Some(username) if !username.is_empty() => Ok(UserId::from_username(username)),
            _ => Err(IdentityError::TokenInvalid),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn fake_tokens_map_to_username_ids() {
        let identity = FakeIdentityService::new();
        let user = identity
            .verify_token(&FakeIdentityService::token_for("alice"))
            .await
            .unwrap();
        assert_eq!(user, UserId::from_username("alice"));
    }

    #[tokio::test]
    async fn other_tokens_are_invalid() {
        let identity = FakeIdentityService::new();
        assert!(matches!(
            identity.verify_token("fake-access-token:").await,
            Err(IdentityError::TokenInvalid)
        ));
        assert!(matches!(
            identity.verify_token("eyJhbGciOi").await,
            Err(IdentityError::TokenInvalid)
        ));
    }
}
