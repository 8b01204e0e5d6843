use crate::domain_model::UserId;

#[derive(Debug, thiserror::Error)]
pub enum IdentityError {
    #[error("token invalid")]
    TokenInvalid,
    #[error("token expired")]
    TokenExpired,
    #[error("internal error: {0}")]
    Internal(String),
}

/// Resolves a bearer token to the authenticated caller.
#[async_trait::async_trait]
pub trait IdentityService: Send + Sync {
    async fn verify_token(&self, token: &str) -> Result<UserId, IdentityError>;
}
