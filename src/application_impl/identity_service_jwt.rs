use crate::application_port::*;
use crate::domain_model::UserId;
use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone)]
pub struct JwtConfig {
    pub issuer: String,
    pub audience: String,
    pub access_ttl: Duration,
    pub signing_key: Vec<u8>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Claims {
    sub: String,
    iss: String,
    aud: String,
    iat: i64,
    exp: i64,
}

/// HS256 bearer tokens whose `sub` is the user id.
pub struct JwtIdentityService {
    config: JwtConfig,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
}

impl JwtIdentityService {
    pub fn new(config: JwtConfig) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_issuer(&[config.issuer.as_str()]);
        validation.set_audience(&[config.audience.as_str()]);

        Self {
            encoding_key: EncodingKey::from_secret(&config.signing_key),
            decoding_key: DecodingKey::from_secret(&config.signing_key),
            validation,
            config,
        }
    }

    pub fn issue(&self, user: UserId) -> Result<(String, DateTime<Utc>), IdentityError> {
        let now = Utc::now();
        let expires_at = now + self.config.access_ttl;
        let claims = Claims {
            sub: user.to_string(),
            iss: self.config.issuer.clone(),
            aud: self.config.audience.clone(),
            iat: now.timestamp(),
            exp: expires_at.timestamp(),
        };

        let token = jsonwebtoken::encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| IdentityError::Internal(format!("encode token: {e}")))?;

        Ok((token, expires_at))
    }
}

#[async_trait::async_trait]
impl IdentityService for JwtIdentityService {
    async fn verify_token(&self, token: &str) -> Result<UserId, IdentityError> {
        let data = jsonwebtoken::decode::<Claims>(token, &self.decoding_key, &self.validation)
            .map_err(|e| match e.kind() {
                ErrorKind::ExpiredSignature => IdentityError::TokenExpired,
                _ => IdentityError::TokenInvalid,
            })?;

        data.claims
            .sub
            .parse::<UserId>()
            .map_err(|_| IdentityError::TokenInvalid)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(audience: &str) -> JwtConfig {
        JwtConfig {
            issuer: "careernet.identity".to_string(),
            audience: audience.to_string(),
            access_ttl: Duration::hours(1),
            signing_key: b"test-signing-key".to_vec(),
        }
    }

    #[tokio::test]
    async fn issued_token_verifies() {
        let identity = JwtIdentityService::new(config("careernet-web"));
        let alice = UserId::from_username("alice");

        let (token, expires_at) = identity.issue(alice).unwrap();
        assert!(expires_at > Utc::now());
        assert_eq!(identity.verify_token(&token).await.unwrap(), alice);
    }

    #[tokio::test]
    async fn wrong_audience_is_rejected() {
        let issuer = JwtIdentityService::new(config("someone-else"));
        let verifier = JwtIdentityService::new(config("careernet-web"));

        let (token, _) = issuer.issue(UserId::from_username("alice")).unwrap();
        assert!(matches!(
            verifier.verify_token(&token).await,
            Err(IdentityError::TokenInvalid)
        ));
    }

    #[tokio::test]
    async fn expired_token_is_reported() {
        let identity = JwtIdentityService::new(config("careernet-web"));
        let past = Utc::now() - Duration::hours(2);
        let claims = Claims {
            sub: UserId::from_username("alice").to_string(),
            iss: "careernet.identity".to_string(),
            aud: "careernet-web".to_string(),
            iat: past.timestamp(),
            exp: past.timestamp(),
        };
        let token =
            jsonwebtoken::encode(&Header::new(Algorithm::HS256), &claims, &identity.encoding_key)
                .unwrap();

        assert!(matches!(
            identity.verify_token(&token).await,
            Err(IdentityError::TokenExpired)
        ));
    }
}
