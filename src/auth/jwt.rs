use crate::{config::Config, models::Claims};
use jsonwebtoken::{
    Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode, errors::ErrorKind,
    get_current_timestamp,
};
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum TokenError {
    #[error("Invalid or malformed token")]
    Invalid,
    #[error("Token has expired")]
    Expired,
    #[error("failed to sign token: {0}")]
    Signing(#[source] jsonwebtoken::errors::Error),
}

/// Issues and checks HS256 bearer tokens with a fixed lifetime.
pub struct TokenService {
    encoding: EncodingKey,
    decoding: DecodingKey,
    issuer: String,
    ttl: u64,
    validation: Validation,
}

impl TokenService {
    pub fn new(secret: &str, issuer: &str, ttl: u64) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        validation.validate_exp = true;
        validation.validate_nbf = true;
        validation.set_issuer(&[issuer]);
        validation.set_required_spec_claims(&["exp", "nbf", "iat", "iss"]);

        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            issuer: issuer.to_string(),
            ttl,
            validation,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(&config.jwt_secret, &config.jwt_issuer, config.token_ttl)
    }

    pub fn issue(&self, user_id: u64, username: &str, role: &str) -> Result<String, TokenError> {
        self.issue_at(user_id, username, role, get_current_timestamp())
    }

    /// Issues a token as if the current time were `issued_at` (unix seconds).
    pub fn issue_at(&self, user_id: u64, username: &str, role: &str, issued_at: u64) -> Result<String, TokenError> {
        let claims = Claims {
            user_id,
            username: username.to_string(),
            role: role.to_string(),
            iss: self.issuer.clone(),
            iat: issued_at,
            nbf: issued_at,
            exp: issued_at.saturating_add(self.ttl),
            jti: Uuid::new_v4().to_string(),
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding).map_err(TokenError::Signing)
    }

    pub fn validate(&self, token: &str) -> Result<Claims, TokenError> {
        decode::<Claims>(token, &self.decoding, &self.validation)
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                ErrorKind::ExpiredSignature => TokenError::Expired,
                _ => TokenError::Invalid,
            })
    }
}
