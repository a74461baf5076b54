//! Signed access tokens
//!
//! Tokens are stateless HS256 JWTs. Logging out is the client discarding
//! its token; the server keeps no session table.

use chrono::{Duration, Utc};
use database_layer::models::User;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::ApiError;

pub const ISSUER: &str = "vidaplus";

/// JWT token claims structure
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenClaims {
    /// Subject (user ID)
    pub sub: String,
    /// JWT ID (unique token identifier)
    pub jti: String,
    pub email: String,
    pub user_type: String,
    /// Issued at (seconds since epoch)
    pub iat: i64,
    /// Expiration (seconds since epoch)
    pub exp: i64,
    pub iss: String,
}

impl TokenClaims {
    /// User id carried in `sub`.
    ///
    /// # Errors
    ///
    /// Fails when `sub` is not numeric.
    pub fn user_id(&self) -> Result<i64, ApiError> {
        self.sub
            .parse()
            .map_err(|_| ApiError::authentication("Invalid user ID in token"))
    }
}

/// Issues and validates access tokens
#[derive(Clone)]
pub struct TokenService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    ttl: Duration,
}

impl TokenService {
    #[must_use]
    pub fn new(secret: &str, ttl_hours: i64) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            ttl: Duration::hours(ttl_hours),
        }
    }

    /// Token lifetime in seconds
    #[must_use]
    pub fn ttl_seconds(&self) -> i64 {
        self.ttl.num_seconds()
    }

    /// Sign a token for `user`
    ///
    /// # Errors
    ///
    /// Fails when signing fails.
    pub fn issue(&self, user: &User) -> Result<String, ApiError> {
        let now = Utc::now();
        let claims = TokenClaims {
            sub: user.id.to_string(),
            jti: Uuid::new_v4().to_string(),
            email: user.email.clone(),
            user_type: user.user_type.clone(),
            iat: now.timestamp(),
            exp: (now + self.ttl).timestamp(),
            iss: ISSUER.to_string(),
        };
        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| ApiError::internal(format!("Failed to sign token: {e}")))
    }

    /// Validate signature, expiry and issuer
    ///
    /// # Errors
    ///
    /// Returns an authentication error for any invalid token.
    pub fn validate(&self, token: &str) -> Result<TokenClaims, ApiError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_issuer(&[ISSUER]);
        validation.set_required_spec_claims(&["exp", "sub", "iss"]);

        decode::<TokenClaims>(token, &self.decoding_key, &validation)
            .map(|data| data.claims)
            .map_err(|e| ApiError::authentication(format!("Invalid or expired token: {e}")))
    }
}

impl std::fmt::Debug for TokenService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenService")
            .field("ttl", &self.ttl)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user() -> User {
        User {
            id: 42,
            email: "maria@vidaplus.com".to_string(),
            password_hash: String::new(),
            user_type: "patient".to_string(),
            active: true,
            created_at: Utc::now(),
            last_access: None,
        }
    }

    #[test]
    fn issued_token_validates() {
        let service = TokenService::new("secret", 24);
        let token = service.issue(&user()).unwrap();
        let claims = service.validate(&token).unwrap();

        assert_eq!(claims.user_id().unwrap(), 42);
        assert_eq!(claims.email, "maria@vidaplus.com");
        assert_eq!(claims.user_type, "patient");
        assert_eq!(claims.iss, ISSUER);
        assert_eq!(claims.exp - claims.iat, 24 * 3600);
    }

    #[test]
    fn token_signed_with_other_secret_is_rejected() {
        let token = TokenService::new("one", 24).issue(&user()).unwrap();
        let err = TokenService::new("two", 24).validate(&token).unwrap_err();
        assert!(matches!(err, ApiError::Authentication { .. }));
    }

    #[test]
    fn expired_token_is_rejected() {
        let service = TokenService::new("secret", -2);
        let token = service.issue(&user()).unwrap();
        assert!(service.validate(&token).is_err());
    }

    #[test]
    fn garbage_is_rejected() {
        assert!(TokenService::new("secret", 1).validate("not.a.jwt").is_err());
    }
}
