//! Tenant-scoped JWT access tokens.
//!
//! Tokens are issued by the school platform's session service and carry the
//! tenant (school) and role of the caller. This service only verifies them.

use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// Error type for JWT operations.
#[derive(Debug, Error)]
pub enum JwtError {
    #[error("Failed to decode token: {0}")]
    DecodingError(String),

    #[error("Token has expired")]
    TokenExpired,

    #[error("Invalid token")]
    InvalidToken,

    #[error("Invalid key: {0}")]
    InvalidKey(String),
}

/// Caller role inside a tenant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Student,
    Teacher,
    Admin,
}

impl Role {
    /// Staff roles may read any actor's data within their tenant.
    pub fn is_staff(&self) -> bool {
        matches!(self, Role::Teacher | Role::Admin)
    }
}

/// JWT token claims.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (actor ID)
    pub sub: String,
    /// Tenant (school) the actor belongs to
    pub tenant_id: String,
    pub role: Role,
    /// Expiration time (Unix timestamp)
    pub exp: i64,
    /// Issued at (Unix timestamp)
    pub iat: i64,
    /// JWT ID
    pub jti: String,
}

impl Claims {
    /// Parses the subject claim as an actor id.
    pub fn actor_id(&self) -> Result<Uuid, JwtError> {
        Uuid::parse_str(&self.sub).map_err(|_| JwtError::InvalidToken)
    }

    /// Parses the tenant claim.
    pub fn tenant_id(&self) -> Result<Uuid, JwtError> {
        Uuid::parse_str(&self.tenant_id).map_err(|_| JwtError::InvalidToken)
    }
}

/// Default leeway in seconds for clock skew tolerance
pub const DEFAULT_LEEWAY_SECS: u64 = 30;

/// Verification key and settings for incoming tokens.
#[derive(Clone)]
pub struct JwtConfig {
    decoding_key: DecodingKey,
    algorithm: Algorithm,
    pub leeway_secs: u64,
}

impl std::fmt::Debug for JwtConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtConfig")
            .field("algorithm", &self.algorithm)
            .field("leeway_secs", &self.leeway_secs)
            .finish()
    }
}

impl JwtConfig {
    /// Creates an RS256 verifier from the session service's public key.
    pub fn from_rsa_pem(public_key_pem: &str, leeway_secs: u64) -> Result<Self, JwtError> {
        let decoding_key = DecodingKey::from_rsa_pem(public_key_pem.as_bytes())
            .map_err(|e| JwtError::InvalidKey(format!("Invalid public key: {}", e)))?;

        Ok(Self {
            decoding_key,
            algorithm: Algorithm::RS256,
            leeway_secs,
        })
    }

    /// Validates a token and returns its claims.
    pub fn validate_token(&self, token: &str) -> Result<Claims, JwtError> {
        let mut validation = Validation::new(self.algorithm);
        validation.validate_exp = true;
        validation.leeway = self.leeway_secs;

        let token_data = decode::<Claims>(token, &self.decoding_key, &validation).map_err(|e| {
            match e.kind() {
                jsonwebtoken::errors::ErrorKind::ExpiredSignature => JwtError::TokenExpired,
                jsonwebtoken::errors::ErrorKind::InvalidToken
                | jsonwebtoken::errors::ErrorKind::InvalidSignature => JwtError::InvalidToken,
                _ => JwtError::DecodingError(e.to_string()),
            }
        })?;

        Ok(token_data.claims)
    }
}

/// HS256 verifier and token minting for tests.
#[cfg(any(test, feature = "test-util"))]
pub mod testing {
    use chrono::{Duration, Utc};
    use jsonwebtoken::{encode, Algorithm, DecodingKey, EncodingKey, Header};
    use uuid::Uuid;

    use super::{Claims, JwtConfig, Role};

    impl JwtConfig {
        /// HS256 verifier over a shared secret, without leeway.
        pub fn from_secret(secret: &str) -> Self {
            Self {
                decoding_key: DecodingKey::from_secret(secret.as_bytes()),
                algorithm: Algorithm::HS256,
                leeway_secs: 0,
            }
        }
    }

    /// Signs an HS256 token that expires `expiry_secs` from now.
    pub fn sign_token(
        secret: &str,
        actor_id: Uuid,
        tenant_id: Uuid,
        role: Role,
        expiry_secs: i64,
    ) -> Result<String, jsonwebtoken::errors::Error> {
        let now = Utc::now();
        let claims = Claims {
            sub: actor_id.to_string(),
            tenant_id: tenant_id.to_string(),
            role,
            exp: (now + Duration::seconds(expiry_secs)).timestamp(),
            iat: now.timestamp(),
            jti: Uuid::new_v4().to_string(),
        };

        encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::testing::sign_token;
    use super::*;

    const SECRET: &str = "test_secret_key_for_jwt_testing_12345";

    #[test]
    fn test_validate_token() {
        let config = JwtConfig::from_secret(SECRET);
        let actor_id = Uuid::new_v4();
        let tenant_id = Uuid::new_v4();

        let token = sign_token(SECRET, actor_id, tenant_id, Role::Student, 900).unwrap();
        assert!(token.contains('.'), "JWT should have dots separating parts");

        let claims = config.validate_token(&token).unwrap();
        assert_eq!(claims.actor_id().unwrap(), actor_id);
        assert_eq!(claims.tenant_id().unwrap(), tenant_id);
        assert_eq!(claims.role, Role::Student);
    }

    #[test]
    fn test_token_from_other_secret_rejected() {
        let config = JwtConfig::from_secret(SECRET);
        let token = sign_token(
            "another_secret_entirely_000000000",
            Uuid::new_v4(),
            Uuid::new_v4(),
            Role::Admin,
            900,
        )
        .unwrap();

        assert!(matches!(
            config.validate_token(&token),
            Err(JwtError::InvalidToken)
        ));
    }

    #[test]
    fn test_expired_token_rejected() {
        let config = JwtConfig::from_secret(SECRET);
        let token = sign_token(SECRET, Uuid::new_v4(), Uuid::new_v4(), Role::Teacher, -120).unwrap();

        assert!(matches!(
            config.validate_token(&token),
            Err(JwtError::TokenExpired)
        ));
    }

    #[test]
    fn test_malformed_token_rejected() {
        let config = JwtConfig::from_secret(SECRET);
        assert!(config.validate_token("not-a-jwt").is_err());
    }

    #[test]
    fn test_invalid_tenant_claim() {
        let claims = Claims {
            sub: Uuid::new_v4().to_string(),
            tenant_id: "school-42".to_string(),
            role: Role::Admin,
            exp: 0,
            iat: 0,
            jti: String::new(),
        };
        assert!(claims.tenant_id().is_err());
        assert!(claims.actor_id().is_ok());
    }

    #[test]
    fn test_role_is_staff() {
        assert!(!Role::Student.is_staff());
        assert!(Role::Teacher.is_staff());
        assert!(Role::Admin.is_staff());
    }

    #[test]
    fn test_role_serialization() {
        assert_eq!(serde_json::to_string(&Role::Admin).unwrap(), "\"admin\"");
    }

    #[test]
    fn test_invalid_rsa_key() {
        let result = JwtConfig::from_rsa_pem("not a pem", DEFAULT_LEEWAY_SECS);
        assert!(matches!(result, Err(JwtError::InvalidKey(_))));
    }

    #[test]
    fn test_debug_redacts_keys() {
        let debug = format!("{:?}", JwtConfig::from_secret(SECRET));
        assert!(debug.contains("JwtConfig"));
        assert!(!debug.contains(SECRET));
    }
}
