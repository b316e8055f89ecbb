//! JWT service for access token generation and validation
//!
//! VolunTrack runs as a single service, so tokens are signed and verified
//! with a shared HS256 secret rather than an asymmetric keypair.

use anyhow::Result;
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use std::time::{SystemTime, UNIX_EPOCH};
use uuid::Uuid;

use crate::models::user::User;

/// JWT configuration
#[derive(Debug, Clone)]
pub struct JwtConfig {
    /// Shared secret for signing and verifying tokens
    pub secret: String,
    /// Access token expiration time in seconds (default: 24 hours)
    pub access_token_expiry: u64,
}

impl JwtConfig {
    /// Create a new JwtConfig from environment variables
    ///
    /// # Environment Variables
    /// - `JWT_SECRET`: Shared signing secret
    /// - `JWT_ACCESS_TOKEN_EXPIRY`: Access token expiry in seconds (default: 86400)
    pub fn from_env() -> Result<Self> {
        let secret = std::env::var("JWT_SECRET")
            .map_err(|_| anyhow::anyhow!("JWT_SECRET environment variable not set"))?;

        let access_token_expiry = std::env::var("JWT_ACCESS_TOKEN_EXPIRY")
            .unwrap_or_else(|_| "86400".to_string()) // 24 hours
            .parse()
            .unwrap_or(86400);

        Ok(JwtConfig {
            secret,
            access_token_expiry,
        })
    }
}

/// JWT claims structure
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    /// User ID
    pub sub: Uuid,
    /// Username, for log context only; authorization state is re-read
    /// from the database on every request
    pub username: String,
    /// Issued at time
    pub iat: u64,
    /// Expiration time
    pub exp: u64,
}

/// JWT service for token generation and validation
#[derive(Clone)]
pub struct JwtService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    access_token_expiry: u64,
}

impl JwtService {
    /// Create a new JWT service from configuration
    pub fn new(config: JwtConfig) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(config.secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(config.secret.as_bytes()),
            access_token_expiry: config.access_token_expiry,
        }
    }

    /// Access token expiry in seconds
    pub fn access_token_expiry(&self) -> u64 {
        self.access_token_expiry
    }

    /// Generate an access token for a user
    pub fn generate_access_token(&self, user: &User) -> Result<String> {
        let now = SystemTime::now().duration_since(UNIX_EPOCH)?.as_secs();

        let claims = Claims {
            sub: user.id,
            username: user.username.clone(),
            iat: now,
            exp: now + self.access_token_expiry,
        };

        let token = encode(&Header::default(), &claims, &self.encoding_key)?;
        Ok(token)
    }

    /// Validate a token and return its claims
    pub fn validate_token(&self, token: &str) -> Result<Claims> {
        let mut validation = Validation::default();
        validation.validate_exp = true;

        let token_data = decode::<Claims>(token, &self.decoding_key, &validation)?;
        Ok(token_data.claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn test_service() -> JwtService {
        JwtService::new(JwtConfig {
            secret: "test-secret".to_string(),
            access_token_expiry: 3600,
        })
    }

    fn test_user() -> User {
        User {
            id: Uuid::new_v4(),
            username: "maria".to_string(),
            email: "maria@example.org".to_string(),
            password_hash: String::new(),
            first_name: String::new(),
            last_name: String::new(),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_generate_and_validate_token() {
        let service = test_service();
        let user = test_user();

        let token = service
            .generate_access_token(&user)
            .expect("token generation failed");
        let claims = service
            .validate_token(&token)
            .expect("token validation failed");

        assert_eq!(claims.sub, user.id);
        assert_eq!(claims.username, "maria");
        assert_eq!(claims.exp, claims.iat + 3600);
    }

    #[test]
    fn test_validate_rejects_wrong_secret() {
        let service = test_service();
        let other = JwtService::new(JwtConfig {
            secret: "other-secret".to_string(),
            access_token_expiry: 3600,
        });

        let token = other
            .generate_access_token(&test_user())
            .expect("token generation failed");
        assert!(service.validate_token(&token).is_err());
    }

    #[test]
    fn test_validate_rejects_garbage() {
        let service = test_service();
        assert!(service.validate_token("not-a-token").is_err());
    }
}
