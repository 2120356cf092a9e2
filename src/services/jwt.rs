// src/services/jwt.rs
//! JWT issuance for authenticated identities.
//!
//! Tokens are compact HS256 JWTs. The service is stateless: there is no
//! refresh flow and nothing is persisted; a caller that needs a new token
//! re-authenticates.

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::env;
use tracing::warn;

use crate::auth::models::User;

/// Claims carried by an issued token. `provider` is present only for
/// externally-linked identities.
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub email: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub provider: Option<String>,
    pub iss: String,
    pub aud: String,
    pub iat: usize,
    pub exp: usize,
}

#[derive(Debug, Clone)]
pub struct JwtConfig {
    pub secret: String,
    pub issuer: String,
    pub audience: String,
    pub expiry_minutes: i64,
}

impl JwtConfig {
    pub fn from_env() -> Self {
        let secret = env::var("JWT_SECRET")
            .unwrap_or_else(|_| "default_secret_key_32_chars_min!".to_string());
        if secret.len() < 32 {
            warn!("JWT_SECRET is shorter than 32 bytes");
        }

        Self {
            secret,
            issuer: env::var("JWT_ISSUER").unwrap_or_else(|_| "AuthSystem".to_string()),
            audience: env::var("JWT_AUDIENCE").unwrap_or_else(|_| "AuthSystemUsers".to_string()),
            expiry_minutes: env::var("JWT_EXPIRY_MINUTES")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(60),
        }
    }
}

#[derive(Debug, Clone)]
pub struct JwtService {
    config: JwtConfig,
}

impl JwtService {
    pub fn new(config: JwtConfig) -> Self {
        Self { config }
    }

    pub fn expiry_minutes(&self) -> i64 {
        self.config.expiry_minutes
    }

    /// Sign a token for an authenticated user.
    pub fn issue(&self, user: &User) -> Result<String, jsonwebtoken::errors::Error> {
        let now = Utc::now();
        let name = format!(
            "{} {}",
            user.first_name.as_deref().unwrap_or(""),
            user.last_name.as_deref().unwrap_or("")
        )
        .trim()
        .to_string();

        let claims = Claims {
            sub: user.id.to_string(),
            email: user.email.clone(),
            name,
            provider: user.provider.clone(),
            iss: self.config.issuer.clone(),
            aud: self.config.audience.clone(),
            iat: now.timestamp() as usize,
            exp: (now + Duration::minutes(self.config.expiry_minutes)).timestamp() as usize,
        };

        encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(self.config.secret.as_bytes()),
        )
    }

    /// Validate a token's signature, expiry, issuer and audience. Nothing in
    /// this service requires it; it exists for downstream consumers and tests.
    pub fn decode(&self, token: &str) -> Result<Claims, jsonwebtoken::errors::Error> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_issuer(&[&self.config.issuer]);
        validation.set_audience(&[&self.config.audience]);

        let data = decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.config.secret.as_bytes()),
            &validation,
        )?;
        Ok(data.claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config() -> JwtConfig {
        JwtConfig {
            secret: "unit_test_secret_key_of_32_bytes!".to_string(),
            issuer: "AuthSystem".to_string(),
            audience: "AuthSystemUsers".to_string(),
            expiry_minutes: 60,
        }
    }

    fn local_user() -> User {
        User {
            id: 7,
            email: "local@example.com".to_string(),
            username: None,
            password_hash: Some("digest".to_string()),
            first_name: Some("Ada".to_string()),
            last_name: Some("Lovelace".to_string()),
            provider: None,
            provider_id: None,
            created_at: None,
            updated_at: None,
        }
    }

    #[test]
    fn test_issue_and_decode_round_trip() {
        let service = JwtService::new(test_config());
        let token = service.issue(&local_user()).unwrap();

        let claims = service.decode(&token).unwrap();
        assert_eq!(claims.sub, "7");
        assert_eq!(claims.email, "local@example.com");
        assert_eq!(claims.name, "Ada Lovelace");
        assert!(claims.provider.is_none());
        assert!(claims.exp > claims.iat);
    }

    #[test]
    fn test_provider_claim_present_for_external_identity() {
        let mut user = local_user();
        user.password_hash = None;
        user.provider = Some("Google".to_string());
        user.provider_id = Some("g-123".to_string());

        let service = JwtService::new(test_config());
        let token = service.issue(&user).unwrap();
        let claims = service.decode(&token).unwrap();
        assert_eq!(claims.provider.as_deref(), Some("Google"));
    }

    #[test]
    fn test_name_claim_trims_missing_parts() {
        let mut user = local_user();
        user.first_name = Some("Ada".to_string());
        user.last_name = None;

        let service = JwtService::new(test_config());
        let claims = service.decode(&service.issue(&user).unwrap()).unwrap();
        assert_eq!(claims.name, "Ada");
    }

    #[test]
    fn test_decode_rejects_wrong_secret() {
        let service = JwtService::new(test_config());
        let token = service.issue(&local_user()).unwrap();

        let mut other = test_config();
        other.secret = "a_completely_different_secret_key".to_string();
        assert!(JwtService::new(other).decode(&token).is_err());
    }

    #[test]
    fn test_decode_rejects_wrong_audience() {
        let service = JwtService::new(test_config());
        let token = service.issue(&local_user()).unwrap();

        let mut other = test_config();
        other.audience = "SomeoneElse".to_string();
        assert!(JwtService::new(other).decode(&token).is_err());
    }
}
