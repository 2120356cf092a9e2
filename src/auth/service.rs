//! Auth orchestration: local login, registration and external
//! authenticate-or-create, each a single linear pass over the store plus
//! token issuance.

use chrono::{Duration, Utc};
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info, warn};

use super::models::{AuthResponse, LoginRequest, RegisterRequest, User};
use super::store::{NewUser, StoreError, UserStore};
use crate::common::safe_email_log;
use crate::services::{JwtService, PasswordHasher, ProviderIdentity};

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("user already exists")]
    Conflict,

    #[error("token issuance failed: {0}")]
    Token(#[from] jsonwebtoken::errors::Error),

    #[error(transparent)]
    Database(#[from] sqlx::Error),
}

impl From<StoreError> for AuthError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::Conflict => AuthError::Conflict,
            StoreError::Database(e) => AuthError::Database(e),
        }
    }
}

pub struct AuthService {
    store: UserStore,
    hasher: PasswordHasher,
    jwt: Arc<JwtService>,
}

impl AuthService {
    pub fn new(store: UserStore, hasher: PasswordHasher, jwt: Arc<JwtService>) -> Self {
        Self { store, hasher, jwt }
    }

    /// Local login. `Ok(None)` covers both "no such local user" and "wrong
    /// password" so the HTTP layer can answer with a single generic message.
    pub async fn authenticate(
        &self,
        request: &LoginRequest,
    ) -> Result<Option<AuthResponse>, AuthError> {
        let user = match self.store.find_local_by_email(&request.email).await? {
            Some(user) => user,
            None => {
                debug!(email = %safe_email_log(&request.email), "Local user not found");
                return Ok(None);
            }
        };

        let stored = user.password_hash.as_deref().unwrap_or("");
        if !self.hasher.verify(&request.password, stored) {
            warn!(email = %safe_email_log(&request.email), "Password verification failed");
            return Ok(None);
        }

        info!(
            user_id = user.id,
            email = %safe_email_log(&user.email),
            "Local login successful"
        );
        Ok(Some(self.issue_response(&user)?))
    }

    /// Local registration. Any existing identity with the email, including an
    /// externally-linked one, is a conflict. A store-level uniqueness
    /// violation (two concurrent registrations) is reported the same way.
    pub async fn register(&self, request: RegisterRequest) -> Result<AuthResponse, AuthError> {
        if self.store.find_any_by_email(&request.email).await?.is_some() {
            info!(email = %safe_email_log(&request.email), "Registration rejected: email taken");
            return Err(AuthError::Conflict);
        }

        let new_user = NewUser::local(
            request.email,
            self.hasher.hash(&request.password),
            request.first_name,
            request.last_name,
        );

        let user = self.store.create(new_user).await?;
        info!(
            user_id = user.id,
            email = %safe_email_log(&user.email),
            "New local account registered"
        );
        self.issue_response(&user).map_err(Into::into)
    }

    /// Find-or-create on the exact `(email, provider, provider_id)` triple.
    /// Idempotent: repeated logins reuse the stored row and never update its
    /// name fields. A create race loser re-fetches the winner's row.
    pub async fn authenticate_external(
        &self,
        identity: ProviderIdentity,
        provider: &str,
    ) -> Result<AuthResponse, AuthError> {
        let existing = self
            .store
            .find_external(&identity.email, provider, &identity.provider_id)
            .await?;

        let user = match existing {
            Some(user) => {
                debug!(
                    user_id = user.id,
                    provider = provider,
                    "Found existing external identity"
                );
                user
            }
            None => {
                let new_user = NewUser::external(
                    identity.email.clone(),
                    identity.first_name,
                    identity.last_name,
                    provider.to_string(),
                    identity.provider_id.clone(),
                );
                match self.store.create(new_user).await {
                    Ok(user) => {
                        info!(
                            user_id = user.id,
                            email = %safe_email_log(&user.email),
                            provider = provider,
                            "Created new external identity"
                        );
                        user
                    }
                    Err(StoreError::Conflict) => {
                        // Lost a concurrent first-login; the row exists now.
                        warn!(provider = provider, "External create raced, re-fetching");
                        self.store
                            .find_external(&identity.email, provider, &identity.provider_id)
                            .await?
                            .ok_or(AuthError::Conflict)?
                    }
                    Err(StoreError::Database(e)) => return Err(e.into()),
                }
            }
        };

        self.issue_response(&user).map_err(Into::into)
    }

    /// All identities, newest first.
    pub async fn list_users(&self) -> Result<Vec<User>, sqlx::Error> {
        self.store.list_all().await
    }

    fn issue_response(&self, user: &User) -> Result<AuthResponse, jsonwebtoken::errors::Error> {
        let token = self.jwt.issue(user)?;
        let expires_at = (Utc::now() + Duration::minutes(self.jwt.expiry_minutes())).to_rfc3339();

        Ok(AuthResponse {
            token,
            email: user.email.clone(),
            first_name: user.first_name.clone(),
            last_name: user.last_name.clone(),
            expires_at,
        })
    }
}
