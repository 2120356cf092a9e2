//! User persistence. Thin query layer over the `users` table; uniqueness of
//! `(email, provider, provider_id)` and of `username` is enforced by the
//! schema, and violations surface as `StoreError::Conflict`.

use sqlx::error::ErrorKind;
use sqlx::SqlitePool;
use thiserror::Error;
use tracing::debug;

use super::models::User;
use crate::common::safe_email_log;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("user already exists")]
    Conflict,

    #[error(transparent)]
    Database(#[from] sqlx::Error),
}

/// Fields for a new identity row. Timestamps and id are assigned by the
/// store.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub email: String,
    pub username: Option<String>,
    pub password_hash: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub provider: Option<String>,
    pub provider_id: Option<String>,
}

impl NewUser {
    pub fn local(
        email: String,
        password_hash: String,
        first_name: Option<String>,
        last_name: Option<String>,
    ) -> Self {
        Self {
            email,
            username: None,
            password_hash: Some(password_hash),
            first_name,
            last_name,
            provider: None,
            provider_id: None,
        }
    }

    pub fn external(
        email: String,
        first_name: String,
        last_name: String,
        provider: String,
        provider_id: String,
    ) -> Self {
        Self {
            email,
            username: None,
            password_hash: None,
            first_name: Some(first_name),
            last_name: Some(last_name),
            provider: Some(provider),
            provider_id: Some(provider_id),
        }
    }
}

#[derive(Debug, Clone)]
pub struct UserStore {
    db: SqlitePool,
}

impl UserStore {
    pub fn new(db: SqlitePool) -> Self {
        Self { db }
    }

    /// Local-credential lookup. External identities never match, even with
    /// the same email.
    pub async fn find_local_by_email(&self, email: &str) -> Result<Option<User>, sqlx::Error> {
        sqlx::query_as::<_, User>("SELECT * FROM users WHERE email = ? AND provider IS NULL")
            .bind(email)
            .fetch_optional(&self.db)
            .await
    }

    /// External-identity lookup on the full `(email, provider, provider_id)`
    /// triple.
    pub async fn find_external(
        &self,
        email: &str,
        provider: &str,
        provider_id: &str,
    ) -> Result<Option<User>, sqlx::Error> {
        sqlx::query_as::<_, User>(
            "SELECT * FROM users WHERE email = ? AND provider = ? AND provider_id = ?",
        )
        .bind(email)
        .bind(provider)
        .bind(provider_id)
        .fetch_optional(&self.db)
        .await
    }

    /// Registration pre-check: any identity with this email, local or
    /// external, blocks a new local registration.
    pub async fn find_any_by_email(&self, email: &str) -> Result<Option<User>, sqlx::Error> {
        sqlx::query_as::<_, User>("SELECT * FROM users WHERE email = ? LIMIT 1")
            .bind(email)
            .fetch_optional(&self.db)
            .await
    }

    /// Insert a new identity and return the stored row. Unique-constraint
    /// violations map to `StoreError::Conflict`.
    pub async fn create(&self, new_user: NewUser) -> Result<User, StoreError> {
        let result = sqlx::query(
            r#"
            INSERT INTO users (email, username, password_hash, first_name, last_name, provider, provider_id)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&new_user.email)
        .bind(new_user.username.as_deref())
        .bind(new_user.password_hash.as_deref())
        .bind(new_user.first_name.as_deref())
        .bind(new_user.last_name.as_deref())
        .bind(new_user.provider.as_deref())
        .bind(new_user.provider_id.as_deref())
        .execute(&self.db)
        .await;

        let done = match result {
            Ok(done) => done,
            Err(e) if is_unique_violation(&e) => {
                debug!(
                    email = %safe_email_log(&new_user.email),
                    provider = ?new_user.provider,
                    "Insert hit uniqueness constraint"
                );
                return Err(StoreError::Conflict);
            }
            Err(e) => return Err(e.into()),
        };

        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = ?")
            .bind(done.last_insert_rowid())
            .fetch_one(&self.db)
            .await?;
        Ok(user)
    }

    /// Full table listing, newest first.
    pub async fn list_all(&self) -> Result<Vec<User>, sqlx::Error> {
        sqlx::query_as::<_, User>("SELECT * FROM users ORDER BY id DESC")
            .fetch_all(&self.db)
            .await
    }
}

fn is_unique_violation(e: &sqlx::Error) -> bool {
    matches!(e, sqlx::Error::Database(db) if db.kind() == ErrorKind::UniqueViolation)
}
