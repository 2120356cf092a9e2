//! Authentication data models

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// User database model. One row per identity: local identities have a
/// password hash and no provider, external identities have a provider and
/// provider id and no password. The same email may appear once locally and
/// once per external provider.
#[derive(FromRow, Serialize, Deserialize, Debug, Clone)]
pub struct User {
    pub id: i64,
    pub email: String,
    pub username: Option<String>,
    // Never serialized: digests stay out of API responses and logs.
    #[serde(skip_serializing)]
    pub password_hash: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub provider: Option<String>,
    pub provider_id: Option<String>,
    pub created_at: Option<String>,
    pub updated_at: Option<String>,
}

#[derive(Deserialize, Debug)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
}

/// Successful login/register/external-auth payload. `expires_at` is computed
/// from the configured JWT expiry so it always matches the token's `exp`.
#[derive(Serialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct AuthResponse {
    pub token: String,
    pub email: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub expires_at: String,
}

/// Query parameters accepted by the OAuth callback endpoints. `code` comes
/// from the provider redirect; the remaining fields form the dev-only direct
/// bypass and are ignored unless that bypass is enabled.
#[derive(Deserialize, Debug, Default)]
#[serde(rename_all = "camelCase")]
pub struct CallbackParams {
    pub code: Option<String>,
    pub email: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub provider_id: Option<String>,
}

/// Form body of the POST callback variants; providers that POST the redirect
/// put the code in the body rather than the query string.
#[derive(Deserialize, Debug, Default)]
pub struct CallbackForm {
    pub code: Option<String>,
}
