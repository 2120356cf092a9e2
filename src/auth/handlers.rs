//! Authentication handlers

use axum::extract::{Extension, Form, Json, Query};
use axum::response::Redirect;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{info, warn};

use super::models::{AuthResponse, CallbackForm, CallbackParams, LoginRequest, RegisterRequest, User};
use crate::common::validation::{validate_login, validate_register};
use crate::common::{safe_email_log, ApiError, AppState};
use crate::services::ProviderIdentity;

#[derive(Debug, Clone, Copy)]
enum OAuthProvider {
    Google,
    Facebook,
}

impl OAuthProvider {
    /// Provider name as stored in the `users.provider` column and in the
    /// `provider` JWT claim.
    fn name(self) -> &'static str {
        match self {
            OAuthProvider::Google => "Google",
            OAuthProvider::Facebook => "Facebook",
        }
    }
}

/// POST /api/auth/login
///
/// # Request Body
/// ```json
/// { "email": "user@example.com", "password": "secret" }
/// ```
///
/// # Response
/// 200 with `{token, email, firstName, lastName, expiresAt}` or
/// 401 `{message: "Invalid email or password"}`.
pub async fn login(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
    Json(request): Json<LoginRequest>,
) -> Result<Json<AuthResponse>, ApiError> {
    validate_login(&request)?;
    let state = state_lock.read().await.clone();

    info!(email = %safe_email_log(&request.email), "🔐 Login attempt");

    match state.auth_service.authenticate(&request).await? {
        Some(response) => Ok(Json(response)),
        None => Err(ApiError::Unauthorized(
            "Invalid email or password".to_string(),
        )),
    }
}

/// POST /api/auth/register
///
/// 200 with an auth response, 400 `{message: "User already exists"}` when the
/// email is taken by any identity (local or external).
pub async fn register(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
    Json(request): Json<RegisterRequest>,
) -> Result<Json<AuthResponse>, ApiError> {
    validate_register(&request)?;
    let state = state_lock.read().await.clone();

    info!(email = %safe_email_log(&request.email), "📝 Registration attempt");

    let response = state.auth_service.register(request).await?;
    Ok(Json(response))
}

/// GET /api/auth/google - redirect the browser to the Google consent screen
pub async fn google_login(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
) -> Redirect {
    let state = state_lock.read().await.clone();
    let url = state.google_service.authorization_url();
    info!("Redirecting to Google OAuth consent screen");
    Redirect::to(&url)
}

/// GET /api/auth/facebook - redirect the browser to the Facebook dialog
pub async fn facebook_login(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
) -> Redirect {
    let state = state_lock.read().await.clone();
    let url = state.facebook_service.authorization_url();
    info!("Redirecting to Facebook OAuth dialog");
    Redirect::to(&url)
}

/// GET /api/auth/google/callback
pub async fn google_callback_get(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
    Query(params): Query<CallbackParams>,
) -> Result<Redirect, ApiError> {
    let state = state_lock.read().await.clone();
    let code = params.code.clone();
    run_callback(&state, OAuthProvider::Google, code, params).await
}

/// POST /api/auth/google/callback - code arrives in the form body
pub async fn google_callback_post(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
    Query(params): Query<CallbackParams>,
    Form(form): Form<CallbackForm>,
) -> Result<Redirect, ApiError> {
    let state = state_lock.read().await.clone();
    run_callback(&state, OAuthProvider::Google, form.code, params).await
}

/// GET /api/auth/facebook/callback
pub async fn facebook_callback_get(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
    Query(params): Query<CallbackParams>,
) -> Result<Redirect, ApiError> {
    let state = state_lock.read().await.clone();
    let code = params.code.clone();
    run_callback(&state, OAuthProvider::Facebook, code, params).await
}

/// POST /api/auth/facebook/callback
pub async fn facebook_callback_post(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
    Query(params): Query<CallbackParams>,
    Form(form): Form<CallbackForm>,
) -> Result<Redirect, ApiError> {
    let state = state_lock.read().await.clone();
    run_callback(&state, OAuthProvider::Facebook, form.code, params).await
}

/// GET /api/auth/users - list registered identities (digests are never
/// serialized)
pub async fn list_users(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
) -> Result<Json<Vec<User>>, ApiError> {
    let state = state_lock.read().await.clone();
    let users = state
        .auth_service
        .list_users()
        .await
        .map_err(ApiError::DatabaseError)?;
    Ok(Json(users))
}

/// Shared callback flow: exchange the code, fetch and normalize the profile,
/// resolve the identity, then send the browser back to the frontend with the
/// token in the query string.
async fn run_callback(
    state: &AppState,
    provider: OAuthProvider,
    code: Option<String>,
    params: CallbackParams,
) -> Result<Redirect, ApiError> {
    if let Some(code) = code.filter(|c| !c.is_empty()) {
        let exchange = match provider {
            OAuthProvider::Google => state.google_service.exchange_code(&code).await,
            OAuthProvider::Facebook => state.facebook_service.exchange_code(&code).await,
        };

        let access_token = match exchange.access_token {
            Some(token) => token,
            None => {
                let details = exchange.error.unwrap_or_else(|| "Unknown error".to_string());
                warn!(provider = provider.name(), details = %details, "Token exchange failed");
                return Err(ApiError::BadRequestDetailed {
                    message: "Failed to exchange code for token".to_string(),
                    details,
                });
            }
        };

        let identity = match provider {
            OAuthProvider::Google => state
                .google_service
                .fetch_profile(&access_token)
                .await
                .and_then(|p| p.into_identity()),
            OAuthProvider::Facebook => state
                .facebook_service
                .fetch_profile(&access_token)
                .await
                .and_then(|p| p.into_identity()),
        };

        let identity = identity.ok_or_else(|| {
            warn!(provider = provider.name(), "Profile missing required fields");
            ApiError::BadRequest("Failed to get user information".to_string())
        })?;

        return finish_external_login(state, identity, provider).await;
    }

    // Direct identity parameters: a testing-only path, gated off by default.
    if let (Some(email), Some(first_name), Some(last_name), Some(provider_id)) = (
        params.email,
        params.first_name,
        params.last_name,
        params.provider_id,
    ) {
        if !state.dev_mode.bypass_enabled() {
            warn!(
                provider = provider.name(),
                "Direct callback parameters rejected: OAUTH_DEV_BYPASS is disabled"
            );
            return Err(ApiError::BadRequest(
                "Missing required information for authentication".to_string(),
            ));
        }

        warn!(
            provider = provider.name(),
            email = %safe_email_log(&email),
            "OAUTH_DEV_BYPASS: authenticating from raw callback parameters"
        );
        let identity = ProviderIdentity {
            email,
            first_name,
            last_name,
            provider_id,
        };
        return finish_external_login(state, identity, provider).await;
    }

    Err(ApiError::BadRequest(
        "Missing required information for authentication".to_string(),
    ))
}

async fn finish_external_login(
    state: &AppState,
    identity: ProviderIdentity,
    provider: OAuthProvider,
) -> Result<Redirect, ApiError> {
    let response = state
        .auth_service
        .authenticate_external(identity, provider.name())
        .await?;

    let redirect_uri = format!(
        "{}?token={}&email={}&firstName={}&lastName={}",
        state.frontend_redirect_url,
        urlencoding::encode(&response.token),
        urlencoding::encode(&response.email),
        urlencoding::encode(response.first_name.as_deref().unwrap_or("")),
        urlencoding::encode(response.last_name.as_deref().unwrap_or(""))
    );

    info!(
        provider = provider.name(),
        email = %safe_email_log(&response.email),
        "External login successful, redirecting to frontend"
    );
    Ok(Redirect::to(&redirect_uri))
}
