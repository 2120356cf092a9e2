// Application state shared across all modules

use sqlx::SqlitePool;
use std::sync::Arc;

use crate::auth::service::AuthService;
use crate::common::dev_mode::DevModeConfig;
use crate::services::{FacebookOAuthService, GoogleOAuthService};

/// Application state containing the database pool, services, and
/// configuration
#[derive(Clone)]
pub struct AppState {
    pub db: SqlitePool,
    pub frontend_redirect_url: String,
    pub dev_mode: DevModeConfig,
    pub auth_service: Arc<AuthService>,
    pub google_service: Arc<GoogleOAuthService>,
    pub facebook_service: Arc<FacebookOAuthService>,
}
