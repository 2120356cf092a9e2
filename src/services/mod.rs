// Services module - external integrations and crypto primitives

pub mod facebook;
pub mod google;
pub mod jwt;
pub mod password;

pub use facebook::FacebookOAuthService;
pub use google::GoogleOAuthService;
pub use jwt::{JwtConfig, JwtService};
pub use password::PasswordHasher;

/// Result of an authorization-code exchange. Provider-side failures and
/// local failures (network, malformed JSON) both land in `error`; the
/// exchangers never propagate an `Err` to the caller.
#[derive(Debug)]
pub struct CodeExchange {
    pub access_token: Option<String>,
    pub error: Option<String>,
}

impl CodeExchange {
    pub fn token(access_token: Option<String>) -> Self {
        Self {
            access_token,
            error: None,
        }
    }

    pub fn failed(error: String) -> Self {
        Self {
            access_token: None,
            error: Some(error),
        }
    }
}

/// Normalized profile fields handed to the auth orchestrator after a
/// provider profile passes its usability check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderIdentity {
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub provider_id: String,
}
