// src/services/google.rs
//! Google OAuth2 authorization-code flow: consent URL, code exchange and
//! profile fetch.

use reqwest::Client;
use serde::Deserialize;
use std::env;
use std::time::Duration;
use tracing::{debug, error, info, warn};

use super::{CodeExchange, ProviderIdentity};

const AUTH_ENDPOINT: &str = "https://accounts.google.com/o/oauth2/v2/auth";
const TOKEN_ENDPOINT: &str = "https://oauth2.googleapis.com/token";
const USERINFO_ENDPOINT: &str = "https://www.googleapis.com/oauth2/v2/userinfo";
const SCOPE: &str = "email profile";

#[derive(Debug, Clone)]
pub struct GoogleOAuthConfig {
    pub client_id: String,
    pub client_secret: String,
    pub redirect_uri: String,
}

impl GoogleOAuthConfig {
    pub fn from_env() -> Self {
        let config = Self {
            client_id: env::var("GOOGLE_CLIENT_ID").unwrap_or_default(),
            client_secret: env::var("GOOGLE_CLIENT_SECRET").unwrap_or_default(),
            redirect_uri: env::var("GOOGLE_REDIRECT_URI").unwrap_or_default(),
        };
        if config.client_id.is_empty() || config.client_secret.is_empty() {
            warn!("Google OAuth credentials are not configured; Google login will fail");
        }
        config
    }
}

#[derive(Debug, Deserialize)]
struct GoogleTokenBody {
    access_token: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GoogleTokenErrorBody {
    error: Option<String>,
    error_description: Option<String>,
}

/// Raw userinfo response. Field presence is checked by `into_identity`.
#[derive(Debug, Deserialize)]
pub struct GoogleProfile {
    pub id: Option<String>,
    pub email: Option<String>,
    pub given_name: Option<String>,
    pub family_name: Option<String>,
    pub name: Option<String>,
    pub picture: Option<String>,
}

impl GoogleProfile {
    /// A Google profile is usable only when id, email, given and family name
    /// are all present.
    pub fn into_identity(self) -> Option<ProviderIdentity> {
        Some(ProviderIdentity {
            provider_id: self.id?,
            email: self.email?,
            first_name: self.given_name?,
            last_name: self.family_name?,
        })
    }
}

#[derive(Debug, Clone)]
pub struct GoogleOAuthService {
    config: GoogleOAuthConfig,
    client: Client,
}

impl GoogleOAuthService {
    pub fn new(config: GoogleOAuthConfig) -> Self {
        // Provider calls are browser-blocking mid-redirect; keep them bounded.
        let client = Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .unwrap_or_else(|_| Client::new());

        Self { config, client }
    }

    /// Consent-screen URL the browser is redirected to.
    pub fn authorization_url(&self) -> String {
        format!(
            "{}?client_id={}&redirect_uri={}&response_type=code&scope={}",
            AUTH_ENDPOINT,
            urlencoding::encode(&self.config.client_id),
            urlencoding::encode(&self.config.redirect_uri),
            urlencoding::encode(SCOPE)
        )
    }

    /// Exchange an authorization code for an access token. Provider errors
    /// and local failures are both reported through the returned value.
    pub async fn exchange_code(&self, code: &str) -> CodeExchange {
        let params = [
            ("client_id", self.config.client_id.as_str()),
            ("client_secret", self.config.client_secret.as_str()),
            ("code", code),
            ("grant_type", "authorization_code"),
            ("redirect_uri", self.config.redirect_uri.as_str()),
        ];

        debug!(code_length = code.len(), "Exchanging Google authorization code");

        let response = match self.client.post(TOKEN_ENDPOINT).form(&params).send().await {
            Ok(r) => r,
            Err(e) => {
                error!(error = %e, "Google token exchange request failed");
                return CodeExchange::failed(format!("token request failed: {}", e));
            }
        };

        let status = response.status();
        let body = match response.text().await {
            Ok(b) => b,
            Err(e) => {
                error!(error = %e, "Failed to read Google token exchange response");
                return CodeExchange::failed(format!("unreadable token response: {}", e));
            }
        };

        if !status.is_success() {
            warn!(status = %status, "Google token exchange returned error status");
            return CodeExchange::failed(exchange_error_detail(status.as_u16(), &body));
        }

        match serde_json::from_str::<GoogleTokenBody>(&body) {
            Ok(token) => {
                debug!(
                    has_access_token = token.access_token.is_some(),
                    "Parsed Google token response"
                );
                CodeExchange::token(token.access_token)
            }
            Err(e) => {
                error!(error = %e, "Malformed Google token response");
                CodeExchange::failed(format!("malformed token response: {}", e))
            }
        }
    }

    /// Fetch the user's profile with an access token. Returns `None` on any
    /// non-success status or unparseable body.
    pub async fn fetch_profile(&self, access_token: &str) -> Option<GoogleProfile> {
        let url = format!(
            "{}?access_token={}",
            USERINFO_ENDPOINT,
            urlencoding::encode(access_token)
        );

        let response = match self.client.get(&url).send().await {
            Ok(r) => r,
            Err(e) => {
                error!(error = %e, "Google userinfo request failed");
                return None;
            }
        };

        let status = response.status();
        if !status.is_success() {
            warn!(status = %status, "Google userinfo returned error status");
            return None;
        }

        match response.json::<GoogleProfile>().await {
            Ok(profile) => {
                info!(has_email = profile.email.is_some(), "Fetched Google profile");
                Some(profile)
            }
            Err(e) => {
                error!(error = %e, "Failed to parse Google userinfo response");
                None
            }
        }
    }
}

/// Map a non-success token-endpoint response to a human-readable detail.
/// A structured `{error, error_description}` body wins; otherwise the raw
/// body is surfaced with its status.
fn exchange_error_detail(status: u16, body: &str) -> String {
    if let Ok(parsed) = serde_json::from_str::<GoogleTokenErrorBody>(body) {
        if let Some(error) = parsed.error.filter(|e| !e.is_empty()) {
            return match parsed.error_description {
                Some(description) => format!("{}: {}", error, description),
                None => error,
            };
        }
    }
    format!("HTTP {}: {}", status, body)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config() -> GoogleOAuthConfig {
        GoogleOAuthConfig {
            client_id: "test_client_id".to_string(),
            client_secret: "test_secret".to_string(),
            redirect_uri: "http://localhost:8080/api/auth/google/callback".to_string(),
        }
    }

    #[test]
    fn test_authorization_url() {
        let service = GoogleOAuthService::new(test_config());
        let url = service.authorization_url();

        assert!(url.starts_with("https://accounts.google.com/o/oauth2/v2/auth?"));
        assert!(url.contains("client_id=test_client_id"));
        assert!(url.contains("response_type=code"));
        assert!(url.contains("scope=email%20profile"));
        assert!(url.contains("redirect_uri=http%3A%2F%2Flocalhost"));
    }

    #[test]
    fn test_exchange_error_detail_structured() {
        let body = r#"{"error":"invalid_grant","error_description":"Bad Request"}"#;
        assert_eq!(exchange_error_detail(400, body), "invalid_grant: Bad Request");
    }

    #[test]
    fn test_exchange_error_detail_without_description() {
        let body = r#"{"error":"invalid_client"}"#;
        assert_eq!(exchange_error_detail(401, body), "invalid_client");
    }

    #[test]
    fn test_exchange_error_detail_raw_fallback() {
        assert_eq!(
            exchange_error_detail(502, "upstream unavailable"),
            "HTTP 502: upstream unavailable"
        );
    }

    #[test]
    fn test_profile_requires_all_fields() {
        let profile = GoogleProfile {
            id: Some("g-1".to_string()),
            email: Some("a@b.com".to_string()),
            given_name: Some("Ada".to_string()),
            family_name: None,
            name: Some("Ada Lovelace".to_string()),
            picture: None,
        };
        assert!(profile.into_identity().is_none());

        let profile = GoogleProfile {
            id: Some("g-1".to_string()),
            email: Some("a@b.com".to_string()),
            given_name: Some("Ada".to_string()),
            family_name: Some("Lovelace".to_string()),
            name: None,
            picture: None,
        };
        let identity = profile.into_identity().unwrap();
        assert_eq!(identity.provider_id, "g-1");
        assert_eq!(identity.email, "a@b.com");
        assert_eq!(identity.first_name, "Ada");
        assert_eq!(identity.last_name, "Lovelace");
    }
}
