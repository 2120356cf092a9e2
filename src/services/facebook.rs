// src/services/facebook.rs
//! Facebook OAuth2 authorization-code flow. Same shape as the Google
//! service, but the token endpoint takes its parameters in the query string
//! and the profile may omit email and name parts, which are synthesized.

use reqwest::Client;
use serde::Deserialize;
use std::env;
use std::time::Duration;
use tracing::{debug, error, info, warn};

use super::{CodeExchange, ProviderIdentity};

const AUTH_ENDPOINT: &str = "https://www.facebook.com/v19.0/dialog/oauth";
const TOKEN_ENDPOINT: &str = "https://graph.facebook.com/v19.0/oauth/access_token";
const ME_ENDPOINT: &str = "https://graph.facebook.com/v19.0/me";
const SCOPE: &str = "public_profile";
const PROFILE_FIELDS: &str = "id,name,first_name,last_name,picture";

#[derive(Debug, Clone)]
pub struct FacebookOAuthConfig {
    pub app_id: String,
    pub app_secret: String,
    pub redirect_uri: String,
}

impl FacebookOAuthConfig {
    pub fn from_env() -> Self {
        let config = Self {
            app_id: env::var("FACEBOOK_APP_ID").unwrap_or_default(),
            app_secret: env::var("FACEBOOK_APP_SECRET").unwrap_or_default(),
            redirect_uri: env::var("FACEBOOK_REDIRECT_URI").unwrap_or_default(),
        };
        if config.app_id.is_empty() || config.app_secret.is_empty() {
            warn!("Facebook OAuth credentials are not configured; Facebook login will fail");
        }
        config
    }
}

#[derive(Debug, Deserialize)]
struct FacebookTokenBody {
    access_token: Option<String>,
}

#[derive(Debug, Deserialize)]
struct FacebookTokenErrorBody {
    error: Option<FacebookError>,
}

#[derive(Debug, Deserialize)]
struct FacebookError {
    message: Option<String>,
    #[serde(rename = "type")]
    #[allow(dead_code)]
    error_type: Option<String>,
    #[allow(dead_code)]
    code: Option<i64>,
}

/// Raw Graph API `/me` response. With only the `public_profile` scope the
/// email field is usually absent.
#[derive(Debug, Deserialize)]
pub struct FacebookProfile {
    pub id: Option<String>,
    pub name: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
}

impl FacebookProfile {
    /// A Facebook profile is usable when id and name are present. Missing
    /// email becomes `<id>@facebook.com`; missing first/last names are split
    /// out of `name` as first word vs. remainder (the whole name when it has
    /// no space).
    pub fn into_identity(self) -> Option<ProviderIdentity> {
        let id = self.id?;
        let name = self.name?;

        let email = self
            .email
            .unwrap_or_else(|| format!("{}@facebook.com", id));
        let first_name = match self.first_name {
            Some(first) => first,
            None => name.split(' ').next().unwrap_or(&name).to_string(),
        };
        let last_name = match self.last_name {
            Some(last) => last,
            None => match name.find(' ') {
                Some(i) => name[i + 1..].to_string(),
                None => name.clone(),
            },
        };

        Some(ProviderIdentity {
            email,
            first_name,
            last_name,
            provider_id: id,
        })
    }
}

#[derive(Debug, Clone)]
pub struct FacebookOAuthService {
    config: FacebookOAuthConfig,
    client: Client,
}

impl FacebookOAuthService {
    pub fn new(config: FacebookOAuthConfig) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .unwrap_or_else(|_| Client::new());

        Self { config, client }
    }

    pub fn authorization_url(&self) -> String {
        format!(
            "{}?client_id={}&redirect_uri={}&scope={}",
            AUTH_ENDPOINT,
            urlencoding::encode(&self.config.app_id),
            urlencoding::encode(&self.config.redirect_uri),
            urlencoding::encode(SCOPE)
        )
    }

    /// Exchange an authorization code for an access token via GET with query
    /// parameters. Failures are reported through the returned value, never
    /// as an `Err`.
    pub async fn exchange_code(&self, code: &str) -> CodeExchange {
        let query = [
            ("client_id", self.config.app_id.as_str()),
            ("redirect_uri", self.config.redirect_uri.as_str()),
            ("client_secret", self.config.app_secret.as_str()),
            ("code", code),
        ];

        debug!(code_length = code.len(), "Exchanging Facebook authorization code");

        let response = match self.client.get(TOKEN_ENDPOINT).query(&query).send().await {
            Ok(r) => r,
            Err(e) => {
                error!(error = %e, "Facebook token exchange request failed");
                return CodeExchange::failed(format!("token request failed: {}", e));
            }
        };

        let status = response.status();
        let body = match response.text().await {
            Ok(b) => b,
            Err(e) => {
                error!(error = %e, "Failed to read Facebook token exchange response");
                return CodeExchange::failed(format!("unreadable token response: {}", e));
            }
        };

        if !status.is_success() {
            warn!(status = %status, "Facebook token exchange returned error status");
            return CodeExchange::failed(exchange_error_detail(status.as_u16(), &body));
        }

        match serde_json::from_str::<FacebookTokenBody>(&body) {
            Ok(token) => {
                debug!(
                    has_access_token = token.access_token.is_some(),
                    "Parsed Facebook token response"
                );
                CodeExchange::token(token.access_token)
            }
            Err(e) => {
                error!(error = %e, "Malformed Facebook token response");
                CodeExchange::failed(format!("malformed token response: {}", e))
            }
        }
    }

    /// Fetch the user's profile from the Graph API. `None` on any
    /// non-success status or unparseable body.
    pub async fn fetch_profile(&self, access_token: &str) -> Option<FacebookProfile> {
        let query = [("access_token", access_token), ("fields", PROFILE_FIELDS)];

        let response = match self.client.get(ME_ENDPOINT).query(&query).send().await {
            Ok(r) => r,
            Err(e) => {
                error!(error = %e, "Facebook profile request failed");
                return None;
            }
        };

        let status = response.status();
        if !status.is_success() {
            warn!(status = %status, "Facebook profile fetch returned error status");
            return None;
        }

        match response.json::<FacebookProfile>().await {
            Ok(profile) => {
                info!(has_email = profile.email.is_some(), "Fetched Facebook profile");
                Some(profile)
            }
            Err(e) => {
                error!(error = %e, "Failed to parse Facebook profile response");
                None
            }
        }
    }
}

/// Facebook error bodies nest the message: `{error: {message, type, code}}`.
fn exchange_error_detail(status: u16, body: &str) -> String {
    if let Ok(parsed) = serde_json::from_str::<FacebookTokenErrorBody>(body) {
        if let Some(message) = parsed.error.and_then(|e| e.message).filter(|m| !m.is_empty()) {
            return message;
        }
    }
    format!("HTTP {}: {}", status, body)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config() -> FacebookOAuthConfig {
        FacebookOAuthConfig {
            app_id: "test_app_id".to_string(),
            app_secret: "test_secret".to_string(),
            redirect_uri: "http://localhost:8080/api/auth/facebook/callback".to_string(),
        }
    }

    #[test]
    fn test_authorization_url() {
        let service = FacebookOAuthService::new(test_config());
        let url = service.authorization_url();

        assert!(url.starts_with("https://www.facebook.com/v19.0/dialog/oauth?"));
        assert!(url.contains("client_id=test_app_id"));
        assert!(url.contains("scope=public_profile"));
    }

    #[test]
    fn test_exchange_error_detail_structured() {
        let body = r#"{"error":{"message":"Invalid verification code format.","type":"OAuthException","code":100}}"#;
        assert_eq!(
            exchange_error_detail(400, body),
            "Invalid verification code format."
        );
    }

    #[test]
    fn test_exchange_error_detail_raw_fallback() {
        assert_eq!(
            exchange_error_detail(500, "boom"),
            "HTTP 500: boom"
        );
    }

    #[test]
    fn test_profile_synthesizes_missing_fields() {
        let profile = FacebookProfile {
            id: Some("999".to_string()),
            name: Some("Somchai Jaidee".to_string()),
            first_name: None,
            last_name: None,
            email: None,
        };
        let identity = profile.into_identity().unwrap();
        assert_eq!(identity.email, "999@facebook.com");
        assert_eq!(identity.first_name, "Somchai");
        assert_eq!(identity.last_name, "Jaidee");
        assert_eq!(identity.provider_id, "999");
    }

    #[test]
    fn test_profile_single_word_name() {
        let profile = FacebookProfile {
            id: Some("42".to_string()),
            name: Some("Cher".to_string()),
            first_name: None,
            last_name: None,
            email: None,
        };
        let identity = profile.into_identity().unwrap();
        assert_eq!(identity.first_name, "Cher");
        assert_eq!(identity.last_name, "Cher");
    }

    #[test]
    fn test_profile_prefers_explicit_fields() {
        let profile = FacebookProfile {
            id: Some("7".to_string()),
            name: Some("Mary Jane Watson".to_string()),
            first_name: Some("Mary Jane".to_string()),
            last_name: Some("Watson".to_string()),
            email: Some("mj@example.com".to_string()),
        };
        let identity = profile.into_identity().unwrap();
        assert_eq!(identity.email, "mj@example.com");
        assert_eq!(identity.first_name, "Mary Jane");
        assert_eq!(identity.last_name, "Watson");
    }

    #[test]
    fn test_profile_requires_id_and_name() {
        let profile = FacebookProfile {
            id: Some("7".to_string()),
            name: None,
            first_name: Some("Mary".to_string()),
            last_name: Some("Watson".to_string()),
            email: None,
        };
        assert!(profile.into_identity().is_none());
    }
}
