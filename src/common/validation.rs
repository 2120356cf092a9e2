// Request validation for the auth endpoints

use regex::Regex;
use std::sync::OnceLock;

use super::error::ApiError;
use crate::auth::models::{LoginRequest, RegisterRequest};

fn email_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("valid email regex"))
}

pub fn is_valid_email(email: &str) -> bool {
    email_regex().is_match(email)
}

pub fn validate_login(request: &LoginRequest) -> Result<(), ApiError> {
    validate_credentials(&request.email, &request.password)
}

pub fn validate_register(request: &RegisterRequest) -> Result<(), ApiError> {
    validate_credentials(&request.email, &request.password)
}

fn validate_credentials(email: &str, password: &str) -> Result<(), ApiError> {
    if email.is_empty() {
        return Err(ApiError::ValidationError("email is required".to_string()));
    }
    if !is_valid_email(email) {
        return Err(ApiError::ValidationError(
            "email format is invalid".to_string(),
        ));
    }
    if password.is_empty() {
        return Err(ApiError::ValidationError(
            "password is required".to_string(),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_email_format() {
        assert!(is_valid_email("user@example.com"));
        assert!(is_valid_email("a.b+c@sub.domain.co"));
        assert!(!is_valid_email("no-at-sign"));
        assert!(!is_valid_email("two@@example.com"));
        assert!(!is_valid_email("spaces in@example.com"));
        assert!(!is_valid_email("user@nodot"));
        assert!(!is_valid_email(""));
    }

    #[test]
    fn test_login_validation() {
        let ok = LoginRequest {
            email: "a@b.com".to_string(),
            password: "x".to_string(),
        };
        assert!(validate_login(&ok).is_ok());

        let bad_email = LoginRequest {
            email: "nope".to_string(),
            password: "x".to_string(),
        };
        assert!(validate_login(&bad_email).is_err());

        let empty_password = LoginRequest {
            email: "a@b.com".to_string(),
            password: String::new(),
        };
        assert!(validate_login(&empty_password).is_err());
    }
}
