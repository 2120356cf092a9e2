// src/logging_middleware.rs
//! Middleware for logging request and response bodies in debug mode.
//! Credential-bearing JSON fields are masked before anything reaches the log.

use axum::body::to_bytes;
use axum::{
    body::Body,
    extract::Request,
    http::StatusCode,
    middleware::Next,
    response::Response,
};
use serde_json::Value;
use tracing::debug;

const SENSITIVE_FIELDS: &[&str] = &["password", "token", "access_token", "client_secret"];

/// Middleware to log request and response bodies in debug mode
pub async fn log_request_response(request: Request, next: Next) -> Result<Response, StatusCode> {
    let (parts, body) = request.into_parts();

    let bytes = to_bytes(body, usize::MAX)
        .await
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?;

    if !bytes.is_empty() {
        if let Ok(body_str) = std::str::from_utf8(&bytes) {
            if let Ok(mut json) = serde_json::from_str::<Value>(body_str) {
                redact_sensitive(&mut json);
                debug!(
                    method = %parts.method,
                    uri = %parts.uri,
                    request_body = %json,
                    "📥 Request"
                );
            } else {
                debug!(
                    method = %parts.method,
                    uri = %parts.uri,
                    request_body_bytes = bytes.len(),
                    "📥 Request (non-JSON body omitted)"
                );
            }
        }
    }

    let request = Request::from_parts(parts, Body::from(bytes));
    let response = next.run(request).await;

    let (parts, body) = response.into_parts();
    let bytes = to_bytes(body, usize::MAX)
        .await
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?;

    if !bytes.is_empty() {
        if let Ok(body_str) = std::str::from_utf8(&bytes) {
            if let Ok(mut json) = serde_json::from_str::<Value>(body_str) {
                redact_sensitive(&mut json);
                debug!(
                    status = %parts.status,
                    response_body = %json,
                    "📤 Response"
                );
            }
        }
    }

    Ok(Response::from_parts(parts, Body::from(bytes)))
}

/// Replace the values of credential fields anywhere in the JSON tree.
fn redact_sensitive(value: &mut Value) {
    match value {
        Value::Object(map) => {
            for (key, entry) in map.iter_mut() {
                if SENSITIVE_FIELDS.contains(&key.as_str()) {
                    *entry = Value::String("***".to_string());
                } else {
                    redact_sensitive(entry);
                }
            }
        }
        Value::Array(items) => {
            for item in items.iter_mut() {
                redact_sensitive(item);
            }
        }
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_redacts_password_and_token() {
        let mut body = json!({
            "email": "a@b.com",
            "password": "hunter2",
            "nested": { "token": "eyJ...", "ok": 1 },
            "list": [{ "access_token": "abc" }]
        });
        redact_sensitive(&mut body);

        assert_eq!(body["email"], "a@b.com");
        assert_eq!(body["password"], "***");
        assert_eq!(body["nested"]["token"], "***");
        assert_eq!(body["nested"]["ok"], 1);
        assert_eq!(body["list"][0]["access_token"], "***");
    }
}
