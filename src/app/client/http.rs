//! Core HTTP operations against the build service
//!
//! Every request is sent exactly once. Error statuses are turned into
//! [`RemoteError`] carrying the service's own message.

use reqwest::{Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::auth::Session;
use crate::errors::{AppError, RemoteError, Result};

/// Attach the session's bearer token to a request
pub fn authorize(request: RequestBuilder, session: &Session) -> RequestBuilder {
    request.bearer_auth(session.token())
}

/// Send a request once and require a success status
pub async fn send(request: RequestBuilder) -> Result<Response> {
    let response = request.send().await?;
    tracing::debug!("{} {}", response.status(), response.url());
    check_status(response).await
}

/// Pass 2xx responses through; convert everything else to [`RemoteError`]
pub async fn check_status(response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    let message = extract_error_message(&body)
        .unwrap_or_else(|| format!("Build service returned HTTP {}", status.as_u16()));

    tracing::warn!("Build service error (HTTP {}): {}", status.as_u16(), message);
    Err(RemoteError::Status {
        status: status.as_u16(),
        message,
    }
    .into())
}

/// Decode a JSON body, reporting shape mismatches as malformed responses
pub async fn read_json<T: DeserializeOwned>(response: Response) -> Result<T> {
    let body = response.text().await?;
    serde_json::from_str(&body).map_err(|e| {
        AppError::from(RemoteError::Malformed {
            reason: e.to_string(),
        })
    })
}

/// Service message from an error body
///
/// Accepts `{"error": {"message": ..}}`, `{"error": ".."}`, `{"message": ..}`,
/// or a plain-text body.
pub fn extract_error_message(body: &str) -> Option<String> {
    let trimmed = body.trim();
    if trimmed.is_empty() {
        return None;
    }

    match serde_json::from_str::<Value>(trimmed) {
        Ok(json) => json
            .pointer("/error/message")
            .or_else(|| json.get("error").filter(|v| v.is_string()))
            .or_else(|| json.get("message"))
            .and_then(Value::as_str)
            .map(str::to_string),
        Err(_) => Some(trimmed.to_string()),
    }
}

/// Shared client plus the handful of request shapes the service needs
#[derive(Debug, Clone)]
pub struct HttpHandler {
    client: Client,
}

impl HttpHandler {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    /// Authenticated GET returning decoded JSON
    pub async fn get_json<T: DeserializeOwned>(
        &self,
        url: &url::Url,
        session: &Session,
    ) -> Result<T> {
        let response = send(authorize(self.client.get(url.as_str()), session)).await?;
        read_json(response).await
    }

    /// Get a reference to the underlying HTTP client
    pub fn client(&self) -> &Client {
        &self.client
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nested_error_message() {
        let body = r#"{"error": {"message": "Keystore password is incorrect", "type": "BadRequest"}}"#;
        assert_eq!(
            extract_error_message(body).as_deref(),
            Some("Keystore password is incorrect")
        );
    }

    #[test]
    fn test_flat_error_messages() {
        assert_eq!(
            extract_error_message(r#"{"error": "quota exceeded"}"#).as_deref(),
            Some("quota exceeded")
        );
        assert_eq!(
            extract_error_message(r#"{"message": "not found"}"#).as_deref(),
            Some("not found")
        );
    }

    #[test]
    fn test_plain_text_and_empty_bodies() {
        assert_eq!(
            extract_error_message("Bad Gateway\n").as_deref(),
            Some("Bad Gateway")
        );
        assert_eq!(extract_error_message("   "), None);
        assert_eq!(extract_error_message(r#"{"detail": 3}"#), None);
    }
}
