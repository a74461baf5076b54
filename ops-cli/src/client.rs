use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use reqwest::{Method, StatusCode};
use serde_json::Value;

const HTTP_TIMEOUT: Duration = Duration::from_secs(15);

/// Status and parsed body of one response
#[derive(Debug, Clone)]
pub struct Reply {
    pub status: StatusCode,
    pub body: Value,
}

impl Reply {
    /// The `data` member of the success envelope, or the whole body for
    /// endpoints that answer without one.
    #[must_use]
    pub fn data(&self) -> &Value {
        self.body.get("data").unwrap_or(&self.body)
    }

    /// Fails unless the status matches, carrying the server's message.
    ///
    /// # Errors
    ///
    /// Returns the status and error message when they differ.
    pub fn expect_status(self, expected: StatusCode) -> Result<Self> {
        if self.status == expected {
            return Ok(self);
        }
        let message = self
            .body
            .get("message")
            .and_then(Value::as_str)
            .unwrap_or("no message");
        Err(anyhow!("expected {expected}, got {}: {message}", self.status))
    }

    /// Numeric `id` of the returned record.
    ///
    /// # Errors
    ///
    /// Fails when the record carries no integer id.
    pub fn id(&self) -> Result<i64> {
        self.data()
            .get("id")
            .and_then(Value::as_i64)
            .ok_or_else(|| anyhow!("response has no id"))
    }

    /// Length of a list response
    #[must_use]
    pub fn count(&self) -> usize {
        self.data().as_array().map_or(0, Vec::len)
    }
}

/// Thin JSON client that remembers the bearer token after login
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    token: Option<String>,
}

impl ApiClient {
    /// # Errors
    ///
    /// Fails when the HTTP client cannot be built.
    pub fn new(base_url: &str) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(HTTP_TIMEOUT)
            .build()
            .context("Failed to build HTTP client")?;
        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            token: None,
        })
    }

    pub fn set_token(&mut self, token: Option<String>) {
        self.token = token;
    }

    #[must_use]
    pub fn has_token(&self) -> bool {
        self.token.is_some()
    }

    #[must_use]
    pub fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    /// Sends one request. Non-JSON bodies parse as `null`.
    ///
    /// # Errors
    ///
    /// Fails only on transport errors; HTTP error statuses are returned.
    pub async fn send(&self, method: Method, path: &str, body: Option<&Value>) -> Result<Reply> {
        let mut request = self.http.request(method.clone(), self.url(path));
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request
            .send()
            .await
            .with_context(|| format!("{method} {path} failed"))?;
        let status = response.status();
        let text = response.text().await.unwrap_or_default();
        let body = serde_json::from_str(&text).unwrap_or(Value::Null);
        Ok(Reply { status, body })
    }

    /// # Errors
    ///
    /// See [`ApiClient::send`].
    pub async fn get(&self, path: &str) -> Result<Reply> {
        self.send(Method::GET, path, None).await
    }

    /// # Errors
    ///
    /// See [`ApiClient::send`].
    pub async fn post(&self, path: &str, body: &Value) -> Result<Reply> {
        self.send(Method::POST, path, Some(body)).await
    }

    /// # Errors
    ///
    /// See [`ApiClient::send`].
    pub async fn put(&self, path: &str, body: &Value) -> Result<Reply> {
        self.send(Method::PUT, path, Some(body)).await
    }

    /// # Errors
    ///
    /// See [`ApiClient::send`].
    pub async fn delete(&self, path: &str) -> Result<Reply> {
        self.send(Method::DELETE, path, None).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn trailing_slash_is_dropped() {
        let client = ApiClient::new("http://localhost:5000/").unwrap();
        assert_eq!(client.url("/api/v1/health"), "http://localhost:5000/api/v1/health");
    }

    #[test]
    fn reply_reads_the_envelope() {
        let reply = Reply {
            status: StatusCode::CREATED,
            body: json!({ "success": true, "data": { "id": 7 } }),
        };
        assert_eq!(reply.id().unwrap(), 7);

        let list = Reply {
            status: StatusCode::OK,
            body: json!({ "success": true, "data": [{ "id": 1 }, { "id": 2 }] }),
        };
        assert_eq!(list.count(), 2);
    }

    #[test]
    fn unexpected_status_carries_the_message() {
        let reply = Reply {
            status: StatusCode::CONFLICT,
            body: json!({ "message": "CPF is already registered" }),
        };
        let err = reply.expect_status(StatusCode::CREATED).unwrap_err();
        assert!(err.to_string().contains("CPF is already registered"));
    }
}
