// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! HTTP client facade for the laundry backend.
//!
//! Every outgoing request goes through [`ApiClient`]. Credentials are injected
//! per request by the caller; the client keeps no default `Authorization`
//! header. A 401 on a request that carried a token clears that persisted
//! credential before the error is handed back, so nobody can retry with the
//! dead token.

use crate::config::Config;
use crate::error::{ApiError, Result};
use crate::store::CredentialStore;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT};
use reqwest::{Method, StatusCode, Url};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;

/// Connection settings, fixed at construction.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub base_url: String,
    pub timeout: Duration,
}

impl From<&Config> for ClientConfig {
    fn from(config: &Config) -> Self {
        Self {
            base_url: config.api_url.clone(),
            timeout: config.request_timeout,
        }
    }
}

/// The single outgoing request pipeline.
#[derive(Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    store: Arc<dyn CredentialStore>,
}

impl ApiClient {
    /// Configure the client. A bad base URL is a programmer error and is
    /// reported here rather than on the first request.
    pub fn new(config: ClientConfig, store: Arc<dyn CredentialStore>) -> Result<Self> {
        let base_url = config.base_url.trim().trim_end_matches('/').to_string();
        let parsed = Url::parse(&base_url)
            .map_err(|e| ApiError::Config(format!("invalid base URL {:?}: {}", base_url, e)))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(ApiError::Config(format!(
                "unsupported scheme in base URL {:?}",
                base_url
            )));
        }

        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let http = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(config.timeout)
            .connect_timeout(config.timeout)
            .build()
            .map_err(|e| ApiError::Config(e.to_string()))?;

        tracing::info!(base_url = %base_url, timeout_secs = config.timeout.as_secs(), "API client configured");

        Ok(Self {
            http,
            base_url,
            store,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn get(&self, path: &str) -> ApiRequest<'_> {
        self.request(Method::GET, path)
    }

    pub fn post(&self, path: &str) -> ApiRequest<'_> {
        self.request(Method::POST, path)
    }

    pub fn put(&self, path: &str) -> ApiRequest<'_> {
        self.request(Method::PUT, path)
    }

    pub fn patch(&self, path: &str) -> ApiRequest<'_> {
        self.request(Method::PATCH, path)
    }

    pub fn delete(&self, path: &str) -> ApiRequest<'_> {
        self.request(Method::DELETE, path)
    }

    pub fn request(&self, method: Method, path: &str) -> ApiRequest<'_> {
        ApiRequest {
            client: self,
            method,
            path: path.to_string(),
            token: None,
            body: None,
            query: Vec::new(),
        }
    }

    fn url_for(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    async fn execute<T: DeserializeOwned>(&self, req: ApiRequest<'_>) -> Result<T> {
        let url = self.url_for(&req.path);
        tracing::debug!(method = %req.method, path = %req.path, "API request");

        let mut builder = self.http.request(req.method.clone(), &url);
        if !req.query.is_empty() {
            builder = builder.query(&req.query);
        }
        if let Some(token) = req.token.as_deref() {
            builder = builder.bearer_auth(token);
        }
        if let Some(body) = req.body {
            // `.json()` also sets Content-Type: application/json
            builder = builder.json(&body?);
        }

        let response = builder.send().await.map_err(|e| {
            let err = ApiError::from(e);
            match &err {
                ApiError::Timeout => {
                    tracing::warn!(method = %req.method, path = %req.path, "API request timed out")
                }
                _ => {
                    tracing::error!(method = %req.method, path = %req.path, error = %err, "No response from backend")
                }
            }
            err
        })?;

        let status = response.status();
        tracing::debug!(path = %req.path, status = status.as_u16(), "API response");

        if status.is_success() {
            // Transport failures while reading the body keep their own kind;
            // only a body that arrived but does not parse is malformed.
            let body = response.bytes().await.map_err(|e| {
                let err = ApiError::from(e);
                tracing::warn!(path = %req.path, error = %err, "Failed to read response body");
                err
            })?;
            return serde_json::from_slice::<T>(&body).map_err(|e| {
                tracing::warn!(path = %req.path, error = %e, "Malformed success response");
                ApiError::Validation(e.to_string())
            });
        }

        let body = response.text().await.unwrap_or_default();
        let message = error_message(status, &body);

        if status == StatusCode::UNAUTHORIZED {
            // Only a request that presented a credential can invalidate it.
            if let Some(token) = req.token.as_deref() {
                tracing::warn!(path = %req.path, "Unauthorized, clearing stored credential");
                self.store.clear_if_current(token);
            } else {
                tracing::warn!(path = %req.path, message = %message, "Unauthorized");
            }
            return Err(ApiError::Unauthorized);
        }

        if status.is_server_error() {
            tracing::error!(path = %req.path, status = status.as_u16(), message = %message, "Backend error");
        } else {
            tracing::warn!(path = %req.path, status = status.as_u16(), message = %message, "Request rejected");
        }
        Err(ApiError::from_status(status, message))
    }
}

/// One request being assembled. Finish with [`ApiRequest::send`].
#[must_use = "requests do nothing until sent"]
pub struct ApiRequest<'a> {
    client: &'a ApiClient,
    method: Method,
    path: String,
    token: Option<String>,
    body: Option<Result<serde_json::Value>>,
    query: Vec<(String, String)>,
}

impl<'a> ApiRequest<'a> {
    /// Attach `Authorization: Bearer <token>` when a token is given.
    pub fn bearer(mut self, token: Option<&str>) -> Self {
        self.token = token.map(str::to_string);
        self
    }

    pub fn json<B: Serialize + ?Sized>(mut self, body: &B) -> Self {
        self.body = Some(
            serde_json::to_value(body)
                .map_err(|e| ApiError::Config(format!("request body not serializable: {}", e))),
        );
        self
    }

    pub fn query<K, V>(mut self, params: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        self.query
            .extend(params.into_iter().map(|(k, v)| (k.into(), v.into())));
        self
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub async fn send<T: DeserializeOwned>(self) -> Result<T> {
        let client = self.client;
        client.execute(self).await
    }
}

/// Pull a human message out of an error body: `message`, then `error`, then
/// the status reason.
fn error_message(status: StatusCode, body: &str) -> String {
    let from_json = serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|v| {
            ["message", "error"].iter().find_map(|key| {
                v.get(*key)
                    .and_then(|m| m.as_str())
                    .filter(|m| !m.is_empty())
                    .map(str::to_string)
            })
        });

    from_json.unwrap_or_else(|| {
        status
            .canonical_reason()
            .map(str::to_string)
            .unwrap_or_else(|| format!("HTTP {}", status.as_u16()))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryCredentialStore;

    fn client(base: &str) -> Result<ApiClient> {
        ApiClient::new(
            ClientConfig {
                base_url: base.to_string(),
                timeout: Duration::from_secs(1),
            },
            Arc::new(MemoryCredentialStore::new()),
        )
    }

    #[test]
    fn test_url_join() {
        let api = client("http://localhost:5000/api/").unwrap();
        assert_eq!(api.url_for("/orders/1"), "http://localhost:5000/api/orders/1");
        assert_eq!(api.url_for("services"), "http://localhost:5000/api/services");
    }

    #[test]
    fn test_bad_base_url_rejected() {
        assert!(matches!(client("not a url"), Err(ApiError::Config(_))));
        assert!(matches!(client("ftp://host/api"), Err(ApiError::Config(_))));
    }

    #[test]
    fn test_error_message_extraction() {
        assert_eq!(
            error_message(StatusCode::BAD_REQUEST, r#"{"message":"Email taken"}"#),
            "Email taken"
        );
        assert_eq!(
            error_message(StatusCode::FORBIDDEN, r#"{"error":"Admins only"}"#),
            "Admins only"
        );
        assert_eq!(
            error_message(StatusCode::NOT_FOUND, "<html>nope</html>"),
            "Not Found"
        );
    }

    #[test]
    fn test_request_builder_collects_parts() {
        let api = client("http://localhost:5000/api").unwrap();
        let req = api
            .get("/orders/admin")
            .bearer(Some("tok"))
            .query([("page", "1"), ("limit", "10")]);
        assert_eq!(req.method(), Method::GET);
        assert_eq!(req.path(), "/orders/admin");
        assert_eq!(req.token.as_deref(), Some("tok"));
        assert_eq!(req.query.len(), 2);
    }
}
