//! Catalog REST client boundary.
//!
//! Issues a token from the configured [`TokenProvider`] for every request,
//! injects it under the configured header and applies the fixed-delay retry
//! policy to transient failures. A `401` triggers one token re-issue and one
//! immediate retry; a second `401` is surfaced as `AuthenticationError`.

pub mod headers;

use std::sync::Arc;

use reqwest::{Method, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::auth::{ProviderFactory, TokenProvider};
use crate::config::ProviderConfig;
use crate::error::{CatalogError, Result};
use crate::retry::{RetryExecutor, RetryPolicy};
use headers::{DEFAULT_USER_AGENT, HttpHeaderBuilder};

/// Thin HTTP client for the catalog API.
#[derive(Clone)]
pub struct RestClient {
    base_url: String,
    auth_header_name: String,
    http: reqwest::Client,
    provider: Arc<dyn TokenProvider>,
    retry: RetryExecutor,
}

impl std::fmt::Debug for RestClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RestClient")
            .field("base_url", &self.base_url)
            .field("auth_header_name", &self.auth_header_name)
            .field("provider", &self.provider.provider_type())
            .field("retry", self.retry.policy())
            .finish()
    }
}

impl RestClient {
    /// Create a client around an existing provider and HTTP client.
    pub fn new(
        config: &ProviderConfig,
        provider: Arc<dyn TokenProvider>,
        http: reqwest::Client,
    ) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            base_url: config.base_url(),
            auth_header_name: config.auth_header_name.clone(),
            http,
            provider,
            retry: RetryExecutor::new(RetryPolicy::from_config(config)),
        })
    }

    /// Create a client and its token provider from configuration alone.
    pub fn from_config(config: &ProviderConfig) -> Result<Self> {
        let http = reqwest::Client::new();
        let provider = ProviderFactory::new(http.clone()).create(config)?;
        Self::new(config, provider, http)
    }

    /// Replace the retry policy derived from configuration.
    pub fn with_retry_policy(mut self, policy: RetryPolicy) -> Self {
        self.retry = RetryExecutor::new(policy);
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn provider(&self) -> &Arc<dyn TokenProvider> {
        &self.provider
    }

    /// Absolute URL for an API path relative to `<endpoint>/<version>`.
    pub fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    pub async fn get(&self, path: &str) -> Result<Value> {
        self.request(Method::GET, path, None).await
    }

    /// GET and decode the response into `T`.
    pub async fn get_as<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let value = self.get(path).await?;
        Ok(serde_json::from_value(value)?)
    }

    pub async fn post(&self, path: &str, body: &Value) -> Result<Value> {
        self.request(Method::POST, path, Some(body)).await
    }

    pub async fn put(&self, path: &str, body: &Value) -> Result<Value> {
        self.request(Method::PUT, path, Some(body)).await
    }

    pub async fn patch(&self, path: &str, body: &Value) -> Result<Value> {
        self.request(Method::PATCH, path, Some(body)).await
    }

    pub async fn delete(&self, path: &str) -> Result<Value> {
        self.request(Method::DELETE, path, None).await
    }

    /// Perform a request with retries. Empty response bodies decode to `Value::Null`.
    pub async fn request(
        &self,
        method: Method,
        path: &str,
        body: Option<&Value>,
    ) -> Result<Value> {
        let url = self.url(path);
        self.retry
            .execute(|| self.request_once(method.clone(), &url, body))
            .await
    }

    async fn request_once(
        &self,
        method: Method,
        url: &str,
        body: Option<&Value>,
    ) -> Result<Value> {
        let token = self.provider.auth_token().await?;
        let mut resp = self.send(method.clone(), url, body, &token).await?;

        if resp.status() == StatusCode::UNAUTHORIZED {
            tracing::info!(
                target: "catalog_auth::client",
                provider = %self.provider.provider_type(),
                url = %url,
                "unauthorized, re-issuing token and retrying once"
            );
            let token = self.provider.auth_token().await?;
            resp = self.send(method, url, body, &token).await?;
        }

        Self::decode(url, resp).await
    }

    async fn send(
        &self,
        method: Method,
        url: &str,
        body: Option<&Value>,
        token: &str,
    ) -> Result<Response> {
        let headers = HttpHeaderBuilder::new()
            .with_auth_token(&self.auth_header_name, token)?
            .with_json_content_type()
            .with_user_agent(DEFAULT_USER_AGENT)?
            .build();

        let mut builder = self.http.request(method.clone(), url).headers(headers);
        if let Some(body) = body {
            builder = builder.json(body);
        }

        tracing::debug!(target: "catalog_auth::client", method = %method, url = %url, "sending request");
        let resp = builder.send().await?;
        tracing::debug!(
            target: "catalog_auth::client",
            method = %method,
            url = %url,
            status = resp.status().as_u16(),
            "response received"
        );
        Ok(resp)
    }

    async fn decode(url: &str, resp: Response) -> Result<Value> {
        let status = resp.status();
        let text = resp.text().await?;

        if !status.is_success() {
            return Err(classify_http_error(url, status.as_u16(), &text));
        }

        if text.trim().is_empty() {
            return Ok(Value::Null);
        }
        Ok(serde_json::from_str(&text)?)
    }
}

/// Map a non-success catalog response to an error; 429 and 5xx stay retryable.
pub fn classify_http_error(url: &str, status: u16, body_text: &str) -> CatalogError {
    let body_sample = body_text.chars().take(200).collect::<String>();

    if status == 401 {
        return CatalogError::AuthenticationError(format!(
            "url={url} unauthorized body_sample={body_sample}"
        ));
    }

    if let Ok(json) = serde_json::from_str::<Value>(body_text) {
        let message = json
            .get("message")
            .and_then(Value::as_str)
            .map(str::to_string)
            .unwrap_or_else(|| body_sample.clone());
        return CatalogError::api_error_with_details(status, message, json);
    }

    let message = if body_text.trim().is_empty() {
        format!("url={url} http={status}")
    } else {
        body_sample
    };
    CatalogError::api_error(status, message)
}
