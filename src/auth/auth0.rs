//! OAuth2 client credentials against a tenant domain (Auth0 style).

use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;

use super::{AuthProviderType, TokenProvider, body_sample};
use crate::config::{ProviderConfig, required_field};
use crate::error::{CatalogError, Result};

#[derive(Debug, Deserialize)]
struct AccessTokenResponse {
    #[serde(default)]
    access_token: Option<String>,
}

/// Exchanges a client id/secret for an access token at `https://<domain>/oauth/token`.
#[derive(Debug, Clone)]
pub struct Auth0TokenProvider {
    domain: String,
    client_id: String,
    client_secret: SecretString,
    http: reqwest::Client,
}

impl Auth0TokenProvider {
    /// Create a new provider.
    ///
    /// A `domain` that already carries a scheme (`http://host:port`) is used
    /// as-is; a bare host gets `https://`.
    pub fn new(
        domain: impl Into<String>,
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
        http: reqwest::Client,
    ) -> Self {
        Self {
            domain: domain.into(),
            client_id: client_id.into(),
            client_secret: SecretString::from(client_secret.into()),
            http,
        }
    }

    pub fn from_config(config: &ProviderConfig, http: reqwest::Client) -> Result<Self> {
        let ty = AuthProviderType::Auth0;
        let domain = required_field(ty, "domain", config.domain.as_deref())?;
        let client_id = required_field(ty, "client_id", config.client_id.as_deref())?;
        let client_secret = required_field(ty, "secret_key", config.secret_key_str())?;
        Ok(Self::new(domain, client_id, client_secret, http))
    }

    fn base_url(&self) -> String {
        let domain = self.domain.trim_end_matches('/');
        if domain.starts_with("http://") || domain.starts_with("https://") {
            domain.to_string()
        } else {
            format!("https://{domain}")
        }
    }

    pub fn token_url(&self) -> String {
        format!("{}/oauth/token", self.base_url())
    }

    /// Management API audience requested for the token.
    pub fn audience(&self) -> String {
        format!("{}/api/v2/", self.base_url())
    }
}

#[async_trait::async_trait]
impl TokenProvider for Auth0TokenProvider {
    fn provider_type(&self) -> AuthProviderType {
        AuthProviderType::Auth0
    }

    async fn auth_token(&self) -> Result<String> {
        let url = self.token_url();
        let audience = self.audience();
        let form = [
            ("grant_type", "client_credentials"),
            ("client_id", self.client_id.as_str()),
            ("client_secret", self.client_secret.expose_secret()),
            ("audience", audience.as_str()),
        ];

        tracing::debug!(target: "catalog_auth::auth", provider = "auth0", url = %url, "requesting access token");

        let resp = self.http.post(&url).form(&form).send().await.map_err(|e| {
            CatalogError::TokenExchangeError(format!("Token endpoint request failed: {e}"))
        })?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(CatalogError::TokenExchangeError(format!(
                "Token endpoint returned {status}: {}",
                body_sample(&body)
            )));
        }

        let parsed: AccessTokenResponse = resp.json().await.map_err(|e| {
            CatalogError::TokenExchangeError(format!("Failed to parse token response: {e}"))
        })?;

        parsed
            .access_token
            .filter(|t| !t.is_empty())
            .ok_or_else(|| {
                CatalogError::TokenExchangeError(
                    "Token response did not contain an access_token".to_string(),
                )
            })
    }
}
