//! Service-account OIDC identity tokens.
//!
//! The provider reads a service-account key file, signs a JWT-bearer
//! assertion asking for an identity token scoped to the configured audience,
//! and exchanges it at the key's token endpoint. Nothing is cached: every
//! call reads the key and requests a fresh token.

use std::fmt;
use std::path::PathBuf;

use jsonwebtoken::{Algorithm, EncodingKey, Header, encode};
use serde::{Deserialize, Serialize};

use super::{ASSERTION_LIFETIME_SECS, AuthProviderType, TokenProvider, body_sample};
use crate::config::{ProviderConfig, required_field};
use crate::error::{CatalogError, Result};

/// Default Google OAuth token endpoint
const DEFAULT_TOKEN_URI: &str = "https://oauth2.googleapis.com/token";
const JWT_BEARER_GRANT: &str = "urn:ietf:params:oauth:grant-type:jwt-bearer";

/// Service-account key file subset (fields required for the JWT flow)
#[derive(Clone, Deserialize)]
pub struct ServiceAccountKey {
    pub client_email: String,
    pub private_key: String,
    #[serde(default)]
    pub private_key_id: Option<String>,
    #[serde(default)]
    pub token_uri: Option<String>,
}

impl ServiceAccountKey {
    /// Parse a service-account key file.
    pub fn from_json(json: &str) -> Result<Self> {
        let key = serde_json::from_str::<Self>(json).map_err(|e| {
            CatalogError::CredentialLoadError(format!("Invalid service account key file: {e}"))
        })?;
        if key.private_key.trim().is_empty() || key.client_email.trim().is_empty() {
            return Err(CatalogError::CredentialLoadError(
                "Service account key file is missing client_email or private_key".to_string(),
            ));
        }
        Ok(key)
    }

    pub fn token_uri(&self) -> &str {
        self.token_uri.as_deref().unwrap_or(DEFAULT_TOKEN_URI)
    }
}

impl fmt::Debug for ServiceAccountKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServiceAccountKey")
            .field("client_email", &self.client_email)
            .field("private_key_id", &self.private_key_id)
            .field("token_uri", &self.token_uri)
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Serialize)]
struct IdTokenClaims<'a> {
    iss: &'a str,
    sub: &'a str,
    aud: &'a str,
    target_audience: &'a str,
    iat: i64,
    exp: i64,
}

#[derive(Debug, Deserialize)]
struct IdTokenResponse {
    #[serde(default)]
    id_token: Option<String>,
}

/// Issues OIDC identity tokens for a service account.
#[derive(Debug, Clone)]
pub struct GoogleTokenProvider {
    key_path: PathBuf,
    audience: String,
    http: reqwest::Client,
}

impl GoogleTokenProvider {
    /// Create a new provider.
    /// - `key_path` points at the service-account JSON key file.
    /// - `audience` is the target audience of the identity token.
    pub fn new(
        key_path: impl Into<PathBuf>,
        audience: impl Into<String>,
        http: reqwest::Client,
    ) -> Self {
        Self {
            key_path: key_path.into(),
            audience: audience.into(),
            http,
        }
    }

    /// Build from configuration: `secret_key` holds the key-file path.
    pub fn from_config(config: &ProviderConfig, http: reqwest::Client) -> Result<Self> {
        let key_path = required_field(
            AuthProviderType::Google,
            "secret_key",
            config.secret_key_str(),
        )?;
        let audience = required_field(
            AuthProviderType::Google,
            "audience",
            Some(config.audience.as_str()),
        )?;
        Ok(Self::new(key_path, audience, http))
    }

    pub fn audience(&self) -> &str {
        &self.audience
    }

    /// Read and parse the key file.
    pub async fn load_key(&self) -> Result<ServiceAccountKey> {
        let content = tokio::fs::read_to_string(&self.key_path).await.map_err(|e| {
            CatalogError::CredentialLoadError(format!(
                "Failed to read service account key file {}: {e}",
                self.key_path.display()
            ))
        })?;
        ServiceAccountKey::from_json(&content)
    }

    /// Sign the assertion presented to the token endpoint.
    pub fn sign_assertion(&self, key: &ServiceAccountKey) -> Result<String> {
        let now = chrono::Utc::now().timestamp();
        let claims = IdTokenClaims {
            iss: &key.client_email,
            sub: &key.client_email,
            aud: key.token_uri(),
            target_audience: &self.audience,
            iat: now,
            exp: now + ASSERTION_LIFETIME_SECS,
        };

        let mut header = Header::new(Algorithm::RS256);
        header.typ = Some("JWT".to_string());
        header.kid = key.private_key_id.clone();
        let encoding_key = EncodingKey::from_rsa_pem(key.private_key.as_bytes()).map_err(|e| {
            CatalogError::CredentialLoadError(format!("Invalid RSA private key (PEM): {e}"))
        })?;
        encode(&header, &claims, &encoding_key).map_err(|e| {
            CatalogError::CredentialLoadError(format!(
                "Failed to sign identity token assertion: {e}"
            ))
        })
    }

    async fn exchange(&self, token_uri: &str, assertion: &str) -> Result<String> {
        let form = [("grant_type", JWT_BEARER_GRANT), ("assertion", assertion)];

        let resp = self
            .http
            .post(token_uri)
            .form(&form)
            .send()
            .await
            .map_err(|e| {
                CatalogError::TokenRefreshError(format!("Token endpoint request failed: {e}"))
            })?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(CatalogError::TokenRefreshError(format!(
                "Token endpoint returned {status}: {}",
                body_sample(&body)
            )));
        }

        let parsed: IdTokenResponse = resp.json().await.map_err(|e| {
            CatalogError::TokenRefreshError(format!("Failed to parse token response: {e}"))
        })?;

        parsed
            .id_token
            .filter(|t| !t.is_empty())
            .ok_or_else(|| {
                CatalogError::TokenRefreshError(
                    "Token response did not contain an id_token".to_string(),
                )
            })
    }
}

#[async_trait::async_trait]
impl TokenProvider for GoogleTokenProvider {
    fn provider_type(&self) -> AuthProviderType {
        AuthProviderType::Google
    }

    async fn auth_token(&self) -> Result<String> {
        let key = self.load_key().await?;
        let assertion = self.sign_assertion(&key)?;
        tracing::debug!(
            target: "catalog_auth::auth",
            provider = "google",
            token_uri = %key.token_uri(),
            audience = %self.audience,
            "requesting identity token"
        );
        self.exchange(key.token_uri(), &assertion).await
    }
}
