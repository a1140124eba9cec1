//! Catalog Client Configuration
//!
//! `ProviderConfig` describes the catalog endpoint, the retry policy of the
//! REST boundary and which token provider issues credentials for it. It is
//! built once from external configuration (usually a JSON document) and is
//! treated as immutable afterwards.

use std::path::Path;

use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};

use crate::auth::AuthProviderType;
use crate::error::{CatalogError, Result};

pub const DEFAULT_API_VERSION: &str = "v1";
pub const DEFAULT_RETRY_COUNT: u32 = 3;
pub const DEFAULT_RETRY_WAIT_SECONDS: u64 = 3;
/// Target audience requested for service-account identity tokens.
pub const DEFAULT_AUDIENCE: &str = "https://www.googleapis.com/oauth2/v4/token";
pub const DEFAULT_AUTH_HEADER: &str = "X-Catalog-Source";

/// Catalog client configuration.
///
/// Secrets are held in [`SecretString`] so that `Debug` output never leaks them.
///
/// # Example
/// ```rust,ignore
/// use catalog_auth::config::ProviderConfig;
///
/// let config = ProviderConfig::new("https://catalog.example.com/api")
///     .with_auth_provider_type("auth0")
///     .with_domain("tenant.auth0.com")
///     .with_client_id("client")
///     .with_secret_key("secret");
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    /// Catalog API root, e.g. `http://localhost:8585/api`
    pub api_endpoint: String,

    #[serde(default = "default_api_version")]
    pub api_version: String,

    /// Number of retries for transient failures (total attempts = retries + 1)
    #[serde(rename = "retry", default = "default_retry_count")]
    pub retry_count: u32,

    /// Fixed delay between retries
    #[serde(rename = "retry_wait", default = "default_retry_wait")]
    pub retry_wait_seconds: u64,

    /// Provider discriminator (`no-auth`, `google`, `okta`, `auth0`). Absent means `no-auth`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auth_provider_type: Option<String>,

    /// Google: path to the service-account key file. Auth0: client secret.
    #[serde(
        default,
        with = "secret_string_opt",
        skip_serializing_if = "Option::is_none"
    )]
    pub secret_key: Option<SecretString>,

    /// Okta token endpoint; also the `aud` of the client assertion
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub org_url: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_id: Option<String>,

    /// Okta: PEM encoded private key, or a path to a PEM file
    #[serde(
        default,
        with = "secret_string_opt",
        skip_serializing_if = "Option::is_none"
    )]
    pub private_key: Option<SecretString>,

    /// Auth0 tenant domain
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub domain: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,

    #[serde(default = "default_audience")]
    pub audience: String,

    /// Name of the header carrying the issued token
    #[serde(rename = "auth_header", default = "default_auth_header")]
    pub auth_header_name: String,

    #[serde(default)]
    pub scopes: Vec<String>,
}

fn default_api_version() -> String {
    DEFAULT_API_VERSION.to_string()
}

fn default_retry_count() -> u32 {
    DEFAULT_RETRY_COUNT
}

fn default_retry_wait() -> u64 {
    DEFAULT_RETRY_WAIT_SECONDS
}

fn default_audience() -> String {
    DEFAULT_AUDIENCE.to_string()
}

fn default_auth_header() -> String {
    DEFAULT_AUTH_HEADER.to_string()
}

impl ProviderConfig {
    /// Create a configuration for the given API endpoint with default settings
    /// and no authentication.
    pub fn new<S: Into<String>>(api_endpoint: S) -> Self {
        Self {
            api_endpoint: api_endpoint.into(),
            api_version: default_api_version(),
            retry_count: DEFAULT_RETRY_COUNT,
            retry_wait_seconds: DEFAULT_RETRY_WAIT_SECONDS,
            auth_provider_type: None,
            secret_key: None,
            org_url: None,
            client_id: None,
            private_key: None,
            domain: None,
            email: None,
            audience: default_audience(),
            auth_header_name: default_auth_header(),
            scopes: Vec::new(),
        }
    }

    /// Parse a configuration from a JSON document.
    pub fn from_json_str(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| {
            CatalogError::ConfigurationError(format!("Invalid catalog configuration: {e}"))
        })
    }

    /// Load a configuration from a JSON file.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            CatalogError::ConfigurationError(format!(
                "Failed to read configuration file {}: {e}",
                path.display()
            ))
        })?;
        Self::from_json_str(&content)
    }

    /// Serialize the configuration, secrets included.
    pub fn to_json_string(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn with_api_version<S: Into<String>>(mut self, version: S) -> Self {
        self.api_version = version.into();
        self
    }

    /// Set the retry count and the fixed wait between retries.
    pub const fn with_retry(mut self, retry_count: u32, retry_wait_seconds: u64) -> Self {
        self.retry_count = retry_count;
        self.retry_wait_seconds = retry_wait_seconds;
        self
    }

    pub fn with_auth_provider_type<S: Into<String>>(mut self, provider_type: S) -> Self {
        self.auth_provider_type = Some(provider_type.into());
        self
    }

    pub fn with_secret_key<S: Into<String>>(mut self, secret_key: S) -> Self {
        self.secret_key = Some(SecretString::from(secret_key.into()));
        self
    }

    pub fn with_org_url<S: Into<String>>(mut self, org_url: S) -> Self {
        self.org_url = Some(org_url.into());
        self
    }

    pub fn with_client_id<S: Into<String>>(mut self, client_id: S) -> Self {
        self.client_id = Some(client_id.into());
        self
    }

    pub fn with_private_key<S: Into<String>>(mut self, private_key: S) -> Self {
        self.private_key = Some(SecretString::from(private_key.into()));
        self
    }

    pub fn with_domain<S: Into<String>>(mut self, domain: S) -> Self {
        self.domain = Some(domain.into());
        self
    }

    pub fn with_email<S: Into<String>>(mut self, email: S) -> Self {
        self.email = Some(email.into());
        self
    }

    pub fn with_audience<S: Into<String>>(mut self, audience: S) -> Self {
        self.audience = audience.into();
        self
    }

    pub fn with_auth_header<S: Into<String>>(mut self, header_name: S) -> Self {
        self.auth_header_name = header_name.into();
        self
    }

    pub fn with_scopes<I, S>(mut self, scopes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.scopes = scopes.into_iter().map(Into::into).collect();
        self
    }

    /// Resolve the provider discriminator. An absent value selects `no-auth`.
    pub fn provider_type(&self) -> Result<AuthProviderType> {
        match self.auth_provider_type.as_deref().map(str::trim) {
            None | Some("") => Ok(AuthProviderType::NoAuth),
            Some(value) => value.parse(),
        }
    }

    /// `<api_endpoint>/<api_version>`
    pub fn base_url(&self) -> String {
        format!(
            "{}/{}",
            self.api_endpoint.trim_end_matches('/'),
            self.api_version.trim_matches('/')
        )
    }

    /// Validate the settings shared by every provider.
    ///
    /// Provider-specific fields are checked when the provider is constructed.
    pub fn validate(&self) -> Result<()> {
        if self.api_endpoint.trim().is_empty() {
            return Err(CatalogError::ConfigurationError(
                "api_endpoint cannot be empty".to_string(),
            ));
        }

        if !self.api_endpoint.starts_with("http://") && !self.api_endpoint.starts_with("https://")
        {
            return Err(CatalogError::ConfigurationError(
                "api_endpoint must start with http:// or https://".to_string(),
            ));
        }

        if self.api_version.trim().is_empty() {
            return Err(CatalogError::ConfigurationError(
                "api_version cannot be empty".to_string(),
            ));
        }

        reqwest::header::HeaderName::from_bytes(self.auth_header_name.as_bytes()).map_err(
            |e| {
                CatalogError::ConfigurationError(format!(
                    "Invalid auth header name '{}': {e}",
                    self.auth_header_name
                ))
            },
        )?;

        self.provider_type().map(|_| ())
    }

    pub(crate) fn secret_key_str(&self) -> Option<&str> {
        self.secret_key.as_ref().map(|s| s.expose_secret())
    }

    pub(crate) fn private_key_str(&self) -> Option<&str> {
        self.private_key.as_ref().map(|s| s.expose_secret())
    }
}

/// Return the trimmed value of a field the given provider cannot work without.
pub(crate) fn required_field<'a>(
    provider: AuthProviderType,
    field: &str,
    value: Option<&'a str>,
) -> Result<&'a str> {
    match value.map(str::trim) {
        Some(v) if !v.is_empty() => Ok(v),
        _ => Err(CatalogError::ConfigurationError(format!(
            "`{field}` is required for the {provider} auth provider"
        ))),
    }
}

/// serde adapter for optional secrets. Serialization exposes the secret so a
/// configuration survives a round trip.
mod secret_string_opt {
    use secrecy::{ExposeSecret, SecretString};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(value: &Option<SecretString>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match value {
            Some(secret) => serializer.serialize_some(secret.expose_secret()),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<SecretString>, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(Option::<String>::deserialize(deserializer)?.map(SecretString::from))
    }
}
