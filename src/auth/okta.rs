//! Enterprise IdP client credentials with a signed JWT assertion.
//!
//! The client proves its identity with a short-lived RS256 assertion signed
//! by its own private key instead of a shared secret, then exchanges it for
//! an access token at the organization's token endpoint. The assertion and
//! the request are rebuilt on every call; nothing is cached between calls.

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use jsonwebtoken::{Algorithm, EncodingKey, Header, encode};
use rsa::pkcs1::{EncodeRsaPrivateKey, LineEnding};
use rsa::{BigUint, RsaPrivateKey};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};

use super::{ASSERTION_LIFETIME_SECS, AuthProviderType, TokenProvider, body_sample};
use crate::config::{ProviderConfig, required_field};
use crate::error::{CatalogError, Result};
use crate::observability::mask_sensitive_value;

pub const CLIENT_ASSERTION_TYPE: &str = "urn:ietf:params:oauth:client-assertion-type:jwt-bearer";
const CLIENT_CREDENTIALS_GRANT: &str = "client_credentials";

/// Claims of the client assertion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientAssertionClaims {
    pub sub: String,
    pub iss: String,
    pub aud: String,
    pub iat: i64,
    pub exp: i64,
    /// Unique per assertion
    pub jti: String,
}

/// A signed assertion together with the claims it carries.
#[derive(Debug, Clone)]
pub struct SignedAssertion {
    pub token: String,
    pub claims: ClientAssertionClaims,
}

#[derive(Debug, Deserialize)]
struct AccessTokenResponse {
    #[serde(default)]
    access_token: Option<String>,
}

/// Okta-style JWT-bearer client-credentials provider.
#[derive(Debug, Clone)]
pub struct OktaTokenProvider {
    client_id: String,
    org_url: String,
    private_key: SecretString,
    scopes: Vec<String>,
    http: reqwest::Client,
}

impl OktaTokenProvider {
    /// Create a new provider.
    /// - `org_url` is the token endpoint and the assertion audience.
    /// - `private_key` is PEM text or a path to a PEM file.
    pub fn new(
        client_id: impl Into<String>,
        org_url: impl Into<String>,
        private_key: impl Into<String>,
        scopes: Vec<String>,
        http: reqwest::Client,
    ) -> Self {
        Self {
            client_id: client_id.into(),
            org_url: org_url.into(),
            private_key: SecretString::from(private_key.into()),
            scopes,
            http,
        }
    }

    pub fn from_config(config: &ProviderConfig, http: reqwest::Client) -> Result<Self> {
        let ty = AuthProviderType::Okta;
        let client_id = required_field(ty, "client_id", config.client_id.as_deref())?;
        let org_url = required_field(ty, "org_url", config.org_url.as_deref())?;
        let private_key = required_field(ty, "private_key", config.private_key_str())?;
        if config.scopes.iter().all(|s| s.trim().is_empty()) {
            return Err(CatalogError::ConfigurationError(format!(
                "at least one entry in `scopes` is required for the {ty} auth provider"
            )));
        }
        Ok(Self::new(
            client_id,
            org_url,
            private_key,
            config.scopes.clone(),
            http,
        ))
    }

    /// Space-joined scopes sent with the exchange.
    pub fn scope_string(&self) -> String {
        self.scopes
            .iter()
            .map(|s| s.trim())
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Resolve the configured key to PEM or JWK text.
    ///
    /// Inline PEM and JWK values are used as-is. Anything else is read as a
    /// file when it names one; otherwise it goes to the signer and fails there.
    async fn load_private_key(&self) -> Result<String> {
        let value = self.private_key.expose_secret().trim();
        if value.contains("-----BEGIN") || value.starts_with('{') {
            return Ok(value.to_string());
        }
        match tokio::fs::try_exists(value).await {
            Ok(true) => tokio::fs::read_to_string(value).await.map_err(|e| {
                CatalogError::CredentialLoadError(format!("Failed to read private key file: {e}"))
            }),
            Err(e) if e.kind() == std::io::ErrorKind::PermissionDenied => {
                Err(CatalogError::CredentialLoadError(format!(
                    "Failed to access private key file: {e}"
                )))
            }
            // not a usable path (absent, too long, invalid)
            _ => Ok(value.to_string()),
        }
    }

    /// Sign a fresh assertion with an RSA key given as PEM or as a JWK object.
    pub fn sign_assertion(&self, key: &str) -> Result<SignedAssertion> {
        let issued_at = chrono::Utc::now().timestamp();
        let claims = ClientAssertionClaims {
            sub: self.client_id.clone(),
            iss: self.client_id.clone(),
            aud: self.org_url.clone(),
            iat: issued_at,
            exp: issued_at + ASSERTION_LIFETIME_SECS,
            jti: uuid::Uuid::new_v4().to_string(),
        };

        let encoding_key = encoding_key(key)?;
        let token = encode(&Header::new(Algorithm::RS256), &claims, &encoding_key)
            .map_err(|e| CatalogError::SigningError(format!("Failed to sign JWT: {e}")))?;

        Ok(SignedAssertion { token, claims })
    }

    /// Load the configured key and sign a fresh assertion.
    pub async fn build_assertion(&self) -> Result<SignedAssertion> {
        let pem = self.load_private_key().await?;
        self.sign_assertion(&pem)
    }

    async fn exchange(&self, assertion: &str) -> Result<String> {
        let scope = self.scope_string();
        let form = [
            ("grant_type", CLIENT_CREDENTIALS_GRANT),
            ("scope", scope.as_str()),
            ("client_assertion_type", CLIENT_ASSERTION_TYPE),
            ("client_assertion", assertion),
        ];

        let resp = self
            .http
            .post(&self.org_url)
            .header(reqwest::header::ACCEPT, "application/json")
            .form(&form)
            .send()
            .await
            .map_err(|e| {
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

#[async_trait::async_trait]
impl TokenProvider for OktaTokenProvider {
    fn provider_type(&self) -> AuthProviderType {
        AuthProviderType::Okta
    }

    async fn auth_token(&self) -> Result<String> {
        let assertion = self.build_assertion().await?;
        tracing::debug!(
            target: "catalog_auth::auth",
            provider = "okta",
            org_url = %self.org_url,
            jti = %assertion.claims.jti,
            "exchanging client assertion"
        );
        let token = self.exchange(&assertion.token).await?;
        tracing::trace!(
            target: "catalog_auth::auth",
            provider = "okta",
            token = %mask_sensitive_value(&token),
            "access token issued"
        );
        Ok(token)
    }
}

/// RSA private key in JSON Web Key form.
#[derive(Deserialize)]
struct RsaPrivateJwk {
    kty: String,
    n: String,
    e: String,
    d: String,
    #[serde(default)]
    p: Option<String>,
    #[serde(default)]
    q: Option<String>,
}

fn encoding_key(key: &str) -> Result<EncodingKey> {
    let key = key.trim();
    if key.starts_with('{') {
        let pem = jwk_to_pem(key)?;
        return EncodingKey::from_rsa_pem(pem.as_bytes()).map_err(|e| {
            CatalogError::SigningError(format!("Invalid RSA private key (JWK): {e}"))
        });
    }
    EncodingKey::from_rsa_pem(key.as_bytes())
        .map_err(|e| CatalogError::SigningError(format!("Invalid RSA private key (PEM): {e}")))
}

/// Rebuild a PKCS#1 PEM document from an RSA JWK.
fn jwk_to_pem(json: &str) -> Result<String> {
    let jwk: RsaPrivateJwk = serde_json::from_str(json)
        .map_err(|e| CatalogError::SigningError(format!("Invalid JWK private key: {e}")))?;
    if jwk.kty != "RSA" {
        return Err(CatalogError::SigningError(format!(
            "Unsupported JWK key type '{}', expected RSA",
            jwk.kty
        )));
    }
    let (Some(p), Some(q)) = (jwk.p.as_deref(), jwk.q.as_deref()) else {
        return Err(CatalogError::SigningError(
            "JWK private key must include the primes `p` and `q`".to_string(),
        ));
    };

    let key = RsaPrivateKey::from_components(
        jwk_component("n", &jwk.n)?,
        jwk_component("e", &jwk.e)?,
        jwk_component("d", &jwk.d)?,
        vec![jwk_component("p", p)?, jwk_component("q", q)?],
    )
    .map_err(|e| CatalogError::SigningError(format!("Inconsistent JWK private key: {e}")))?;

    key.to_pkcs1_pem(LineEnding::LF)
        .map(|pem| pem.as_str().to_owned())
        .map_err(|e| CatalogError::SigningError(format!("Failed to encode JWK private key: {e}")))
}

fn jwk_component(name: &str, value: &str) -> Result<BigUint> {
    let bytes = URL_SAFE_NO_PAD
        .decode(value.trim_end_matches('='))
        .map_err(|e| CatalogError::SigningError(format!("Invalid JWK field `{name}`: {e}")))?;
    Ok(BigUint::from_bytes_be(&bytes))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn provider(scopes: &[&str]) -> OktaTokenProvider {
        OktaTokenProvider::new(
            "client-id",
            "https://org.example.com/oauth2/v1/token",
            "not a key",
            scopes.iter().map(|s| s.to_string()).collect(),
            reqwest::Client::new(),
        )
    }

    #[test]
    fn scopes_are_space_joined() {
        assert_eq!(provider(&["a", " b ", ""]).scope_string(), "a b");
    }

    #[test]
    fn invalid_key_is_a_signing_error() {
        let err = provider(&["a"]).sign_assertion("garbage").unwrap_err();
        assert!(matches!(err, CatalogError::SigningError(_)));
    }

    #[test]
    fn jwk_of_another_key_type_is_a_signing_error() {
        let err = provider(&["a"])
            .sign_assertion(r#"{"kty":"EC","n":"","e":"","d":""}"#)
            .unwrap_err();
        assert!(matches!(err, CatalogError::SigningError(ref m) if m.contains("EC")));
    }

    #[test]
    fn jwk_without_primes_is_a_signing_error() {
        let err = provider(&["a"])
            .sign_assertion(r#"{"kty":"RSA","n":"AQAB","e":"AQAB","d":"AQAB"}"#)
            .unwrap_err();
        assert!(matches!(err, CatalogError::SigningError(_)));
    }

    #[tokio::test]
    async fn inline_garbage_key_fails_at_signing() {
        let err = provider(&["a"]).build_assertion().await.unwrap_err();
        assert!(matches!(err, CatalogError::SigningError(_)));
    }

    #[test]
    fn from_config_requires_scopes() {
        let config = ProviderConfig::new("http://localhost")
            .with_auth_provider_type("okta")
            .with_client_id("id")
            .with_org_url("https://org.example.com/token")
            .with_private_key("pem");
        let err = OktaTokenProvider::from_config(&config, reqwest::Client::new()).unwrap_err();
        assert!(matches!(err, CatalogError::ConfigurationError(ref m) if m.contains("scopes")));
    }

    #[test]
    fn from_config_requires_org_url() {
        let config = ProviderConfig::new("http://localhost")
            .with_client_id("id")
            .with_private_key("pem")
            .with_scopes(["s"]);
        let err = OktaTokenProvider::from_config(&config, reqwest::Client::new()).unwrap_err();
        assert!(matches!(err, CatalogError::ConfigurationError(ref m) if m.contains("org_url")));
    }
}
