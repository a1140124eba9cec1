//! Authentication helpers and token providers.
//!
//! Every identity backend is exposed through the same [`TokenProvider`]
//! capability, so the REST client never branches on the provider in use.
//! The trait is asynchronous for all variants, including those that could
//! answer immediately; synchronous callers go through [`auth_token_blocking`].

use std::fmt;
use std::str::FromStr;

use crate::error::{CatalogError, Result};

pub mod auth0;
pub mod factory;
pub mod google;
pub mod no_auth;
pub mod okta;

pub use auth0::Auth0TokenProvider;
pub use factory::{ProviderFactory, create_provider};
pub use google::GoogleTokenProvider;
pub use no_auth::NoAuthTokenProvider;
pub use okta::OktaTokenProvider;

/// Assertion lifetime for signed JWTs (seconds).
pub(crate) const ASSERTION_LIFETIME_SECS: i64 = 3600;

/// Truncate an IdP response body for error messages.
pub(crate) fn body_sample(body: &str) -> String {
    body.chars().take(200).collect()
}

/// Identity backends a [`ProviderConfig`](crate::config::ProviderConfig) can select.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AuthProviderType {
    /// Anonymous access
    NoAuth,
    /// Service-account OIDC identity token
    Google,
    /// Enterprise IdP client credentials with a signed JWT assertion
    Okta,
    /// OAuth2 client credentials against a tenant domain
    Auth0,
}

impl AuthProviderType {
    pub const ALL: [AuthProviderType; 4] = [Self::NoAuth, Self::Google, Self::Okta, Self::Auth0];

    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::NoAuth => "no-auth",
            Self::Google => "google",
            Self::Okta => "okta",
            Self::Auth0 => "auth0",
        }
    }
}

impl fmt::Display for AuthProviderType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AuthProviderType {
    type Err = CatalogError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "no-auth" | "noauth" | "no_auth" => Ok(Self::NoAuth),
            "google" => Ok(Self::Google),
            "okta" => Ok(Self::Okta),
            "auth0" => Ok(Self::Auth0),
            _ => Err(CatalogError::UnsupportedProvider(s.to_string())),
        }
    }
}

/// Issues bearer tokens on demand.
///
/// Implementations hold no mutable state across calls: each call re-derives
/// or re-exchanges a token, so one instance can serve concurrent requests.
#[async_trait::async_trait]
pub trait TokenProvider: Send + Sync {
    /// The backend this provider talks to.
    fn provider_type(&self) -> AuthProviderType;

    /// Returns a token suitable for the configured auth header.
    async fn auth_token(&self) -> Result<String>;
}

/// Issue a token from synchronous code by driving the provider on a private
/// current-thread runtime.
///
/// Returns `InternalError` when called from inside an async runtime, where
/// blocking on a nested runtime would panic.
pub fn auth_token_blocking(provider: &dyn TokenProvider) -> Result<String> {
    if tokio::runtime::Handle::try_current().is_ok() {
        return Err(CatalogError::InternalError(
            "auth_token_blocking cannot be called from within an async runtime; await auth_token() instead"
                .to_string(),
        ));
    }
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(|e| CatalogError::InternalError(format!("Failed to start runtime: {e}")))?;
    runtime.block_on(provider.auth_token())
}

static_assertions::assert_impl_all!(NoAuthTokenProvider: Send, Sync);
static_assertions::assert_impl_all!(GoogleTokenProvider: Send, Sync);
static_assertions::assert_impl_all!(OktaTokenProvider: Send, Sync);
static_assertions::assert_impl_all!(Auth0TokenProvider: Send, Sync);
