//! Anonymous access.

use super::{AuthProviderType, TokenProvider};
use crate::error::Result;

/// Sentinel returned when the catalog requires no authentication.
pub const NO_AUTH_TOKEN: &str = "no_token";

/// Returns [`NO_AUTH_TOKEN`] without any I/O.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoAuthTokenProvider;

impl NoAuthTokenProvider {
    pub const fn new() -> Self {
        Self
    }
}

#[async_trait::async_trait]
impl TokenProvider for NoAuthTokenProvider {
    fn provider_type(&self) -> AuthProviderType {
        AuthProviderType::NoAuth
    }

    async fn auth_token(&self) -> Result<String> {
        Ok(NO_AUTH_TOKEN.to_string())
    }
}
