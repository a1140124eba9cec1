//! HTTP Headers Utility
//!
//! Builds the headers of catalog requests, including the configurable auth
//! header that carries the issued token.

use reqwest::header::{ACCEPT, CONTENT_TYPE, HeaderMap, HeaderName, HeaderValue, USER_AGENT};

use crate::error::CatalogError;

pub const DEFAULT_USER_AGENT: &str = concat!("catalog-auth/", env!("CARGO_PKG_VERSION"));

/// HTTP header builder for catalog requests
#[derive(Debug, Default)]
pub struct HttpHeaderBuilder {
    headers: HeaderMap,
}

impl HttpHeaderBuilder {
    /// Create a new header builder
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach the issued token under `header_name`.
    pub fn with_auth_token(mut self, header_name: &str, token: &str) -> Result<Self, CatalogError> {
        let header_name = HeaderName::from_bytes(header_name.as_bytes()).map_err(|e| {
            CatalogError::ConfigurationError(format!("Invalid header name '{header_name}': {e}"))
        })?;
        let mut value = HeaderValue::from_str(token).map_err(|e| {
            CatalogError::TokenExchangeError(format!("Issued token is not a valid header value: {e}"))
        })?;
        value.set_sensitive(true);
        self.headers.insert(header_name, value);
        Ok(self)
    }

    /// Add JSON content type and accept headers
    pub fn with_json_content_type(mut self) -> Self {
        self.headers
            .insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        self.headers
            .insert(ACCEPT, HeaderValue::from_static("application/json"));
        self
    }

    /// Add user agent
    pub fn with_user_agent(mut self, user_agent: &str) -> Result<Self, CatalogError> {
        self.headers.insert(
            USER_AGENT,
            HeaderValue::from_str(user_agent).map_err(|e| {
                CatalogError::ConfigurationError(format!("Invalid user agent: {e}"))
            })?,
        );
        Ok(self)
    }

    /// Build the final HeaderMap
    pub fn build(self) -> HeaderMap {
        self.headers
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn auth_token_lands_under_custom_header() {
        let headers = HttpHeaderBuilder::new()
            .with_auth_token("X-Catalog-Source", "abc123")
            .unwrap()
            .with_json_content_type()
            .build();
        assert_eq!(headers.get("x-catalog-source").unwrap(), "abc123");
        assert!(headers.get("x-catalog-source").unwrap().is_sensitive());
        assert_eq!(headers.get(CONTENT_TYPE).unwrap(), "application/json");
    }

    #[test]
    fn invalid_header_name_is_configuration_error() {
        let err = HttpHeaderBuilder::new()
            .with_auth_token("bad header", "abc")
            .unwrap_err();
        assert!(matches!(err, CatalogError::ConfigurationError(_)));
    }

    #[test]
    fn token_with_newline_is_rejected() {
        let err = HttpHeaderBuilder::new()
            .with_auth_token("Authorization", "abc\ndef")
            .unwrap_err();
        assert!(matches!(err, CatalogError::TokenExchangeError(_)));
    }
}
