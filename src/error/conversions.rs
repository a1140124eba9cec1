//! Type Conversions for CatalogError
//!
//! From implementations for the error types the REST boundary runs into.
//! Token providers map their failures explicitly instead, so that a transport
//! error during a token exchange surfaces as a token error.

use super::types::CatalogError;

impl From<reqwest::Error> for CatalogError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::TimeoutError(err.to_string())
        } else {
            Self::HttpError(err.to_string())
        }
    }
}

impl From<serde_json::Error> for CatalogError {
    fn from(err: serde_json::Error) -> Self {
        Self::JsonError(err.to_string())
    }
}
