//! Core error types.

use thiserror::Error;

/// Crate-wide result alias.
pub type Result<T> = std::result::Result<T, CatalogError>;

/// Coarse classification used for logging and retry decisions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// Missing or invalid configuration, unsupported provider type
    Configuration,
    /// Bad key material or signing failure
    Credential,
    /// Identity provider rejected or failed a token request
    TokenIssuance,
    /// Transport level failure (connect, timeout)
    Network,
    /// The catalog rejected the issued credentials
    Authentication,
    /// 5xx and throttling responses
    Server,
    /// Other 4xx responses
    Client,
    /// Response bodies that could not be decoded
    Parsing,
    /// Failure inside a connection-test step
    ConnectionTest,
    Internal,
}

/// Errors produced by token providers, the REST client and the test runner.
#[derive(Error, Debug, Clone)]
pub enum CatalogError {
    /// Missing or invalid field for the selected provider. Surfaced before any network call.
    #[error("Configuration error: {0}")]
    ConfigurationError(String),

    /// Key material is missing, unreadable or malformed.
    #[error("Credential load error: {0}")]
    CredentialLoadError(String),

    /// A JWT assertion could not be signed with the configured key.
    #[error("Signing error: {0}")]
    SigningError(String),

    /// OAuth2 token exchange failed or returned no access token.
    #[error("Token exchange error: {0}")]
    TokenExchangeError(String),

    /// The identity backend refused to issue a fresh identity token.
    #[error("Token refresh error: {0}")]
    TokenRefreshError(String),

    /// `auth_provider_type` does not name a known provider.
    #[error("Unsupported auth provider type: {0}")]
    UnsupportedProvider(String),

    /// A connection-test step failed.
    #[error("Test step '{step}' failed: {message}")]
    StepExecution { step: String, message: String },

    /// Transport failure talking to the catalog.
    #[error("HTTP error: {0}")]
    HttpError(String),

    #[error("Timeout: {0}")]
    TimeoutError(String),

    /// The catalog rejected the issued token even after re-issuing it.
    #[error("Authentication failed: {0}")]
    AuthenticationError(String),

    /// Non-success response from the catalog.
    #[error("API error {code}: {message}")]
    ApiError {
        code: u16,
        message: String,
        details: Option<serde_json::Value>,
    },

    #[error("JSON error: {0}")]
    JsonError(String),

    #[error("Internal error: {0}")]
    InternalError(String),
}

impl CatalogError {
    /// Build an `ApiError` without details.
    pub fn api_error(code: u16, message: impl Into<String>) -> Self {
        Self::ApiError {
            code,
            message: message.into(),
            details: None,
        }
    }

    /// Build an `ApiError` carrying the decoded response body.
    pub fn api_error_with_details(
        code: u16,
        message: impl Into<String>,
        details: serde_json::Value,
    ) -> Self {
        Self::ApiError {
            code,
            message: message.into(),
            details: Some(details),
        }
    }

    /// HTTP status associated with the error, when there is one.
    pub fn status_code(&self) -> Option<u16> {
        match self {
            Self::ApiError { code, .. } => Some(*code),
            Self::AuthenticationError(_) => Some(401),
            _ => None,
        }
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::ConfigurationError(_) | Self::UnsupportedProvider(_) => {
                ErrorCategory::Configuration
            }
            Self::CredentialLoadError(_) | Self::SigningError(_) => ErrorCategory::Credential,
            Self::TokenExchangeError(_) | Self::TokenRefreshError(_) => {
                ErrorCategory::TokenIssuance
            }
            Self::StepExecution { .. } => ErrorCategory::ConnectionTest,
            Self::HttpError(_) | Self::TimeoutError(_) => ErrorCategory::Network,
            Self::AuthenticationError(_) => ErrorCategory::Authentication,
            Self::ApiError { code, .. } => {
                if *code == 429 || *code >= 500 {
                    ErrorCategory::Server
                } else {
                    ErrorCategory::Client
                }
            }
            Self::JsonError(_) => ErrorCategory::Parsing,
            Self::InternalError(_) => ErrorCategory::Internal,
        }
    }

    /// Whether the caller's retry policy may try the operation again.
    ///
    /// Token issuance failures are retryable: providers never retry internally.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self.category(),
            ErrorCategory::TokenIssuance | ErrorCategory::Network | ErrorCategory::Server
        )
    }

    /// Whether the error was raised while issuing a token.
    pub fn is_token_error(&self) -> bool {
        matches!(
            self,
            Self::CredentialLoadError(_)
                | Self::SigningError(_)
                | Self::TokenExchangeError(_)
                | Self::TokenRefreshError(_)
        )
    }
}
