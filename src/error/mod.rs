//! Error Handling Module
//!
//! A single error type covers token issuance, the REST boundary and the
//! connection-test runner:
//! - Core error types (`CatalogError`, `ErrorCategory`)
//! - Type conversions from common error types
//!
//! # Example
//!
//! ```rust,ignore
//! use catalog_auth::error::{CatalogError, ErrorCategory};
//!
//! let error = CatalogError::api_error(503, "Service unavailable");
//! assert_eq!(error.category(), ErrorCategory::Server);
//! assert!(error.is_retryable());
//! ```

mod conversions;
pub mod types;

pub use types::*;
