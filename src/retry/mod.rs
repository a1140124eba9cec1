//! Retry module
//! - policy.rs: fixed-delay retries driven by `CatalogError::is_retryable`

pub mod policy;

pub use policy::*;
