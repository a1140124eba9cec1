//! # catalog-auth
//!
//! Bearer-token providers and connection testing for a metadata catalog client.
//!
#![deny(unsafe_code)]

//! ## Features
//!
//! - **Pluggable Providers**: no-auth, Google service-account identity tokens,
//!   Okta signed client assertions and Auth0 client credentials behind one
//!   [`TokenProvider`] trait.
//! - **Configuration Driven**: a [`ProviderConfig`] selects and parameterizes the
//!   provider through [`ProviderFactory`].
//! - **REST Boundary**: [`RestClient`] injects the issued token under a
//!   configurable header, re-issues it on `401` and retries transient failures.
//! - **Connection Testing**: [`ConnectionTestRunner`] runs named steps and
//!   short-circuits on the first mandatory failure.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use catalog_auth::{ProviderConfig, RestClient};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = ProviderConfig::new("http://localhost:8585/api")
//!         .with_auth_provider_type("auth0")
//!         .with_client_id("my-client")
//!         .with_secret_key("my-secret")
//!         .with_domain("tenant.auth0.com");
//!
//!     let client = RestClient::from_config(&config)?;
//!     let tables = client.get("tables").await?;
//!     println!("{tables}");
//!     Ok(())
//! }
//! ```
//!
//! ## Connection Tests
//!
//! ```rust,no_run
//! use catalog_auth::{ConnectionTestRunner, TestStep};
//!
//! # async fn demo() {
//! let summary = ConnectionTestRunner::new()
//!     .run(vec![
//!         TestStep::new("CheckAccess", || async { Ok::<(), String>(()) }).mandatory(),
//!         TestStep::new("GetTables", || async { Err::<(), _>("forbidden".to_string()) }),
//!     ])
//!     .await;
//! assert!(summary.success);
//! # }
//! ```

pub mod auth;
pub mod client;
pub mod config;
pub mod connection;
pub mod error;
pub mod observability;
pub mod retry;

pub use auth::{AuthProviderType, ProviderFactory, TokenProvider, create_provider};
pub use client::RestClient;
pub use config::ProviderConfig;
pub use connection::{ConnectionTestRunner, ConnectionTestSummary, TestStatus, TestStep};
pub use error::{CatalogError, Result};
