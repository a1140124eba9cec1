//! Logging setup and log hygiene helpers.
//!
//! The library only emits `tracing` events; binaries and tests decide where
//! they go. [`init_logging`] installs a `tracing-subscriber` formatter for
//! callers that do not bring their own.

use std::sync::atomic::{AtomicBool, Ordering};

use tracing_subscriber::EnvFilter;

use crate::error::{CatalogError, Result};

/// Log output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

/// Logging configuration.
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    /// Default filter directive, overridden by `RUST_LOG` when set
    pub level: String,
    pub format: OutputFormat,
    /// Include the event target (`catalog_auth::client`, ...) in output
    pub with_target: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: OutputFormat::Text,
            with_target: true,
        }
    }
}

impl LoggingConfig {
    pub fn with_level<S: Into<String>>(mut self, level: S) -> Self {
        self.level = level.into();
        self
    }

    pub const fn with_format(mut self, format: OutputFormat) -> Self {
        self.format = format;
        self
    }

    pub const fn with_target(mut self, with_target: bool) -> Self {
        self.with_target = with_target;
        self
    }
}

/// Install a global fmt subscriber.
///
/// Returns an error for an invalid filter directive. A second call, or a call
/// after another subscriber was installed, is a no-op.
pub fn init_logging(config: &LoggingConfig) -> Result<()> {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(&config.level).map_err(|e| {
            CatalogError::ConfigurationError(format!(
                "Invalid log filter '{}': {e}",
                config.level
            ))
        })?,
    };

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(config.with_target);

    let installed = match config.format {
        OutputFormat::Text => builder.try_init(),
        OutputFormat::Json => builder.json().try_init(),
    };

    if installed.is_err() {
        tracing::debug!("global subscriber already installed; keeping it");
    }
    Ok(())
}

static MASK_SENSITIVE_VALUES: AtomicBool = AtomicBool::new(true);

pub fn set_mask_sensitive_values(mask: bool) {
    MASK_SENSITIVE_VALUES.store(mask, Ordering::Relaxed);
}

pub fn get_mask_sensitive_values() -> bool {
    MASK_SENSITIVE_VALUES.load(Ordering::Relaxed)
}

/// Shorten a token for logging, keeping a few leading and trailing characters.
pub fn mask_sensitive_value(value: &str) -> String {
    if !get_mask_sensitive_values() {
        return value.to_string();
    }
    let chars: Vec<char> = value.chars().collect();
    if let Some(token) = value.strip_prefix("Bearer ") {
        return format!("Bearer {}", mask_sensitive_value(token));
    }
    if chars.len() > 16 {
        let head: String = chars[..6].iter().collect();
        let tail: String = chars[chars.len() - 4..].iter().collect();
        format!("{head}...{tail}")
    } else if chars.len() > 8 {
        let head: String = chars[..2].iter().collect();
        format!("{head}...")
    } else {
        "***".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn long_tokens_keep_head_and_tail() {
        assert_eq!(
            mask_sensitive_value("eyJhbGciOiJSUzI1NiJ9.payload.sig"),
            "eyJhbG....sig"
        );
    }

    #[test]
    fn short_tokens_are_hidden() {
        assert_eq!(mask_sensitive_value("abc123"), "***");
        assert_eq!(mask_sensitive_value("abcdefghij"), "ab...");
    }

    #[test]
    fn bearer_prefix_is_preserved() {
        assert_eq!(mask_sensitive_value("Bearer abc"), "Bearer ***");
    }

    #[test]
    fn init_logging_is_idempotent() {
        let config = LoggingConfig::default().with_level("debug");
        assert!(init_logging(&config).is_ok());
        assert!(init_logging(&config.with_format(OutputFormat::Json)).is_ok());
    }
}
