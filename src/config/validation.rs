//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (timeouts > 0, limits > 0)
//! - Validate addresses, URLs and local redirect paths
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: GuardConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::net::SocketAddr;

use thiserror::Error;
use url::Url;

use crate::config::schema::GuardConfig;
use crate::security::redirect::get_safe_redirect_path;

/// A single semantic problem found in a configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("{field}: invalid socket address '{value}'")]
    InvalidAddress { field: &'static str, value: String },

    #[error("{field}: must be greater than zero")]
    Zero { field: &'static str },

    #[error("listener.public_scheme: expected 'http' or 'https', got '{0}'")]
    InvalidScheme(String),

    #[error("security.app_base_url: '{0}' is not an absolute http(s) URL")]
    InvalidBaseUrl(String),

    #[error("{field}: '{value}' is not a safe local path")]
    UnsafePath { field: &'static str, value: String },
}

/// Validate a configuration, collecting every problem found.
pub fn validate_config(config: &GuardConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::InvalidAddress {
            field: "listener.bind_address",
            value: config.listener.bind_address.clone(),
        });
    }

    if !matches!(config.listener.public_scheme.as_str(), "http" | "https") {
        errors.push(ValidationError::InvalidScheme(
            config.listener.public_scheme.clone(),
        ));
    }

    if config.timeouts.request_secs == 0 {
        errors.push(ValidationError::Zero { field: "timeouts.request_secs" });
    }

    if config.observability.metrics_enabled
        && config.observability.metrics_address.parse::<SocketAddr>().is_err()
    {
        errors.push(ValidationError::InvalidAddress {
            field: "observability.metrics_address",
            value: config.observability.metrics_address.clone(),
        });
    }

    if let Some(base) = &config.security.app_base_url {
        let ok = Url::parse(base)
            .map(|u| matches!(u.scheme(), "http" | "https") && u.host().is_some())
            .unwrap_or(false);
        if !ok {
            errors.push(ValidationError::InvalidBaseUrl(base.clone()));
        }
    }

    if config.security.max_body_size == 0 {
        errors.push(ValidationError::Zero { field: "security.max_body_size" });
    }

    if config.contact.limit == 0 {
        errors.push(ValidationError::Zero { field: "contact.limit" });
    }
    if config.contact.window_ms == 0 {
        errors.push(ValidationError::Zero { field: "contact.window_ms" });
    }
    if config.contact.max_message_len == 0 {
        errors.push(ValidationError::Zero { field: "contact.max_message_len" });
    }

    for (field, value) in [
        ("auth.default_next", &config.auth.default_next),
        ("auth.login_path", &config.auth.login_path),
    ] {
        // A path is safe iff the sanitizer keeps it.
        if get_safe_redirect_path(Some(value), "") != *value {
            errors.push(ValidationError::UnsafePath {
                field,
                value: value.clone(),
            });
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
