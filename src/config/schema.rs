//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the service.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

/// Root configuration for the guard service.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct GuardConfig {
    /// Listener configuration (bind address, public scheme).
    pub listener: ListenerConfig,

    /// Timeout configuration.
    pub timeouts: TimeoutConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,

    /// Request trust settings.
    pub security: SecurityConfig,

    /// Contact form endpoint settings.
    pub contact: ContactConfig,

    /// OAuth callback settings.
    pub auth: AuthConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:8080").
    pub bind_address: String,

    /// Scheme assumed for the request's own URL when no
    /// `X-Forwarded-Proto` header is present.
    pub public_scheme: String,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
            public_scheme: "http".to_string(),
        }
    }
}

/// Timeout configuration.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Request timeout (total time for request/response) in seconds.
    pub request_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self { request_secs: 30 }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Emit JSON log lines instead of the human-readable format.
    pub json_logs: bool,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            json_logs: false,
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}

/// Request trust configuration.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct SecurityConfig {
    /// Canonical public base URL of the site (e.g. "https://example.com").
    /// Its origin is trusted in addition to the request's own origin.
    /// Overridden by the `APP_BASE_URL` environment variable.
    pub app_base_url: Option<String>,

    /// Reject requests whose `Origin` or `Referer` header is present
    /// but cannot be parsed, instead of ignoring the header.
    pub strict_header_parsing: bool,

    /// Maximum body size in bytes.
    pub max_body_size: usize,
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self {
            app_base_url: None,
            strict_header_parsing: false,
            max_body_size: 64 * 1024, // 64KB
        }
    }
}

/// Contact form configuration.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct ContactConfig {
    /// Maximum submissions per client IP per window.
    pub limit: u32,

    /// Window length in milliseconds.
    pub window_ms: u64,

    /// Maximum message length in characters.
    pub max_message_len: usize,
}

impl Default for ContactConfig {
    fn default() -> Self {
        Self {
            limit: 5,
            window_ms: 60_000,
            max_message_len: 5000,
        }
    }
}

/// OAuth callback configuration.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct AuthConfig {
    /// Destination after sign-in when `next` is missing or unsafe.
    pub default_next: String,

    /// Sign-in page used when the callback fails.
    pub login_path: String,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            default_next: "/admin".to_string(),
            login_path: "/login".to_string(),
        }
    }
}
