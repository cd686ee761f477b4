//! Request guards and HTTP entry points for a personal portfolio site.
//!
//! Hosts the contact-form endpoint (origin trust check, per-IP fixed-window
//! rate limit, validation, delivery) and the OAuth callback redirect (open
//! redirect protection).

pub mod auth;
pub mod config;
pub mod contact;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod security;

pub use config::GuardConfig;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
