//! Contact form pipeline.
//!
//! # Data Flow
//! ```text
//! POST /api/contact (already past trust check and rate limit)
//!     → types.rs (deserialize + validate ContactForm)
//!     → sink.rs (hand the accepted message to persistence / notification)
//! ```
//!
//! Persistence and email delivery belong to external services; a
//! [`ContactSink`] is the seam where they plug in.

pub mod handler;
pub mod sink;
pub mod types;

pub use handler::submit_contact;
pub use sink::{ContactSink, LogSink, MemoryInbox};
pub use types::{ContactError, ContactForm, ContactMessage};
