//! Security subsystem.
//!
//! # Data Flow
//! ```text
//! State-changing request (POST /api/contact):
//!     → origin.rs (Origin / Referer / Sec-Fetch-Site trust check) → 403
//!     → headers.rs (client IP from forwarding headers)
//!     → rate_limit.rs (fixed window per "contact:<ip>") → 429
//!     → Pass to handler
//!
//! OAuth callback:
//!     → redirect.rs (sanitize `next` before redirecting)
//! ```
//!
//! # Design Decisions
//! - Defense in depth: any one trust signal can veto a request
//! - Missing signals are skipped so non-browser clients still work
//! - Guards are synchronous and never error; handlers map outcomes to status codes

pub mod headers;
pub mod origin;
pub mod rate_limit;
pub mod redirect;

pub use headers::client_ip;
pub use origin::{Rejection, TrustPolicy};
pub use rate_limit::{
    Clock, ManualClock, MemoryStore, RateLimitBucket, RateLimitOptions, RateLimitResult,
    RateLimitStore, RateLimiter, SystemClock,
};
pub use redirect::{get_safe_redirect_path, DEFAULT_REDIRECT};
