//! Sign-in flow glue.
//!
//! The identity provider issues the session; this service only decides
//! where the browser lands afterwards.

pub mod callback;

pub use callback::{oauth_callback, CallbackParams, CALLBACK_ERROR};
