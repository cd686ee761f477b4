//! OAuth callback redirect.

use axum::{
    extract::{Query, State},
    response::{IntoResponse, Redirect, Response},
};
use serde::Deserialize;

use crate::config::AuthConfig;
use crate::http::server::AppState;
use crate::security::redirect::get_safe_redirect_path;

/// Value of the `error` query parameter added to the login path on failure.
pub const CALLBACK_ERROR: &str = "auth_callback";

/// Query string of `GET /auth/callback`.
#[derive(Debug, Default, Deserialize)]
pub struct CallbackParams {
    pub code: Option<String>,
    pub next: Option<String>,
    pub error: Option<String>,
}

/// Where the browser should go after the identity provider returns.
pub fn callback_destination(params: &CallbackParams, config: &AuthConfig) -> String {
    let failed = params.error.is_some() || params.code.as_deref().map_or(true, str::is_empty);
    if failed {
        let separator = if config.login_path.contains('?') { '&' } else { '?' };
        return format!("{}{}error={}", config.login_path, separator, CALLBACK_ERROR);
    }

    get_safe_redirect_path(params.next.as_deref(), &config.default_next)
}

/// `GET /auth/callback?code=..&next=..`
pub async fn oauth_callback(
    State(state): State<AppState>,
    Query(params): Query<CallbackParams>,
) -> Response {
    let live = state.live.load();
    let destination = callback_destination(&params, &live.config.auth);

    if let Some(error) = &params.error {
        tracing::warn!(error = %error, "Identity provider returned an error");
    } else if params.next.is_some() && destination == live.config.auth.default_next {
        tracing::debug!(next = ?params.next, "Replaced unsafe or missing next path");
    }

    Redirect::to(&destination).into_response()
}
