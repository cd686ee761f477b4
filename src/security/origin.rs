//! Origin / Fetch-Site trust check for state-changing requests.
//!
//! Three independent browser signals can veto a request: `Origin`,
//! `Referer` and `Sec-Fetch-Site`. Any one that is present and points off
//! site rejects; absent signals are skipped, so a request carrying none of
//! them is trusted.

use axum::{
    body::Body,
    extract::State,
    http::{header, HeaderMap, Request, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;
use url::{Origin, Url};

use crate::config::SecurityConfig;
use crate::http::server::AppState;
use crate::observability::metrics;
use crate::security::headers::request_url;

pub const SEC_FETCH_SITE: &str = "sec-fetch-site";

/// `Sec-Fetch-Site` values that do not indicate a cross-site request.
const TRUSTED_FETCH_SITES: [&str; 3] = ["same-origin", "same-site", "none"];

/// Why a request was not trusted.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Rejection {
    #[error("origin header '{0}' is not an allowed origin")]
    ForeignOrigin(String),

    #[error("referer header '{0}' is not an allowed origin")]
    ForeignReferer(String),

    #[error("sec-fetch-site is '{0}'")]
    CrossSiteFetch(String),

    #[error("{0} header is present but malformed")]
    MalformedHeader(&'static str),
}

impl Rejection {
    /// Short label for metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            Rejection::ForeignOrigin(_) => "origin",
            Rejection::ForeignReferer(_) => "referer",
            Rejection::CrossSiteFetch(_) => "sec_fetch_site",
            Rejection::MalformedHeader(_) => "malformed",
        }
    }
}

/// Allowed-origin policy for state-changing requests.
#[derive(Debug, Clone, Default)]
pub struct TrustPolicy {
    app_origin: Option<Origin>,
    strict_header_parsing: bool,
}

impl TrustPolicy {
    /// Build a policy. `app_base_url` adds one canonical origin to the
    /// allowed set; an unparseable value is ignored.
    pub fn new(app_base_url: Option<&str>, strict_header_parsing: bool) -> Self {
        let app_origin = app_base_url.and_then(|base| match Url::parse(base) {
            Ok(url) => Some(url.origin()),
            Err(e) => {
                tracing::warn!(base_url = %base, error = %e, "Ignoring unparseable app base URL");
                None
            }
        });

        Self {
            app_origin,
            strict_header_parsing,
        }
    }

    pub fn from_config(config: &SecurityConfig) -> Self {
        Self::new(config.app_base_url.as_deref(), config.strict_header_parsing)
    }

    /// Whether the request originated from a page served by this site.
    ///
    /// `request_url` is the URL the client addressed; `None` when it could
    /// not be reconstructed, in which case only the canonical origin is
    /// allowed.
    pub fn is_trusted_state_changing_request(
        &self,
        request_url: Option<&Url>,
        headers: &HeaderMap,
    ) -> bool {
        self.check(request_url, headers).is_ok()
    }

    /// Same decision as [`Self::is_trusted_state_changing_request`], with the
    /// reason for a rejection.
    pub fn check(&self, request_url: Option<&Url>, headers: &HeaderMap) -> Result<(), Rejection> {
        let allowed: Vec<Origin> = request_url
            .map(Url::origin)
            .into_iter()
            .chain(self.app_origin.clone())
            .collect();

        if let Some(origin) = self.header_origin(headers, header::ORIGIN.as_str(), "origin")? {
            if !allowed.contains(&origin.1) {
                return Err(Rejection::ForeignOrigin(origin.0));
            }
        }

        if let Some(referer) = self.header_origin(headers, header::REFERER.as_str(), "referer")? {
            if !allowed.contains(&referer.1) {
                return Err(Rejection::ForeignReferer(referer.0));
            }
        }

        if let Some(site) = headers.get(SEC_FETCH_SITE) {
            let site = site.to_str().unwrap_or_default();
            if !TRUSTED_FETCH_SITES.contains(&site) {
                return Err(Rejection::CrossSiteFetch(site.to_string()));
            }
        }

        Ok(())
    }

    /// Parse a URL-valued header to its origin.
    ///
    /// Absent → `Ok(None)`. Malformed → `Ok(None)` unless strict parsing is
    /// on, in which case it is a rejection.
    fn header_origin(
        &self,
        headers: &HeaderMap,
        name: &str,
        label: &'static str,
    ) -> Result<Option<(String, Origin)>, Rejection> {
        let Some(value) = headers.get(name) else {
            return Ok(None);
        };

        let parsed = value
            .to_str()
            .ok()
            .and_then(|raw| Url::parse(raw.trim()).ok().map(|url| (raw.to_string(), url.origin())));

        match parsed {
            Some(origin) => Ok(Some(origin)),
            None if self.strict_header_parsing => Err(Rejection::MalformedHeader(label)),
            None => Ok(None),
        }
    }
}

/// Middleware rejecting untrusted state-changing requests with 403.
pub async fn trust_middleware(
    State(state): State<AppState>,
    request: Request<Body>,
    next: Next,
) -> Response {
    let live = state.live.load_full();
    let url = request_url(
        request.uri(),
        request.headers(),
        &live.config.listener.public_scheme,
    );

    match live.trust.check(url.as_ref(), request.headers()) {
        Ok(()) => next.run(request).await,
        Err(rejection) => {
            tracing::warn!(
                path = %request.uri().path(),
                reason = %rejection,
                "Rejected untrusted state-changing request"
            );
            metrics::record_trust_rejected(rejection.kind());
            (
                StatusCode::FORBIDDEN,
                Json(serde_json::json!({ "error": "Forbidden" })),
            )
                .into_response()
        }
    }
}
