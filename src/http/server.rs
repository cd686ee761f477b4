//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router with all handlers
//! - Wire up middleware (tracing, limits, request ID, metrics)
//! - Attach security guards to state-changing routes
//! - Apply configuration reloads to live request state
//! - Serve until the shutdown signal fires

use axum::{
    body::Body,
    extract::MatchedPath,
    http::Request,
    middleware::{self, Next},
    response::Response,
    routing::{get, post},
    Router,
};
use arc_swap::ArcSwap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::net::TcpListener;
use tokio::sync::{broadcast, mpsc};
use tower::ServiceBuilder;
use tower_http::{
    limit::RequestBodyLimitLayer,
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::auth::oauth_callback;
use crate::config::GuardConfig;
use crate::contact::{submit_contact, ContactSink, LogSink};
use crate::http::request::{propagate_request_id_layer, request_id, set_request_id_layer};
use crate::observability::metrics;
use crate::security::origin::{trust_middleware, TrustPolicy};
use crate::security::rate_limit::{
    contact_rate_limit_middleware, Clock, MemoryStore, RateLimiter, SystemClock,
};

/// Configuration plus values derived from it, swapped as one unit on reload.
#[derive(Debug)]
pub struct LiveConfig {
    pub config: GuardConfig,
    pub trust: TrustPolicy,
}

impl LiveConfig {
    pub fn new(config: GuardConfig) -> Self {
        let trust = TrustPolicy::from_config(&config.security);
        Self { config, trust }
    }
}

/// Application state injected into handlers and guards.
#[derive(Clone)]
pub struct AppState {
    pub live: Arc<ArcSwap<LiveConfig>>,
    pub limiter: RateLimiter,
    pub clock: Arc<dyn Clock>,
    pub sink: Arc<dyn ContactSink>,
}

/// HTTP server for the guarded endpoints.
pub struct HttpServer {
    router: Router,
    state: AppState,
}

impl HttpServer {
    /// Create a server that logs contact messages.
    pub fn new(config: GuardConfig) -> Self {
        Self::with_sink(config, Arc::new(LogSink))
    }

    /// Create a server delivering contact messages to `sink`.
    pub fn with_sink(config: GuardConfig, sink: Arc<dyn ContactSink>) -> Self {
        Self::with_parts(config, sink, Arc::new(SystemClock))
    }

    /// Create a server with an explicit sink and clock.
    pub fn with_parts(config: GuardConfig, sink: Arc<dyn ContactSink>, clock: Arc<dyn Clock>) -> Self {
        let limiter = RateLimiter::new(Arc::new(MemoryStore::new()), clock.clone());

        let state = AppState {
            live: Arc::new(ArcSwap::from_pointee(LiveConfig::new(config.clone()))),
            limiter,
            clock,
            sink,
        };

        let router = Self::build_router(&config, state.clone());
        Self { router, state }
    }

    /// Build the Axum router with all middleware layers.
    ///
    /// Timeout and body limit are fixed at startup; reloads only affect
    /// values read through [`AppState::live`].
    #[allow(deprecated)]
    fn build_router(config: &GuardConfig, state: AppState) -> Router {
        // Layers run bottom-up: trust check first, then the rate limit.
        let contact = Router::new()
            .route("/api/contact", post(submit_contact))
            .route_layer(middleware::from_fn_with_state(
                state.clone(),
                contact_rate_limit_middleware,
            ))
            .route_layer(middleware::from_fn_with_state(state.clone(), trust_middleware));

        Router::new()
            .route("/health", get(health))
            .route("/auth/callback", get(oauth_callback))
            .merge(contact)
            .with_state(state)
            .layer(middleware::from_fn(track_metrics))
            .layer(
                ServiceBuilder::new()
                    .layer(set_request_id_layer())
                    .layer(TraceLayer::new_for_http().make_span_with(|request: &Request<Body>| {
                        tracing::info_span!(
                            "request",
                            method = %request.method(),
                            path = %request.uri().path(),
                            request_id = %request_id(request.headers()),
                        )
                    }))
                    .layer(propagate_request_id_layer())
                    // Timeout must sit inside the limit: its inner body needs `Default`.
                    .layer(RequestBodyLimitLayer::new(config.security.max_body_size))
                    .layer(TimeoutLayer::new(Duration::from_secs(config.timeouts.request_secs))),
            )
    }

    /// The router, for driving the service without a listener.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    /// Run the server, accepting connections on the given listener.
    ///
    /// Configurations received on `config_updates` replace the live config.
    /// Returns once `shutdown` fires and in-flight requests finish.
    pub async fn run(
        self,
        listener: TcpListener,
        mut config_updates: mpsc::UnboundedReceiver<GuardConfig>,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        let live = self.state.live.clone();
        tokio::spawn(async move {
            while let Some(new_config) = config_updates.recv().await {
                tracing::info!(
                    contact_limit = new_config.contact.limit,
                    contact_window_ms = new_config.contact.window_ms,
                    "Applying reloaded configuration"
                );
                live.store(Arc::new(LiveConfig::new(new_config)));
                metrics::record_config_reload();
            }
        });

        axum::serve(listener, self.router.into_make_service())
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
                tracing::info!("Shutdown signal received");
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

async fn health() -> &'static str {
    "ok"
}

/// Record request count and latency per matched route.
async fn track_metrics(request: Request<Body>, next: Next) -> Response {
    let start = Instant::now();
    let route = request
        .extensions()
        .get::<MatchedPath>()
        .map(|p| p.as_str().to_string())
        .unwrap_or_else(|| "unmatched".to_string());
    let method = request.method().to_string();

    let response = next.run(request).await;
    metrics::record_request(&method, response.status().as_u16(), &route, start);
    response
}
