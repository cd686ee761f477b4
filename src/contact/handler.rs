use axum::{
    extract::{rejection::JsonRejection, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Json,
};

use crate::contact::types::{ContactError, ContactForm};
use crate::http::server::AppState;
use crate::observability::metrics;
use crate::security::headers::client_ip;

/// `POST /api/contact`. Trust check and rate limiting run as route layers
/// before this handler.
pub async fn submit_contact(
    State(state): State<AppState>,
    headers: HeaderMap,
    payload: Result<Json<ContactForm>, JsonRejection>,
) -> Response {
    let Json(form) = match payload {
        Ok(form) => form,
        Err(rejection) => {
            tracing::debug!(error = %rejection, "Malformed contact payload");
            return ContactError::Invalid("Invalid request body".to_string()).into_response();
        }
    };

    let max_len = state.live.load().config.contact.max_message_len;
    let message = match form.validate(max_len, client_ip(&headers), state.clock.now_ms()) {
        Ok(m) => m,
        Err(e) => {
            tracing::debug!(error = %e, "Contact submission rejected");
            return e.into_response();
        }
    };

    if let Err(e) = state.sink.deliver(&message) {
        tracing::error!(error = %e, client = %message.client_ip, "Failed to deliver contact message");
        return e.into_response();
    }

    metrics::record_contact_accepted();
    (StatusCode::OK, Json(serde_json::json!({ "success": true }))).into_response()
}
