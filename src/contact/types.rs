//! Contact form payload, validated message, and errors.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

const MAX_NAME_LEN: usize = 100;
const MAX_EMAIL_LEN: usize = 254;
const MAX_SUBJECT_LEN: usize = 200;

/// Raw JSON body posted by the contact form.
#[derive(Debug, Clone, Deserialize)]
pub struct ContactForm {
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub subject: Option<String>,
    pub message: String,
}

/// A validated submission ready for delivery.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ContactMessage {
    pub name: String,
    pub email: String,
    pub subject: Option<String>,
    pub message: String,
    pub client_ip: String,
    /// Receipt time (ms since epoch).
    pub received_at: u64,
}

/// Errors from the contact pipeline.
#[derive(Debug, Error)]
pub enum ContactError {
    /// The submission failed validation.
    #[error("{0}")]
    Invalid(String),

    /// The sink could not accept the message.
    #[error("delivery failed: {0}")]
    Delivery(String),
}

impl IntoResponse for ContactError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            ContactError::Invalid(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            ContactError::Delivery(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to send message".to_string(),
            ),
        };
        (status, Json(serde_json::json!({ "error": message }))).into_response()
    }
}

fn invalid(msg: &str) -> ContactError {
    ContactError::Invalid(msg.to_string())
}

fn is_plausible_email(email: &str) -> bool {
    if email.chars().any(char::is_whitespace) {
        return false;
    }
    let mut parts = email.split('@');
    match (parts.next(), parts.next(), parts.next()) {
        (Some(local), Some(domain), None) => {
            !local.is_empty()
                && domain.contains('.')
                && !domain.starts_with('.')
                && !domain.ends_with('.')
        }
        _ => false,
    }
}

impl ContactForm {
    /// Trim and validate the form into a [`ContactMessage`].
    pub fn validate(
        self,
        max_message_len: usize,
        client_ip: String,
        received_at: u64,
    ) -> Result<ContactMessage, ContactError> {
        let name = self.name.trim().to_string();
        let email = self.email.trim().to_string();
        let subject = self
            .subject
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty());
        let message = self.message.trim().to_string();

        if name.is_empty() {
            return Err(invalid("Name is required"));
        }
        if name.chars().count() > MAX_NAME_LEN {
            return Err(invalid("Name is too long"));
        }
        if email.is_empty() {
            return Err(invalid("Email is required"));
        }
        if email.chars().count() > MAX_EMAIL_LEN || !is_plausible_email(&email) {
            return Err(invalid("Email is invalid"));
        }
        if subject
            .as_ref()
            .is_some_and(|s| s.chars().count() > MAX_SUBJECT_LEN)
        {
            return Err(invalid("Subject is too long"));
        }
        if message.is_empty() {
            return Err(invalid("Message is required"));
        }
        if message.chars().count() > max_message_len {
            return Err(invalid("Message is too long"));
        }

        Ok(ContactMessage {
            name,
            email,
            subject,
            message,
            client_ip,
            received_at,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn form(name: &str, email: &str, message: &str) -> ContactForm {
        ContactForm {
            name: name.into(),
            email: email.into(),
            subject: None,
            message: message.into(),
        }
    }

    fn check(f: ContactForm) -> Result<ContactMessage, String> {
        f.validate(5000, "1.2.3.4".into(), 42).map_err(|e| e.to_string())
    }

    #[test]
    fn test_valid_form_is_trimmed() {
        let mut f = form("  Ada  ", " ada@example.com ", "  Hello there ");
        f.subject = Some("   ".into());
        let msg = check(f).unwrap();
        assert_eq!(msg.name, "Ada");
        assert_eq!(msg.email, "ada@example.com");
        assert_eq!(msg.message, "Hello there");
        assert_eq!(msg.subject, None);
        assert_eq!(msg.client_ip, "1.2.3.4");
        assert_eq!(msg.received_at, 42);
    }

    #[test]
    fn test_required_fields() {
        assert_eq!(check(form(" ", "a@b.co", "hi")).unwrap_err(), "Name is required");
        assert_eq!(check(form("A", "", "hi")).unwrap_err(), "Email is required");
        assert_eq!(check(form("A", "a@b.co", "  ")).unwrap_err(), "Message is required");
    }

    #[test]
    fn test_email_shapes() {
        for bad in ["plain", "a@b", "a@@b.co", "@b.co", "a@.co", "a@b.", "a b@c.co"] {
            assert_eq!(check(form("A", bad, "hi")).unwrap_err(), "Email is invalid", "{bad}");
        }
        assert!(check(form("A", "first.last+tag@sub.example.org", "hi")).is_ok());
    }

    #[test]
    fn test_length_limits() {
        let long_name = "n".repeat(101);
        assert_eq!(check(form(&long_name, "a@b.co", "hi")).unwrap_err(), "Name is too long");

        let err = form("A", "a@b.co", &"m".repeat(11))
            .validate(10, "ip".into(), 0)
            .unwrap_err();
        assert!(matches!(err, ContactError::Invalid(ref m) if m == "Message is too long"));

        let mut f = form("A", "a@b.co", "hi");
        f.subject = Some("s".repeat(201));
        assert_eq!(check(f).unwrap_err(), "Subject is too long");
    }

    #[test]
    fn test_error_status_codes() {
        let resp = ContactError::Invalid("x".into()).into_response();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let resp = ContactError::Delivery("smtp down".into()).into_response();
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
