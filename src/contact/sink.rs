//! Destinations for accepted contact messages.

use std::sync::Mutex;

use crate::contact::types::{ContactError, ContactMessage};

/// Receives validated contact messages.
///
/// Implementations hand the message to storage and/or an email API. They
/// are called only after the trust check, rate limit and validation pass.
pub trait ContactSink: Send + Sync {
    fn deliver(&self, message: &ContactMessage) -> Result<(), ContactError>;
}

/// Emits each message as a structured log event.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogSink;

impl ContactSink for LogSink {
    fn deliver(&self, message: &ContactMessage) -> Result<(), ContactError> {
        tracing::info!(
            target: "contact",
            name = %message.name,
            email = %message.email,
            subject = message.subject.as_deref().unwrap_or(""),
            message_len = message.message.chars().count(),
            client = %message.client_ip,
            "New contact message"
        );
        Ok(())
    }
}

/// Keeps messages in memory, newest last.
#[derive(Debug, Default)]
pub struct MemoryInbox {
    messages: Mutex<Vec<ContactMessage>>,
}

impl MemoryInbox {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of every message received so far.
    pub fn messages(&self) -> Vec<ContactMessage> {
        self.messages
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    pub fn len(&self) -> usize {
        self.messages
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl ContactSink for MemoryInbox {
    fn deliver(&self, message: &ContactMessage) -> Result<(), ContactError> {
        self.messages
            .lock()
            .map_err(|_| ContactError::Delivery("inbox lock poisoned".to_string()))?
            .push(message.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn message(name: &str) -> ContactMessage {
        ContactMessage {
            name: name.into(),
            email: "a@b.co".into(),
            subject: None,
            message: "hello".into(),
            client_ip: "unknown".into(),
            received_at: 0,
        }
    }

    #[test]
    fn test_inbox_keeps_order() {
        let inbox = MemoryInbox::new();
        assert!(inbox.is_empty());
        inbox.deliver(&message("first")).unwrap();
        inbox.deliver(&message("second")).unwrap();

        let names: Vec<String> = inbox.messages().into_iter().map(|m| m.name).collect();
        assert_eq!(names, vec!["first", "second"]);
    }

    #[test]
    fn test_log_sink_accepts() {
        assert!(LogSink.deliver(&message("x")).is_ok());
    }
}
