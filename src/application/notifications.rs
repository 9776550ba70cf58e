//! Collaborator seams for notification fan-out, user-facing messages and
//! message-key translation.

use async_trait::async_trait;
use serde::Serialize;
use tracing::info;

use crate::domain::entities::{CommentRecord, PostRecord};
use crate::domain::types::Severity;

/// Event dispatched to the notification fan-out after a state change.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum NotificationEvent {
    CommentAdded {
        comment: CommentRecord,
        post: PostRecord,
    },
}

impl NotificationEvent {
    pub fn kind(&self) -> &'static str {
        match self {
            NotificationEvent::CommentAdded { .. } => "comment_added",
        }
    }

    /// JSON view of the payload for generic transports.
    pub fn payload(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or(serde_json::Value::Null)
    }
}

/// Fire-and-forget notification sink. Delivery failures are the sink's
/// problem, never the caller's.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn notify(&self, event: NotificationEvent);
}

/// Default sink: a structured tracing event carrying the payload.
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    async fn notify(&self, event: NotificationEvent) {
        info!(
            kind = event.kind(),
            payload = %event.payload(),
            "notification dispatched"
        );
    }
}

/// Host flash-message queue.
pub trait Messenger: Send + Sync {
    fn enqueue(&self, title: String, body: String, severity: Severity);
}

/// Host translation collaborator, keyed by message key.
pub trait Translator: Send + Sync {
    fn translate(&self, key: &str) -> String;
}

/// Passes message keys through untranslated.
pub struct IdentityTranslator;

impl Translator for IdentityTranslator {
    fn translate(&self, key: &str) -> String {
        key.to_string()
    }
}
