//! Auxiliary channels: control messages, background sync and push display.
//!
//! Wire shapes match the application shell's contract: messages are tagged
//! JSON objects (`{"type": "activate-now"}`, `{"type": "update-available"}`)
//! and push payloads are `{title?, body?}` with fixed defaults.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use waylay_core::Error;

/// The sync tag whose arrival triggers the flush-pending hook.
pub const SYNC_FLUSH_TAG: &str = "flush-pending";

/// Default notification title when the push payload omits one.
pub const DEFAULT_PUSH_TITLE: &str = "Waylay";

/// Default notification body when the push payload omits one.
pub const DEFAULT_PUSH_BODY: &str = "You have a new update.";

/// Command sent by the application shell to the engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum ControlMessage {
    /// Force a waiting version live instead of waiting for every tab to
    /// close. Backs the shell's "reload to update" prompt.
    ActivateNow,
}

impl ControlMessage {
    /// Parse a raw control message payload.
    pub fn parse(payload: &[u8]) -> Result<Self, Error> {
        serde_json::from_slice(payload).map_err(|e| Error::BadMessage(e.to_string()))
    }
}

/// Event broadcast by the engine to every client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum BroadcastMessage {
    /// A new version finished installing and is waiting.
    UpdateAvailable { version: String },
}

/// Opaque payload delivered by the push provider.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PushPayload {
    #[serde(default)]
    pub title: Option<String>,

    #[serde(default)]
    pub body: Option<String>,
}

impl PushPayload {
    /// Parse a push payload, falling back to an empty payload when the
    /// bytes are not valid JSON (the provider's contents are opaque).
    pub fn parse(payload: &[u8]) -> Self {
        serde_json::from_slice(payload).unwrap_or_default()
    }
}

/// Action button attached to a notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotificationAction {
    pub action: String,
    pub title: String,
}

/// A notification ready for display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub title: String,
    pub body: String,
    pub actions: Vec<NotificationAction>,
}

impl Notification {
    /// Build the displayed notification from a push payload, applying the
    /// fixed defaults and the two standard actions.
    pub fn from_push(payload: PushPayload) -> Self {
        Self {
            title: payload.title.unwrap_or_else(|| DEFAULT_PUSH_TITLE.to_string()),
            body: payload.body.unwrap_or_else(|| DEFAULT_PUSH_BODY.to_string()),
            actions: vec![
                NotificationAction { action: "open".to_string(), title: "Open app".to_string() },
                NotificationAction { action: "dismiss".to_string(), title: "Dismiss".to_string() },
            ],
        }
    }
}

/// Display surface for push notifications.
#[async_trait]
pub trait NotificationSink: Send + Sync {
    async fn show(&self, notification: Notification) -> Result<(), Error>;
}

/// Sink that only logs the notification. Used where no display surface
/// exists (headless runs, the demo binary).
#[derive(Debug, Default)]
pub struct TracingNotificationSink;

#[async_trait]
impl NotificationSink for TracingNotificationSink {
    async fn show(&self, notification: Notification) -> Result<(), Error> {
        tracing::info!(title = %notification.title, body = %notification.body, "notification");
        Ok(())
    }
}

/// Idempotent hook invoked when the named sync signal arrives. Retry
/// scheduling stays with the platform, not this layer.
#[async_trait]
pub trait SyncFlush: Send + Sync {
    async fn flush_pending(&self) -> Result<(), Error>;
}

/// Flush hook that does nothing; for deployments with no pending-operation
/// queue.
#[derive(Debug, Default)]
pub struct NoopSyncFlush;

#[async_trait]
impl SyncFlush for NoopSyncFlush {
    async fn flush_pending(&self) -> Result<(), Error> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_control_message_wire_format() {
        let parsed = ControlMessage::parse(br#"{"type":"activate-now"}"#).unwrap();
        assert_eq!(parsed, ControlMessage::ActivateNow);
    }

    #[test]
    fn test_control_message_rejects_unknown() {
        assert!(ControlMessage::parse(br#"{"type":"self-destruct"}"#).is_err());
        assert!(ControlMessage::parse(b"not json").is_err());
    }

    #[test]
    fn test_broadcast_message_wire_format() {
        let message = BroadcastMessage::UpdateAvailable { version: "v2".into() };
        let json = serde_json::to_string(&message).unwrap();
        assert_eq!(json, r#"{"type":"update-available","version":"v2"}"#);
    }

    #[test]
    fn test_push_payload_defaults() {
        let notification = Notification::from_push(PushPayload::parse(b"{}"));
        assert_eq!(notification.title, DEFAULT_PUSH_TITLE);
        assert_eq!(notification.body, DEFAULT_PUSH_BODY);
    }

    #[test]
    fn test_push_payload_partial() {
        let notification = Notification::from_push(PushPayload::parse(br#"{"title":"Hi"}"#));
        assert_eq!(notification.title, "Hi");
        assert_eq!(notification.body, DEFAULT_PUSH_BODY);
    }

    #[test]
    fn test_push_payload_garbage_uses_defaults() {
        let notification = Notification::from_push(PushPayload::parse(b"\x00\x01\x02"));
        assert_eq!(notification.title, DEFAULT_PUSH_TITLE);
    }

    #[test]
    fn test_notification_actions() {
        let notification = Notification::from_push(PushPayload::default());
        let actions: Vec<&str> = notification.actions.iter().map(|a| a.action.as_str()).collect();
        assert_eq!(actions, vec!["open", "dismiss"]);
    }
}
