//! Behavioral events emitted by state handlers.

use crate::models::Identity;
use crate::state::EventType;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

/// Type-specific event payload. Stored as JSONB.
pub type Metadata = serde_json::Map<String, Value>;

/// An immutable behavioral event.
///
/// `context_id` is the correlation id of the walk that produced the event;
/// all events from one walk share it and are written in the order the walk
/// produced them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    pub id: Uuid,
    pub event_type: EventType,
    pub context_id: Uuid,
    pub user_name: String,
    pub user_agent: String,
    pub ip_address: String,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub metadata: Metadata,
}

impl Event {
    /// Create an event with empty metadata, stamped with the current time.
    pub fn new(id: Uuid, event_type: EventType, context_id: Uuid, identity: &Identity) -> Self {
        Self {
            id,
            event_type,
            context_id,
            user_name: identity.username.clone(),
            user_agent: identity.user_agent.clone(),
            ip_address: identity.ip_address.clone(),
            created_at: Utc::now(),
            metadata: Metadata::new(),
        }
    }

    /// Add a metadata entry.
    pub fn with_field(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }

    /// Metadata as a JSON object value.
    pub fn metadata_value(&self) -> Value {
        Value::Object(self.metadata.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn identity() -> Identity {
        Identity {
            user_id: Uuid::nil(),
            username: "jdoe".to_string(),
            ip_address: "203.0.113.7".to_string(),
            user_agent: "Mozilla/5.0".to_string(),
        }
    }

    #[test]
    fn test_event_copies_identity() {
        let ctx = Uuid::from_u128(7);
        let event = Event::new(Uuid::from_u128(1), EventType::Login, ctx, &identity());

        assert_eq!(event.context_id, ctx);
        assert_eq!(event.user_name, "jdoe");
        assert_eq!(event.ip_address, "203.0.113.7");
        assert!(event.metadata.is_empty());
    }

    #[test]
    fn test_with_field_builds_metadata_object() {
        let event = Event::new(Uuid::nil(), EventType::Browsing, Uuid::nil(), &identity())
            .with_field("page", "home")
            .with_field("duration_ms", 1200);

        let value = event.metadata_value();
        assert_eq!(value["page"], "home");
        assert_eq!(value["duration_ms"], 1200);
    }
}
