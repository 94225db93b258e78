//! Sent email message entities.

use uuid::Uuid;

/// A message definition as stored by the message-delivery system.
///
/// Only the attributes the tracking endpoint needs are loaded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageItem {
    pub id: Uuid,
    pub name: String,
    pub target_language: String,
}

impl MessageItem {
    /// Creates a new MessageItem instance.
    pub fn new(id: Uuid, name: String, target_language: String) -> Self {
        Self {
            id,
            name,
            target_language,
        }
    }
}

/// A single sent email instance the visitor clicked through from.
///
/// Combines the stored message definition with the per-recipient values
/// carried in the tracking link (test variant and history entry).
/// Immutable once built by the message-context middleware.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackedMessage {
    pub message_id: Uuid,
    pub target_language: String,
    pub test_value_index: Option<i32>,
    pub email_address_history_entry_id: Option<Uuid>,
}

impl TrackedMessage {
    /// Builds a tracked message from a stored item and link-carried values.
    pub fn from_item(
        item: &MessageItem,
        test_value_index: Option<i32>,
        email_address_history_entry_id: Option<Uuid>,
    ) -> Self {
        Self {
            message_id: item.id,
            target_language: item.target_language.clone(),
            test_value_index,
            email_address_history_entry_id,
        }
    }

    /// Instance identifier of the send.
    ///
    /// Every send of a message shares the message identifier as its instance.
    pub fn instance_id(&self) -> Uuid {
        self.message_id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tracked_message_from_item() {
        let id = Uuid::new_v4();
        let history = Uuid::new_v4();
        let item = MessageItem::new(id, "Spring sale".to_string(), "en".to_string());

        let message = TrackedMessage::from_item(&item, Some(2), Some(history));

        assert_eq!(message.message_id, id);
        assert_eq!(message.target_language, "en");
        assert_eq!(message.test_value_index, Some(2));
        assert_eq!(message.email_address_history_entry_id, Some(history));
    }

    #[test]
    fn test_instance_id_matches_message_id() {
        let item = MessageItem::new(Uuid::new_v4(), "Newsletter".to_string(), "da".to_string());
        let message = TrackedMessage::from_item(&item, None, None);

        assert_eq!(message.instance_id(), message.message_id);
    }
}
