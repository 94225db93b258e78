//! Click event representing a recipient following a tracked link.

use uuid::Uuid;

use super::contact::ContactIdentifier;
use super::message::TrackedMessage;

/// The analytics fact built for every tracked click.
///
/// Created fresh per request from the [`TrackedMessage`] and discarded once
/// the redirect pipeline has run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClickEvent {
    pub message_id: Uuid,
    pub instance_id: Uuid,
    pub message_language: String,
    pub test_value_index: Option<i32>,
    pub email_address_history_entry_id: Option<Uuid>,
}

impl ClickEvent {
    /// Creates a click event for the given sent message.
    ///
    /// # Examples
    ///
    /// ```ignore
    /// let event = ClickEvent::for_message(&message);
    /// assert_eq!(event.instance_id, message.instance_id());
    /// ```
    pub fn for_message(message: &TrackedMessage) -> Self {
        Self {
            message_id: message.message_id,
            instance_id: message.instance_id(),
            message_language: message.target_language.clone(),
            test_value_index: message.test_value_index,
            email_address_history_entry_id: message.email_address_history_entry_id,
        }
    }
}

/// Event context handed to the redirect pipeline.
///
/// Pairs the (possibly anonymous) contact with the click event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventData {
    pub contact: Option<ContactIdentifier>,
    pub event: ClickEvent,
}

impl EventData {
    pub fn new(contact: Option<ContactIdentifier>, event: ClickEvent) -> Self {
        Self { contact, event }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn message() -> TrackedMessage {
        TrackedMessage {
            message_id: Uuid::new_v4(),
            target_language: "en".to_string(),
            test_value_index: Some(1),
            email_address_history_entry_id: Some(Uuid::new_v4()),
        }
    }

    #[test]
    fn test_click_event_copies_message_fields() {
        let message = message();
        let event = ClickEvent::for_message(&message);

        assert_eq!(event.message_id, message.message_id);
        assert_eq!(event.instance_id, message.message_id);
        assert_eq!(event.message_language, "en");
        assert_eq!(event.test_value_index, Some(1));
        assert_eq!(
            event.email_address_history_entry_id,
            message.email_address_history_entry_id
        );
    }

    #[test]
    fn test_event_data_anonymous_contact() {
        let data = EventData::new(None, ClickEvent::for_message(&message()));
        assert!(data.contact.is_none());
    }
}
