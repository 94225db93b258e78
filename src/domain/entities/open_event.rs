//! Email opened registration entities.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::BTreeMap;
use uuid::Uuid;

use super::contact::ContactIdentifier;

/// Outcome of an open registration reported by the event store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RegistrationResult {
    /// `true` when an earlier registration for the same key is still within
    /// the duplicate protection interval.
    pub is_duplicate: bool,
}

impl RegistrationResult {
    pub fn registered() -> Self {
        Self {
            is_duplicate: false,
        }
    }

    pub fn duplicate() -> Self {
        Self { is_duplicate: true }
    }
}

/// Telemetry payload sent downstream when an email open is registered.
///
/// `custom_values` is empty unless a payload enricher is configured.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EmailOpenMessage {
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
    pub request_registered: DateTime<Utc>,
    pub message_id: Uuid,
    pub contact_identifier: ContactIdentifier,
    pub instance_id: Uuid,
    pub site_name: String,
    pub target_language: String,
    pub test_value_index: Option<i32>,
    pub email_address_history_entry_id: Option<Uuid>,
    pub custom_values: BTreeMap<String, String>,
}
