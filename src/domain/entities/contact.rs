//! Recipient identity.

use serde::Serialize;
use std::fmt;

/// Default identifier source for contacts created by the email channel.
pub const DEFAULT_CONTACT_SOURCE: &str = "exm";

/// Opaque identifier of an email recipient.
///
/// Identifiers are scoped by a source (the system that issued them).
/// Used only as a lookup key; never mutated.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct ContactIdentifier {
    pub source: String,
    pub identifier: String,
}

impl ContactIdentifier {
    /// Creates a new contact identifier.
    pub fn new(source: impl Into<String>, identifier: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            identifier: identifier.into(),
        }
    }

    /// Parses the identity carried in a tracking link.
    ///
    /// Returns `None` for a missing or blank identifier (anonymous visitor).
    /// A missing or blank source falls back to [`DEFAULT_CONTACT_SOURCE`].
    pub fn from_link(identifier: Option<&str>, source: Option<&str>) -> Option<Self> {
        let identifier = identifier.map(str::trim).filter(|s| !s.is_empty())?;
        let source = source
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .unwrap_or(DEFAULT_CONTACT_SOURCE);

        Some(Self::new(source, identifier))
    }

    /// Shortened form safe to write to logs.
    ///
    /// Keeps the source and the first four characters of the identifier.
    pub fn to_log_string(&self) -> String {
        let visible: String = self.identifier.chars().take(4).collect();
        format!("{}:{}***", self.source, visible)
    }
}

impl fmt::Display for ContactIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.source, self.identifier)
    }
}
