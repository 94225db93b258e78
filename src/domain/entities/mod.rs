//! Core domain entities for tracked email clicks.
//!
//! Entities are plain data structures without business logic.
//!
//! # Entity Types
//!
//! - [`TrackedMessage`] - The sent email instance a click belongs to
//! - [`ContactIdentifier`] - The (possibly anonymous) recipient
//! - [`ClickEvent`] / [`EventData`] - Click fact handed to the redirect pipeline
//! - [`EmailOpenMessage`] / [`RegistrationResult`] - Open registration values
//! - [`QueryParams`] / [`RequestContext`] - Request values passed explicitly

pub mod click;
pub mod contact;
pub mod message;
pub mod open_event;
pub mod request;

pub use click::{ClickEvent, EventData};
pub use contact::{ContactIdentifier, DEFAULT_CONTACT_SOURCE};
pub use message::{MessageItem, TrackedMessage};
pub use open_event::{EmailOpenMessage, RegistrationResult};
pub use request::{QueryParams, RequestContext};
