//! Repository trait definitions for the domain layer.
//!
//! These traits abstract the external stores the click flow talks to.
//! Concrete implementations live in `crate::infrastructure`.
//!
//! # Available Repositories
//!
//! - [`EmailEventStorage`] - Atomic, windowed open registration
//! - [`MessageRepository`] - Sent message lookups
//! - [`OpenEventRepository`] - Open-event persistence for the worker
//!
//! Mock implementations are generated via `mockall` for unit tests.

pub mod event_storage;
pub mod message_repository;
pub mod open_event_repository;

pub use event_storage::{EmailEventStorage, StoreError, open_registration_key};
pub use message_repository::MessageRepository;
pub use open_event_repository::OpenEventRepository;

#[cfg(test)]
pub use event_storage::MockEmailEventStorage;
#[cfg(test)]
pub use message_repository::MockMessageRepository;
#[cfg(test)]
pub use open_event_repository::MockOpenEventRepository;
