//! Domain layer containing the entities and contracts of the click flow.
//!
//! The domain layer has no dependencies on infrastructure or presentation
//! layers. Business logic lives in [`crate::application::services`].
//!
//! # Architecture
//!
//! - [`entities`] - Core data structures
//! - [`repositories`] - Store trait definitions
//! - [`collaborators`] - Robot filter, tracker, telemetry and pipeline step contracts
//! - [`duplicate_window`] - Duplicate protection interval policy
//! - [`open_worker`] - Asynchronous open-event persistence
//!
//! # Open Event Flow
//!
//! 1. HTTP handler receives a tracked click
//! 2. [`crate::application::services::OpenEventRegistrar`] registers the open
//!    against [`repositories::EmailEventStorage`]
//! 3. A first registration sends an [`entities::EmailOpenMessage`] to the
//!    [`collaborators::TelemetrySink`]
//! 4. [`open_worker::run_open_worker`] persists it via
//!    [`repositories::OpenEventRepository`]

pub mod collaborators;
pub mod duplicate_window;
pub mod entities;
pub mod open_worker;
pub mod repositories;
