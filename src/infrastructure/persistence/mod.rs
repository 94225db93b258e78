//! PostgreSQL repository implementations.
//!
//! Concrete implementations of domain repository traits using SQLx.
//!
//! # Repositories
//!
//! - [`PgMessageRepository`] - Message definition lookups
//! - [`PgOpenEventRepository`] - Open-event persistence

pub mod pg_message_repository;
pub mod pg_open_event_repository;

pub use pg_message_repository::PgMessageRepository;
pub use pg_open_event_repository::PgOpenEventRepository;
