//! Infrastructure layer for external integrations.
//!
//! This layer implements the contracts defined by the domain layer.
//!
//! # Modules
//!
//! - [`event_store`] - Open registration stores (Redis and in-memory)
//! - [`persistence`] - PostgreSQL repository implementations
//! - [`telemetry`] - Queue-backed telemetry sink
//! - [`robots`] - Robot filter
//! - [`tracking`] - Cookie-based analytics tracker
//! - [`enrichment`] - Payload enrichers
//! - [`redirect_steps`] - Built-in redirect pipeline steps

pub mod enrichment;
pub mod event_store;
pub mod persistence;
pub mod redirect_steps;
pub mod robots;
pub mod telemetry;
pub mod tracking;
