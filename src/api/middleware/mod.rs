//! HTTP middleware for request processing.
//!
//! Provides message context resolution and observability middleware.

pub mod message_context;
pub mod tracing;
