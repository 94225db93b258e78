//! HTTP layer for request/response handling.
//!
//! Translates HTTP requests into application calls and formats responses.
//!
//! # Modules
//!
//! - [`dto`] - Data Transfer Objects for response serialization
//! - [`handlers`] - HTTP request handlers
//! - [`middleware`] - Message context resolution and tracing middleware

pub mod dto;
pub mod handlers;
pub mod middleware;
