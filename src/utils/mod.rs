//! Helper functions used across the application.
//!
//! - [`request_context`] - Client information extraction from HTTP requests

pub mod request_context;
