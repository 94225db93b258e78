//! Application layer services implementing the click flow.
//!
//! Services consume domain traits and provide a clean API for HTTP handlers.
//!
//! # Available Services
//!
//! - [`services::redirect_service::RedirectService`] - Orchestrates a tracked click
//! - [`services::open_registrar::OpenEventRegistrar`] - Deduplicated open registration
//! - [`services::redirect_resolver::RedirectResolver`] - Ordered redirect pipeline

pub mod services;
