//! Business logic services for the application layer.

pub mod open_registrar;
pub mod redirect_resolver;
pub mod redirect_service;

pub use open_registrar::{OpenEventRegistrar, RegistrationOutcome};
pub use redirect_resolver::RedirectResolver;
pub use redirect_service::{
    ClickRequest, LINK_PARAM, RedirectDecision, RedirectError, RedirectKind, RedirectService,
};
