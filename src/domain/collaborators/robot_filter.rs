//! Automated-visitor exclusion.

use crate::domain::entities::RequestContext;

/// Decides whether a visitor is excluded from analytics registration.
///
/// A positive result only skips open registration; the redirect always
/// proceeds.
#[cfg_attr(test, mockall::automock)]
pub trait RobotFilter: Send + Sync {
    fn is_excluded(&self, request: &RequestContext) -> bool;
}
