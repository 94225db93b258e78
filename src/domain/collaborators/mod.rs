//! Contracts of the non-storage collaborators used by the click flow.
//!
//! All of them are injected at the composition root; nothing here reaches for
//! ambient state.

pub mod redirect_step;
pub mod robot_filter;
pub mod telemetry;
pub mod tracker;

pub use redirect_step::{RedirectStep, RedirectUrlArgs, StepFlow};
pub use robot_filter::RobotFilter;
pub use telemetry::{PayloadEnricher, TelemetrySink};
pub use tracker::{AnalyticsTracker, TrackerError, TrackerProvider};

#[cfg(test)]
pub use redirect_step::MockRedirectStep;
#[cfg(test)]
pub use robot_filter::MockRobotFilter;
#[cfg(test)]
pub use telemetry::{MockPayloadEnricher, MockTelemetrySink};
#[cfg(test)]
pub use tracker::{MockAnalyticsTracker, MockTrackerProvider};
