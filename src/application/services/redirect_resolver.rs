//! Ordered redirect resolution pipeline.

use std::sync::Arc;

use tracing::debug;
use url::Url;

use crate::domain::collaborators::{RedirectStep, RedirectUrlArgs, StepFlow};

/// Runs injected [`RedirectStep`]s in order to pick a redirect target.
///
/// A step returning [`StepFlow::Abort`] ends the run. Whatever the steps left
/// in [`RedirectUrlArgs::redirect_to`] is the result; `None` is a normal
/// outcome, not an error.
#[derive(Clone, Default)]
pub struct RedirectResolver {
    steps: Vec<Arc<dyn RedirectStep>>,
}

impl RedirectResolver {
    pub fn new(steps: Vec<Arc<dyn RedirectStep>>) -> Self {
        Self { steps }
    }

    /// Appends a step to the end of the pipeline.
    pub fn with_step(mut self, step: Arc<dyn RedirectStep>) -> Self {
        self.steps.push(step);
        self
    }

    pub fn step_names(&self) -> Vec<&'static str> {
        self.steps.iter().map(|s| s.name()).collect()
    }

    pub async fn resolve(&self, mut args: RedirectUrlArgs) -> Option<Url> {
        for step in &self.steps {
            if step.process(&mut args).await == StepFlow::Abort {
                debug!("Redirect pipeline aborted by step {}", step.name());
                break;
            }
        }

        args.redirect_to
    }
}
