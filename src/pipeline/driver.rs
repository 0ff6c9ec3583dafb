//! Pipeline driver: runs named steps in order until one stops the run.

use tracing::{debug, error};

use crate::pipeline::registry::{DEFAULT_STEPS, StepRegistry};
use crate::pipeline::types::{Outcome, PipelineContext, StepOutcome};

/// Failure message for a step name that does not resolve.
pub const INVALID_STEP: &str = "Error: Invalid step.";

/// An ordered list of step names plus the registry that resolves them.
#[derive(Clone)]
pub struct Pipeline {
    registry: StepRegistry,
    steps: Vec<String>,
}

impl Default for Pipeline {
    fn default() -> Self {
        Self::new(
            StepRegistry::with_builtins(),
            DEFAULT_STEPS.iter().map(|s| s.to_string()).collect(),
        )
    }
}

impl Pipeline {
    pub fn new(registry: StepRegistry, steps: Vec<String>) -> Self {
        Self { registry, steps }
    }

    /// Step names in execution order.
    pub fn steps(&self) -> &[String] {
        &self.steps
    }

    /// Run every step against `ctx`.
    ///
    /// Steps are resolved lazily, so an unknown name only fails the run once
    /// the steps before it have continued. Exhausting the list counts as
    /// success.
    pub async fn run(&self, ctx: &mut PipelineContext) -> Outcome {
        for (index, name) in self.steps.iter().enumerate() {
            let Some(step) = self.registry.get(name) else {
                error!(index, step = %name, "Pipeline step is not registered");
                return Outcome::Failed(INVALID_STEP.to_string());
            };

            debug!(index, step = %name, "Running step");
            match step.run(ctx).await {
                StepOutcome::Continue => {}
                StepOutcome::Succeed => {
                    debug!(step = %name, "Step completed the invocation");
                    return Outcome::Succeeded;
                }
                StepOutcome::Fail(message) => {
                    debug!(step = %name, reason = %message, "Step failed the invocation");
                    return Outcome::Failed(message);
                }
            }
        }
        Outcome::Succeeded
    }
}
