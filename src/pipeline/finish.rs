//! Finisher: terminal step of a successful run.

use async_trait::async_trait;
use tracing::info;

use crate::pipeline::types::{PipelineContext, Step, StepOutcome};

pub struct Finish;

#[async_trait]
impl Step for Finish {
    fn name(&self) -> &str {
        "finish"
    }

    async fn run(&self, ctx: &mut PipelineContext) -> StepOutcome {
        info!(
            message_id = ctx.message_id().unwrap_or("unknown"),
            "Process finished successfully."
        );
        StepOutcome::Succeed
    }
}
