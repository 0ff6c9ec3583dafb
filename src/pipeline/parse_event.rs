//! Event parser: validates the SES notification and extracts the mail.

use async_trait::async_trait;
use tracing::{error, info};

use crate::event::parse_envelope;
use crate::pipeline::types::{PipelineContext, Step, StepOutcome};

/// Failure message for an envelope that is not a single SES record.
pub const INVALID_MESSAGE: &str = "Error: Received invalid SES message.";

pub struct ParseEvent;

#[async_trait]
impl Step for ParseEvent {
    fn name(&self) -> &str {
        "parse_event"
    }

    async fn run(&self, ctx: &mut PipelineContext) -> StepOutcome {
        match parse_envelope(&ctx.event) {
            Ok(parsed) => {
                info!(
                    message_id = %parsed.mail.message_id,
                    source = %parsed.mail.source,
                    recipients = ?parsed.recipients,
                    "Parsed SES notification"
                );
                ctx.mail = Some(parsed.mail);
                ctx.original_recipients = parsed.recipients;
                StepOutcome::Continue
            }
            Err(e) => {
                error!(
                    error = %e,
                    event = %ctx.event,
                    "Invalid SES message"
                );
                StepOutcome::fail(INVALID_MESSAGE)
            }
        }
    }
}
