//! Message sender: dispatches the rewritten message through SES.

use async_trait::async_trait;
use tracing::{error, info};

use crate::pipeline::types::{PipelineContext, Step, StepOutcome};
use crate::services::SendRawRequest;

pub const SEND_FAILED: &str = "Error: Email sending failed.";
pub const MISSING_MESSAGE: &str = "Error: No message to send.";

pub struct SendMessage;

#[async_trait]
impl Step for SendMessage {
    fn name(&self) -> &str {
        "send_message"
    }

    async fn run(&self, ctx: &mut PipelineContext) -> StepOutcome {
        let (Some(raw), Some(source)) = (
            ctx.email_data.as_ref(),
            ctx.original_recipient.as_ref(),
        ) else {
            error!("send_message ran without a processed message and matched recipient");
            return StepOutcome::fail(MISSING_MESSAGE);
        };

        let request = SendRawRequest {
            destinations: ctx.recipients.clone(),
            source: source.clone(),
            raw_message: raw.clone().into_bytes(),
        };

        info!(
            original_recipients = ?ctx.original_recipients,
            recipients = ?request.destinations,
            source = %request.source,
            "Forwarding email"
        );

        match ctx.mail_sender.send_raw(request).await {
            Ok(receipt) => {
                info!(
                    ses_message_id = %receipt.message_id,
                    "Email sent"
                );
                StepOutcome::Continue
            }
            Err(e) => {
                error!(error = %e, details = ?e, "Email sending failed");
                StepOutcome::fail(SEND_FAILED)
            }
        }
    }
}
