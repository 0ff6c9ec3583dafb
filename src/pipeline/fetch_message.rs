//! Message fetcher: makes the stored message readable, then loads it.
//!
//! The stored object may be owned by the receiving service, so it is first
//! copied onto itself with a private ACL; the copy is what gets read.

use async_trait::async_trait;
use tracing::{error, info};

use crate::pipeline::types::{PipelineContext, Step, StepOutcome};
use crate::services::{Acl, CopyRequest, ObjectLocation, StorageClass};

pub const COPY_FAILED: &str = "Error: Could not make readable copy of email.";
pub const READ_FAILED: &str = "Error: Failed to load message body from S3.";
pub const MISSING_MAIL: &str = "Error: No mail metadata to fetch.";

/// Content type applied to the readable copy.
const COPY_CONTENT_TYPE: &str = "text/plain";

pub struct FetchMessage;

#[async_trait]
impl Step for FetchMessage {
    fn name(&self) -> &str {
        "fetch_message"
    }

    async fn run(&self, ctx: &mut PipelineContext) -> StepOutcome {
        let Some(message_id) = ctx.message_id() else {
            error!("fetch_message ran before the event was parsed");
            return StepOutcome::fail(MISSING_MAIL);
        };

        let location = ObjectLocation::new(
            ctx.config.email_bucket.clone(),
            ctx.config.message_key(message_id),
        );

        info!(location = %location, "Fetching email");

        let copy = CopyRequest {
            source: location.clone(),
            destination: location.clone(),
            acl: Acl::Private,
            content_type: COPY_CONTENT_TYPE.to_string(),
            storage_class: StorageClass::Standard,
        };
        if let Err(e) = ctx.object_store.copy(copy).await {
            error!(
                error = %e,
                details = ?e,
                location = %location,
                "Could not make readable copy of email"
            );
            return StepOutcome::fail(COPY_FAILED);
        }

        match ctx.object_store.read(&location).await {
            Ok(bytes) => {
                info!(location = %location, bytes = bytes.len(), "Loaded email body");
                ctx.email_data = Some(String::from_utf8_lossy(&bytes).into_owned());
                StepOutcome::Continue
            }
            Err(e) => {
                error!(
                    error = %e,
                    details = ?e,
                    location = %location,
                    "Failed to load message body"
                );
                StepOutcome::fail(READ_FAILED)
            }
        }
    }
}
