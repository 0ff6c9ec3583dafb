//! `MailSender` backed by Amazon SES (`SendRawEmail`).

use async_trait::async_trait;
use aws_sdk_ses::error::DisplayErrorContext;
use aws_sdk_ses::primitives::Blob;
use aws_sdk_ses::types::RawMessage;

use crate::error::SendError;
use crate::services::traits::{MailSender, SendRawRequest, SendReceipt};

/// SES-backed mail sender.
#[derive(Debug, Clone)]
pub struct SesMailSender {
    client: aws_sdk_ses::Client,
}

impl SesMailSender {
    pub fn new(client: aws_sdk_ses::Client) -> Self {
        Self { client }
    }

    /// Build a client from the shared AWS SDK config.
    pub fn from_sdk_config(config: &aws_config::SdkConfig) -> Self {
        Self::new(aws_sdk_ses::Client::new(config))
    }
}

#[async_trait]
impl MailSender for SesMailSender {
    async fn send_raw(&self, request: SendRawRequest) -> Result<SendReceipt, SendError> {
        if request.destinations.is_empty() {
            return Err(SendError::InvalidRequest("no destinations".into()));
        }

        let raw_message = RawMessage::builder()
            .data(Blob::new(request.raw_message))
            .build()
            .map_err(|e| SendError::InvalidRequest(e.to_string()))?;

        let output = self
            .client
            .send_raw_email()
            .set_destinations(Some(request.destinations))
            .source(&request.source)
            .raw_message(raw_message)
            .send()
            .await
            .map_err(|e| SendError::Rejected {
                sender: request.source.clone(),
                reason: DisplayErrorContext(&e).to_string(),
            })?;

        Ok(SendReceipt {
            message_id: output.message_id().to_string(),
        })
    }
}
