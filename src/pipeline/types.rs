//! Shared types for the forwarding pipeline.

use std::sync::Arc;

use async_trait::async_trait;

use crate::config::ForwarderConfig;
use crate::event::MailMetadata;
use crate::services::{MailSender, ObjectStore};

// ── Context ─────────────────────────────────────────────────────────

/// Mutable state threaded through every step of one invocation.
pub struct PipelineContext {
    /// The inbound event, exactly as received.
    pub event: serde_json::Value,
    pub config: Arc<ForwarderConfig>,
    pub object_store: Arc<dyn ObjectStore>,
    pub mail_sender: Arc<dyn MailSender>,
    /// Mail metadata, set by `parse_event`.
    pub mail: Option<MailMetadata>,
    /// Recipients the message was delivered to.
    pub original_recipients: Vec<String>,
    /// Last recipient that matched the forwarding table.
    ///
    /// A single value even when several recipients match; it becomes the
    /// sender of the one merged send.
    pub original_recipient: Option<String>,
    /// Forwarding destinations, set by `transform_recipients`.
    pub recipients: Vec<String>,
    /// Raw message text, set by `fetch_message` and rewritten in place.
    pub email_data: Option<String>,
}

impl PipelineContext {
    /// Create a fresh context for one inbound event.
    pub fn new(
        event: serde_json::Value,
        config: Arc<ForwarderConfig>,
        object_store: Arc<dyn ObjectStore>,
        mail_sender: Arc<dyn MailSender>,
    ) -> Self {
        Self {
            event,
            config,
            object_store,
            mail_sender,
            mail: None,
            original_recipients: Vec::new(),
            original_recipient: None,
            recipients: Vec::new(),
            email_data: None,
        }
    }

    /// Message id of the parsed mail, if any.
    pub fn message_id(&self) -> Option<&str> {
        self.mail.as_ref().map(|m| m.message_id.as_str())
    }
}

// ── Outcomes ────────────────────────────────────────────────────────

/// What a step tells the driver to do next.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepOutcome {
    /// Proceed to the next step.
    Continue,
    /// Stop; the invocation succeeded.
    Succeed,
    /// Stop; the invocation failed with this message.
    Fail(String),
}

impl StepOutcome {
    pub fn fail(message: impl Into<String>) -> Self {
        Self::Fail(message.into())
    }
}

/// Terminal result of one invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Succeeded,
    Failed(String),
}

impl Outcome {
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Succeeded)
    }

    /// Failure message, if the invocation failed.
    pub fn failure(&self) -> Option<&str> {
        match self {
            Self::Succeeded => None,
            Self::Failed(message) => Some(message),
        }
    }
}

// ── Step trait ──────────────────────────────────────────────────────

/// One stage of the pipeline.
///
/// A step owns the context between its entry and its return; the returned
/// outcome decides whether the next step runs.
#[async_trait]
pub trait Step: Send + Sync {
    /// Name used in step lists.
    fn name(&self) -> &str;

    /// Run the step against the shared context.
    async fn run(&self, ctx: &mut PipelineContext) -> StepOutcome;
}
