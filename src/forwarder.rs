//! Invocation entry point: wires config, collaborators and steps together.

use std::sync::Arc;

use lambda_runtime::LambdaEvent;
use tracing::instrument::WithSubscriber;
use tracing::{error, info};

use crate::config::ForwarderConfig;
use crate::pipeline::{Outcome, Pipeline, PipelineContext, StepRegistry};
use crate::services::{MailSender, ObjectStore};

/// Replacements for the pieces a `Forwarder` is built from.
///
/// Every field left `None` keeps the forwarder's own value.
#[derive(Default)]
pub struct Overrides {
    /// Step names to run instead of the default order.
    pub steps: Option<Vec<String>>,
    /// Registry used to resolve step names.
    pub registry: Option<StepRegistry>,
    pub config: Option<ForwarderConfig>,
    /// Subscriber that receives every log event of an invocation.
    pub log: Option<tracing::Dispatch>,
    pub mail_sender: Option<Arc<dyn MailSender>>,
    pub object_store: Option<Arc<dyn ObjectStore>>,
}

/// Forwards one SES notification per call to [`Forwarder::handle`].
pub struct Forwarder {
    config: Arc<ForwarderConfig>,
    object_store: Arc<dyn ObjectStore>,
    mail_sender: Arc<dyn MailSender>,
    pipeline: Pipeline,
    log: Option<tracing::Dispatch>,
}

impl Forwarder {
    /// Create a forwarder running the default steps.
    pub fn new(
        config: ForwarderConfig,
        object_store: Arc<dyn ObjectStore>,
        mail_sender: Arc<dyn MailSender>,
    ) -> Self {
        Self {
            config: Arc::new(config),
            object_store,
            mail_sender,
            pipeline: Pipeline::default(),
            log: None,
        }
    }

    /// Apply an override bundle.
    pub fn with_overrides(mut self, overrides: Overrides) -> Self {
        if let Some(config) = overrides.config {
            self.config = Arc::new(config);
        }
        if let Some(store) = overrides.object_store {
            self.object_store = store;
        }
        if let Some(sender) = overrides.mail_sender {
            self.mail_sender = sender;
        }
        if overrides.steps.is_some() || overrides.registry.is_some() {
            let steps = overrides
                .steps
                .unwrap_or_else(|| self.pipeline.steps().to_vec());
            let registry = overrides
                .registry
                .unwrap_or_else(StepRegistry::with_builtins);
            self.pipeline = Pipeline::new(registry, steps);
        }
        if overrides.log.is_some() {
            self.log = overrides.log;
        }
        self
    }

    pub fn config(&self) -> &ForwarderConfig {
        &self.config
    }

    /// Run the pipeline for one inbound event.
    pub async fn handle(&self, event: serde_json::Value) -> Outcome {
        let run = async {
            let mut ctx = PipelineContext::new(
                event,
                Arc::clone(&self.config),
                Arc::clone(&self.object_store),
                Arc::clone(&self.mail_sender),
            );
            let outcome = self.pipeline.run(&mut ctx).await;
            if let Some(message) = outcome.failure() {
                error!(
                    message_id = ctx.message_id().unwrap_or("unknown"),
                    reason = %message,
                    "Invocation failed"
                );
            }
            outcome
        };

        match &self.log {
            Some(dispatch) => run.with_subscriber(dispatch.clone()).await,
            None => run.await,
        }
    }

    /// Lambda adapter: a failed run becomes a handler error.
    pub async fn handle_lambda(
        &self,
        event: LambdaEvent<serde_json::Value>,
    ) -> Result<(), lambda_runtime::Error> {
        let (payload, context) = event.into_parts();
        info!(request_id = %context.request_id, "Invocation started");

        match self.handle(payload).await.failure() {
            None => Ok(()),
            Some(message) => Err(message.into()),
        }
    }
}
