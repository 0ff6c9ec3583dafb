//! Step registry: resolves step names to step implementations.

use std::collections::HashMap;
use std::sync::Arc;

use crate::pipeline::fetch_message::FetchMessage;
use crate::pipeline::finish::Finish;
use crate::pipeline::parse_event::ParseEvent;
use crate::pipeline::process_message::ProcessMessage;
use crate::pipeline::send_message::SendMessage;
use crate::pipeline::transform_recipients::TransformRecipients;
use crate::pipeline::types::Step;

/// Default step order of a forwarding run.
pub const DEFAULT_STEPS: &[&str] = &[
    "parse_event",
    "transform_recipients",
    "fetch_message",
    "process_message",
    "send_message",
    "finish",
];

/// Registry of available steps.
#[derive(Clone, Default)]
pub struct StepRegistry {
    steps: HashMap<String, Arc<dyn Step>>,
}

impl StepRegistry {
    /// Create a new empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry holding the built-in steps.
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        registry.register(Arc::new(ParseEvent));
        registry.register(Arc::new(TransformRecipients));
        registry.register(Arc::new(FetchMessage));
        registry.register(Arc::new(ProcessMessage));
        registry.register(Arc::new(SendMessage));
        registry.register(Arc::new(Finish));
        registry
    }

    /// Register a step under its own name, replacing any previous one.
    pub fn register(&mut self, step: Arc<dyn Step>) {
        let name = step.name().to_string();
        if self.steps.insert(name.clone(), step).is_some() {
            tracing::debug!(step = %name, "Replaced registered step");
        } else {
            tracing::debug!("Registered step: {}", name);
        }
    }

    /// Get a step by name.
    pub fn get(&self, name: &str) -> Option<Arc<dyn Step>> {
        self.steps.get(name).cloned()
    }

    /// Check if a step exists.
    pub fn has(&self, name: &str) -> bool {
        self.steps.contains_key(name)
    }

    /// Number of registered steps.
    pub fn count(&self) -> usize {
        self.steps.len()
    }
}
