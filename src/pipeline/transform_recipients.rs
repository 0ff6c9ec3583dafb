//! Recipient transformer: maps received addresses to forwarding targets.
//!
//! Lookup order per recipient:
//! 1. exact key (after `+tag` stripping when enabled)
//! 2. `@domain` key
//! 3. `@` catch-all key

use std::sync::LazyLock;

use async_trait::async_trait;
use regex::Regex;
use tracing::info;

use crate::config::ForwarderConfig;
use crate::pipeline::types::{PipelineContext, Step, StepOutcome};

static PLUS_TAG: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\+[^@]*@").unwrap());

/// Result of mapping a recipient list through the forwarding table.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecipientMapping {
    /// Destinations of every match, in recipient order.
    pub destinations: Vec<String>,
    /// The last recipient that matched.
    pub original_recipient: Option<String>,
}

/// Map `recipients` through the forwarding table of `config`.
pub fn map_recipients(recipients: &[String], config: &ForwarderConfig) -> RecipientMapping {
    let mut mapping = RecipientMapping::default();

    for recipient in recipients {
        let lookup = if config.allow_plus_sign {
            PLUS_TAG.replace(recipient, "@").into_owned()
        } else {
            recipient.clone()
        };

        let Some((key, destinations)) = lookup_destinations(config, &lookup) else {
            continue;
        };

        mapping.destinations.extend(destinations.iter().cloned());
        // Exact keys are valid sender addresses; fallback keys are not.
        mapping.original_recipient = Some(if key.starts_with('@') {
            recipient.clone()
        } else {
            key.to_string()
        });
    }

    mapping
}

fn lookup_destinations<'a>(
    config: &'a ForwarderConfig,
    address: &str,
) -> Option<(&'a str, &'a Vec<String>)> {
    let table = &config.forward_mapping;
    if let Some((key, destinations)) = table.get_key_value(address) {
        return Some((key.as_str(), destinations));
    }
    if let Some(at) = address.rfind('@')
        && let Some((key, destinations)) = table.get_key_value(&address[at..])
        && key.len() > 1
    {
        return Some((key.as_str(), destinations));
    }
    table
        .get_key_value("@")
        .map(|(key, destinations)| (key.as_str(), destinations))
}

pub struct TransformRecipients;

#[async_trait]
impl Step for TransformRecipients {
    fn name(&self) -> &str {
        "transform_recipients"
    }

    async fn run(&self, ctx: &mut PipelineContext) -> StepOutcome {
        let mapping = map_recipients(&ctx.original_recipients, &ctx.config);

        let original_recipient = match mapping.original_recipient {
            Some(recipient) if !mapping.destinations.is_empty() => recipient,
            _ => {
                info!(
                    original_recipients = ?ctx.original_recipients,
                    "Finishing process. No new recipients found for original destinations"
                );
                return StepOutcome::Succeed;
            }
        };

        info!(
            original_recipient = %original_recipient,
            recipients = ?mapping.destinations,
            "Mapped recipients"
        );
        ctx.original_recipient = Some(original_recipient);
        ctx.recipients = mapping.destinations;
        StepOutcome::Continue
    }
}
