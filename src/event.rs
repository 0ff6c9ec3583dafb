//! SES receipt notification: envelope types and validation.

use serde::{Deserialize, Serialize};

use crate::error::EventError;

/// Event source every accepted record must declare.
pub const EXPECTED_EVENT_SOURCE: &str = "aws:ses";

/// Schema version every accepted record must declare.
pub const EXPECTED_EVENT_VERSION: &str = "1.0";

/// Inbound notification envelope.
#[derive(Debug, Clone, Deserialize)]
pub struct SesEnvelope {
    #[serde(rename = "Records", default)]
    pub records: Vec<SesRecord>,
}

/// A single record of the envelope.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SesRecord {
    pub event_source: Option<String>,
    pub event_version: Option<String>,
    pub ses: Option<SesNotification>,
}

/// The `ses` object of a record.
#[derive(Debug, Clone, Deserialize)]
pub struct SesNotification {
    pub mail: MailMetadata,
    pub receipt: Receipt,
}

/// Mail metadata as delivered by SES.
///
/// Only `messageId` and `source` are used; everything else is kept so the
/// metadata can be logged unchanged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MailMetadata {
    pub message_id: String,
    pub source: String,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// Receipt object carrying the recipient list.
#[derive(Debug, Clone, Deserialize)]
pub struct Receipt {
    pub recipients: Vec<String>,
}

/// Mail metadata and recipients extracted from a valid envelope.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedEvent {
    pub mail: MailMetadata,
    pub recipients: Vec<String>,
}

/// Validate an envelope and extract its mail metadata and recipients.
pub fn parse_envelope(event: &serde_json::Value) -> Result<ParsedEvent, EventError> {
    let envelope = SesEnvelope::deserialize(event)
        .map_err(|e| EventError::Malformed(e.to_string()))?;

    let [record] = <[SesRecord; 1]>::try_from(envelope.records)
        .map_err(|records| EventError::RecordCount(records.len()))?;

    if record.event_source.as_deref() != Some(EXPECTED_EVENT_SOURCE) {
        return Err(EventError::EventSource(record.event_source));
    }
    if record.event_version.as_deref() != Some(EXPECTED_EVENT_VERSION) {
        return Err(EventError::EventVersion(record.event_version));
    }

    let ses = record
        .ses
        .ok_or_else(|| EventError::Malformed("record has no ses object".into()))?;

    Ok(ParsedEvent {
        mail: ses.mail,
        recipients: ses.receipt.recipients,
    })
}
