//! Configuration types.

use std::collections::HashMap;

use serde::Deserialize;

use crate::error::ConfigError;

/// Forwarding table: received address → ordered destination addresses.
///
/// Keys are either full addresses (`info@example.com`), a domain fallback
/// (`@example.com`) or the catch-all `@`.
pub type ForwardMapping = HashMap<String, Vec<String>>;

/// Forwarder configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ForwarderConfig {
    /// Bucket the receipt rule stores inbound mail in.
    pub email_bucket: String,
    /// Key prefix of stored messages (e.g. `"inbox/"`).
    #[serde(default)]
    pub email_key_prefix: String,
    /// Forwarding table.
    pub forward_mapping: ForwardMapping,
    /// Text prepended to every forwarded `Subject` header.
    #[serde(default)]
    pub subject_prefix: Option<String>,
    /// Look up `user+tag@domain` as `user@domain`.
    #[serde(default)]
    pub allow_plus_sign: bool,
}

impl ForwarderConfig {
    /// Parse and validate a JSON config document.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Build config from environment variables.
    ///
    /// `EMAIL_BUCKET` and `FORWARD_MAPPING` (a JSON object) are required.
    pub fn from_env() -> Result<Self, ConfigError> {
        let email_bucket = std::env::var("EMAIL_BUCKET")
            .map_err(|_| ConfigError::MissingEnvVar("EMAIL_BUCKET".into()))?;

        let email_key_prefix = std::env::var("EMAIL_KEY_PREFIX").unwrap_or_default();

        let raw_mapping = std::env::var("FORWARD_MAPPING")
            .map_err(|_| ConfigError::MissingEnvVar("FORWARD_MAPPING".into()))?;
        let forward_mapping: ForwardMapping =
            serde_json::from_str(&raw_mapping).map_err(|e| ConfigError::InvalidValue {
                key: "FORWARD_MAPPING".into(),
                message: e.to_string(),
            })?;

        let subject_prefix = std::env::var("SUBJECT_PREFIX")
            .ok()
            .filter(|s| !s.is_empty());

        let allow_plus_sign = match std::env::var("ALLOW_PLUS_SIGN") {
            Ok(v) => parse_bool("ALLOW_PLUS_SIGN", &v)?,
            Err(_) => false,
        };

        let config = Self {
            email_bucket,
            email_key_prefix,
            forward_mapping,
            subject_prefix,
            allow_plus_sign,
        };
        config.validate()?;
        Ok(config)
    }

    /// Check invariants serde cannot express.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.email_bucket.trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                key: "emailBucket".into(),
                message: "must not be empty".into(),
            });
        }
        if let Some((key, _)) = self
            .forward_mapping
            .iter()
            .find(|(_, destinations)| destinations.is_empty())
        {
            return Err(ConfigError::InvalidValue {
                key: format!("forwardMapping.{key}"),
                message: "destination list must not be empty".into(),
            });
        }
        Ok(())
    }

    /// Object key under which a received message is stored.
    pub fn message_key(&self, message_id: &str) -> String {
        format!("{}{}", self.email_key_prefix, message_id)
    }
}

fn parse_bool(key: &str, value: &str) -> Result<bool, ConfigError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" | "" => Ok(false),
        other => Err(ConfigError::InvalidValue {
            key: key.into(),
            message: format!("expected a boolean, got {other:?}"),
        }),
    }
}
