use std::sync::Arc;

use anyhow::Context;
use lambda_runtime::{LambdaEvent, service_fn};
use ses_forwarder::services::{S3ObjectStore, SesMailSender};
use ses_forwarder::{Forwarder, ForwarderConfig};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Lambda ships stdout to CloudWatch: no colors, no local timestamps.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .with_ansi(false)
        .without_time()
        .init();

    let config = ForwarderConfig::from_env().context("Failed to load forwarder configuration")?;

    let sdk_config = aws_config::load_from_env().await;
    let forwarder = Arc::new(Forwarder::new(
        config,
        Arc::new(S3ObjectStore::from_sdk_config(&sdk_config)),
        Arc::new(SesMailSender::from_sdk_config(&sdk_config)),
    ));

    let config = forwarder.config();
    tracing::info!(
        bucket = %config.email_bucket,
        prefix = %config.email_key_prefix,
        mappings = config.forward_mapping.len(),
        "SES forwarder v{} starting",
        env!("CARGO_PKG_VERSION")
    );

    lambda_runtime::run(service_fn(move |event: LambdaEvent<serde_json::Value>| {
        let forwarder = Arc::clone(&forwarder);
        async move { forwarder.handle_lambda(event).await }
    }))
    .await
    .map_err(|e| anyhow::anyhow!("Lambda runtime failed: {e}"))
}
