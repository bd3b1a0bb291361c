use anyhow::{bail, Context, Result};
use clap::Parser;
use intent_bridge::command::{find_descriptor, CommandExecutor};
use intent_bridge::config::BridgeConfig;
use intent_bridge::registry::MemoryRegistry;
use intent_bridge_shared::{CommandRequest, Item};
use serde::de::DeserializeOwned;
use std::path::Path;
use std::sync::Arc;

use tracing::{info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing; stdout is reserved for the outcome JSON
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into()))
        .init();

    let config = BridgeConfig::parse();

    let items: Vec<Item> = read_json(&config.items).await?;
    let request: CommandRequest = read_json(&config.request).await?;
    info!(
        "Loaded {} item(s), request {} for {} device(s)",
        items.len(),
        request.command,
        request.devices.len()
    );

    if request.devices.is_empty() {
        warn!("Request targets no devices");
    }

    let Some(descriptor) = find_descriptor(&request.command, &request.params) else {
        bail!(
            "no command descriptor handles {} with params {}",
            request.command,
            serde_json::Value::Object(request.params.clone())
        );
    };

    let mut registry = MemoryRegistry::with_items(items);
    if config.frozen {
        registry = registry.frozen();
    }
    let registry = Arc::new(registry);
    let executor = CommandExecutor::new(registry.clone());

    let outcomes = executor
        .execute(
            descriptor,
            &request.devices,
            &request.params,
            request.challenge.as_ref(),
        )
        .await;

    for sent in registry.sent().await {
        info!("  sent {} = {}", sent.item_name, sent.value);
    }

    let output = serde_json::to_string_pretty(&outcomes).context("Failed to encode outcomes")?;
    println!("{output}");
    Ok(())
}

async fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let raw = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read {}", path.display()))?;
    serde_json::from_str(&raw).with_context(|| format!("Failed to parse {}", path.display()))
}
