use std::sync::Arc;

use anyhow::{anyhow, Context};
use media_list_engine::models::ListDomain;
use media_list_engine::services::{JsonFilePreferenceStore, MemoryLocation};
use media_list_engine::{EngineConfig, GraphqlClient, ListController, ListOptions};

const USAGE: &str = "usage: media-list <scenes|performers|studios|movies|galleries|scene_markers> [query-string]";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    // Load environment variables
    dotenv::dotenv().ok();
    let config = EngineConfig::from_env();

    let mut args = std::env::args().skip(1);
    let domain = args.next().ok_or_else(|| anyhow!(USAGE))?;
    let domain = ListDomain::from_str(&domain).ok_or_else(|| anyhow!("unknown list {:?}\n{}", domain, USAGE))?;
    let query_string = args.next().unwrap_or_default();

    let client = Arc::new(GraphqlClient::with_timeout(
        config.graphql_url.clone(),
        config.api_key.clone(),
        config.request_timeout,
    )?);
    let store = JsonFilePreferenceStore::load(&config.preferences_path)
        .await
        .with_context(|| format!("loading preferences from {:?}", config.preferences_path))?;

    let mut controller = ListController::new(
        domain,
        client,
        Arc::new(store),
        MemoryLocation::new(query_string),
        ListOptions::from_config(&config),
    );

    let pending = controller.initialize().await?;
    controller.complete(pending).await;

    if let Some(e) = controller.error() {
        tracing::error!("Failed to load {} from {}: {}", domain, config.graphql_url, e);
    }

    println!("{}", serde_json::to_string_pretty(&controller.view())?);
    Ok(())
}
