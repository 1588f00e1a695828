use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use rmcp::{transport::stdio, ServiceExt};
use toolgate::{observability, Args, HttpUpstream, ServerConfig, ToolsetServer};
use toolgate_toolsets::{default_catalog, FeatureFlags, Inventory, ToolDeps};
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    let config = ServerConfig::load(&args).await?;
    observability::init_logging(&config.log).context("failed to initialize logging")?;

    info!(
        api_url = %config.api_url,
        toolsets = ?config.toolsets,
        dynamic = config.dynamic_toolsets,
        read_only = config.read_only,
        "Starting toolgate"
    );

    let translator = config.translator();
    let upstream = Arc::new(HttpUpstream::new(&config.api_url, config.token.clone())?);
    let filter = match config.explicit_scope_filter() {
        Some(filter) => filter,
        None => upstream.scope_filter().await,
    };

    let catalog = Arc::new(default_catalog(&translator)?);
    let inventory = Inventory::builder(catalog)
        .with_toolsets(config.toolsets.iter().cloned())
        .with_dynamic(config.dynamic_toolsets)
        .with_read_only(config.read_only)
        .with_scope_filter(filter)
        .build()?;

    let deps = ToolDeps::new(upstream)
        .with_flags(FeatureFlags {
            read_only: config.read_only,
        })
        .with_translator(translator);
    let server = ToolsetServer::new(Arc::new(inventory), deps)?;

    let service = server
        .serve(stdio())
        .await
        .context("failed to start MCP service")?;
    let reason = service.waiting().await?;
    info!(?reason, "MCP service stopped");
    Ok(())
}
