//! AgentCore Agent - Runtime Server Entry Point
//!
//! Serves `POST /invocations` and `GET /ping` on port 8080.

use agentcore_agent::{api, telemetry, Config};
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    telemetry::init_tracing("agentcore_agent=info,tower_http=info");

    let config = Config::from_env()?;
    info!("Loaded configuration: model={}", config.model_id);

    api::serve(config).await?;

    Ok(())
}
