//! Configure and launch the agent on Bedrock AgentCore.

use std::path::PathBuf;
use std::time::Duration;

use agentcore_agent::cloud::{
    load_sdk_config, sdk_region, AgentCoreControl, DockerCli, EcrRegistry,
};
use agentcore_agent::telemetry;
use agentcore_agent::workflow::deploy::{
    configure, launch, wait_until_ready, DeployOptions, DEFAULT_PLATFORM,
};
use clap::Parser;

#[derive(Parser, Debug)]
#[command(name = "deploy", about = "Deploy the agent to Bedrock AgentCore")]
struct Args {
    /// Runtime name
    #[arg(long, default_value = "my_strands_agent")]
    agent_name: String,

    /// AWS region (defaults to the SDK's resolved region)
    #[arg(long, env = "AWS_REGION")]
    region: Option<String>,

    /// IAM role the runtime assumes
    #[arg(long, env = "AGENTCORE_EXECUTION_ROLE")]
    execution_role: String,

    #[arg(long, default_value = DEFAULT_PLATFORM)]
    platform: String,

    /// Directory holding the project file and build context
    #[arg(long, default_value = ".")]
    project_dir: PathBuf,

    /// Poll until the runtime is READY (or failed)
    #[arg(long)]
    wait: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    telemetry::init_tracing("agentcore_agent=info");

    let sdk_config = load_sdk_config(args.region.clone()).await;
    let region = sdk_region(&sdk_config)
        .ok_or_else(|| anyhow::anyhow!("No AWS region configured; pass --region"))?;

    let opts = DeployOptions {
        agent_name: args.agent_name,
        region,
        execution_role: args.execution_role,
        platform: args.platform,
        project_dir: args.project_dir,
    };

    println!("Configuring agent '{}' in {}...", opts.agent_name, opts.region);
    let mut project = configure(&opts)?;

    println!("Launching...");
    let control = AgentCoreControl::new(&sdk_config);
    let registry = EcrRegistry::new(&sdk_config);
    let result = launch(&opts, &mut project, &control, &registry, &DockerCli::new()).await?;

    println!("Agent ARN: {}", result.agent_arn);
    println!("Image: {}", result.ecr_uri);

    if args.wait {
        let status =
            wait_until_ready(&control, &result.agent_id, Duration::from_secs(10), 60).await?;
        println!("Status: {}", status);
        if status != "READY" {
            anyhow::bail!("Runtime ended in status {}", status);
        }
    } else {
        println!("Status: {}", result.status);
    }

    Ok(())
}
