//! Send a test prompt to the deployed default agent.

use std::path::PathBuf;
use std::process::ExitCode;

use agentcore_agent::cloud::{load_sdk_config, AgentCoreControl, AgentCoreData};
use agentcore_agent::project::{ProjectConfig, PROJECT_FILE};
use agentcore_agent::telemetry;
use agentcore_agent::workflow::invoke::{
    format_runtime_list, invoke_agent, list_agents, InvokeBody, InvokeReport, DEFAULT_PROMPT,
    DEFAULT_REGION,
};
use clap::Parser;

#[derive(Parser, Debug)]
#[command(name = "test-invoke", about = "Invoke the deployed agent")]
struct Args {
    #[arg(long, default_value = DEFAULT_PROMPT)]
    prompt: String,

    #[arg(long, default_value = ".")]
    project_dir: PathBuf,
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();
    telemetry::init_tracing("agentcore_agent=info");

    match run(&args).await {
        Ok(report) => {
            print_report(&report);
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("Error: {:#}", e);
            eprintln!();
            eprintln!("Troubleshooting:");
            eprintln!("1. Check that the agent was deployed (run `deploy`)");
            eprintln!("2. Verify AWS credentials and region");
            eprintln!("3. Check the runtime status in the AgentCore console");
            ExitCode::FAILURE
        }
    }
}

async fn run(args: &Args) -> anyhow::Result<InvokeReport> {
    let project = ProjectConfig::load(&args.project_dir.join(PROJECT_FILE))?;
    let agent = project.resolve_default(DEFAULT_REGION)?;

    println!("Agent: {}", agent.name);
    println!("Region: {}", agent.region);

    let sdk_config = load_sdk_config(Some(agent.region.clone())).await;
    let control = AgentCoreControl::new(&sdk_config);
    let invoker = AgentCoreData::new(&sdk_config);

    let runtimes = list_agents(&control).await?;
    println!("Found {} agent(s):", runtimes.len());
    if !runtimes.is_empty() {
        println!("{}", format_runtime_list(&runtimes));
    }

    println!("Prompt: {}", args.prompt);
    invoke_agent(&agent, &args.prompt, &runtimes, &invoker).await
}

fn print_report(report: &InvokeReport) {
    println!("Agent ARN: {}", report.agent_arn);
    println!("Response bytes: {}", report.raw_len);

    match &report.body {
        InvokeBody::Empty => println!("Empty response received!"),
        InvokeBody::EventStream(text) | InvokeBody::Text(text) => {
            println!("Response: {}", text)
        }
        InvokeBody::Json(value) => match serde_json::to_string_pretty(value) {
            Ok(pretty) => println!("Response: {}", pretty),
            Err(_) => println!("Response: {}", value),
        },
    }
}
