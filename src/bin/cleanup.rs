//! Remove the deployed agent, its image repository and local artifacts.

use std::path::PathBuf;
use std::time::Duration;

use agentcore_agent::cloud::{load_sdk_config, sdk_region, AgentCoreControl, EcrRegistry};
use agentcore_agent::project::{ProjectConfig, PROJECT_FILE};
use agentcore_agent::telemetry;
use agentcore_agent::workflow::cleanup::{
    cleanup_agent, verify_cleanup, CleanupReport, RuntimeOutcome, VerifyReport,
};
use clap::Parser;

#[derive(Parser, Debug)]
#[command(name = "cleanup", about = "Delete the agent and its AWS resources")]
struct Args {
    #[arg(long, default_value = ".")]
    project_dir: PathBuf,

    /// Seconds to wait after deleting the runtime
    #[arg(long, default_value_t = 15)]
    settle_secs: u64,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    telemetry::init_tracing("agentcore_agent=info");

    println!("AgentCore cleanup");
    println!("=================");

    let project = ProjectConfig::load_optional(&args.project_dir.join(PROJECT_FILE))?;

    // Verification runs in the project's region, or the SDK default.
    let region = match project {
        None => {
            println!("No {} found. Nothing to clean up.", PROJECT_FILE);
            None
        }
        Some(project) => {
            let session_region = sdk_region(&load_sdk_config(None).await);
            let agent = project.resolve_default_in(session_region.as_deref())?;

            let sdk_config = load_sdk_config(Some(agent.region.clone())).await;
            let report = cleanup_agent(
                &agent,
                &args.project_dir,
                &AgentCoreControl::new(&sdk_config),
                &EcrRegistry::new(&sdk_config),
                Duration::from_secs(args.settle_secs),
            )
            .await?;
            print_cleanup(&report);
            Some(agent.region)
        }
    };

    let sdk_config = load_sdk_config(region).await;
    if sdk_region(&sdk_config).is_none() {
        anyhow::bail!("No AWS region configured; set AWS_REGION");
    }
    let verify = verify_cleanup(
        &AgentCoreControl::new(&sdk_config),
        &EcrRegistry::new(&sdk_config),
    )
    .await;
    print_verify(&verify);

    Ok(())
}

fn print_cleanup(report: &CleanupReport) {
    println!("Agent: {}", report.agent_name);
    match &report.runtime {
        RuntimeOutcome::NotFound => println!("Agent runtime not found (may already be deleted)"),
        RuntimeOutcome::Deleted { id, status } => {
            println!("Deleted runtime {} (status: {})", id, status)
        }
    }
    if let Some(repo) = &report.repository {
        match &repo.result {
            Ok(arn) => println!("Deleted ECR repository {} ({})", repo.name, arn),
            Err(e) => println!("Could not delete ECR repository {}: {}", repo.name, e),
        }
    }
    for file in &report.local_files {
        println!("Removed {}", file);
    }
}

fn print_verify(report: &VerifyReport) {
    println!();
    println!("Verifying cleanup...");
    match &report.runtimes {
        Ok(runtimes) if runtimes.is_empty() => println!("No agent runtimes remain"),
        Ok(runtimes) => {
            println!("{} agent runtime(s) remain:", runtimes.len());
            for runtime in runtimes {
                println!("  - {} ({})", runtime.name, runtime.status);
            }
        }
        Err(e) => println!("Could not list runtimes: {}", e),
    }
    match &report.repositories {
        Ok(repos) if repos.is_empty() => println!("No agent ECR repositories remain"),
        Ok(repos) => {
            println!("{} agent ECR repositories remain:", repos.len());
            for repo in repos {
                println!("  - {}", repo);
            }
        }
        Err(e) => println!("Could not list ECR repositories: {}", e),
    }
}
