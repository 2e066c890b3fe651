//! Run the agent once, locally, on a JSON payload.
//!
//! ```text
//! local-agent '{"prompt": "How much is 100 SGD in EUR?"}'
//! ```

use agentcore_agent::agent::Agent;
use agentcore_agent::api::types::LogEntryType;
use agentcore_agent::entrypoint::{extract_prompt, extract_text, parse_payload};
use agentcore_agent::{telemetry, Config};
use clap::Parser;

#[derive(Parser, Debug)]
#[command(name = "local-agent", about = "Invoke the agent once with a JSON payload")]
struct Args {
    /// Payload such as '{"prompt": "..."}'
    payload: String,

    /// Print tool calls and results before the reply
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    telemetry::init_tracing("agentcore_agent=warn");

    let payload = parse_payload(&args.payload)?;
    let prompt = extract_prompt(&payload)?;

    let config = Config::from_env()?;
    let agent = Agent::from_config(&config).await?;
    let result = agent.invoke(prompt).await?;

    if args.verbose {
        for entry in &result.log {
            let label = match entry.entry_type {
                LogEntryType::ToolCall => "tool call",
                LogEntryType::ToolResult => "tool result",
                LogEntryType::Response => "response",
            };
            eprintln!("[{}] {}: {}", entry.timestamp, label, entry.content);
        }
        eprintln!("({} iteration(s))", result.iterations);
    }

    println!("{}", extract_text(&result)?);
    Ok(())
}
