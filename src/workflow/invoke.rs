//! Invoke the deployed default agent.

use serde_json::{json, Value};

use crate::cloud::{find_runtime, RuntimeControl, RuntimeInvoker, RuntimeSummary};
use crate::project::ResolvedAgent;

pub const DEFAULT_PROMPT: &str = "Who founded AWS?";

/// Region used when the project file names none.
pub const DEFAULT_REGION: &str = "us-east-1";

/// Decoded invoke response body.
#[derive(Debug, Clone, PartialEq)]
pub enum InvokeBody {
    Empty,
    /// `data:` payloads of a `text/event-stream`, one per line
    EventStream(String),
    Json(Value),
    Text(String),
}

#[derive(Debug, Clone)]
pub struct InvokeReport {
    pub agent_arn: String,
    pub raw_len: usize,
    pub body: InvokeBody,
}

/// Every runtime visible in the region.
pub async fn list_agents(control: &dyn RuntimeControl) -> anyhow::Result<Vec<RuntimeSummary>> {
    let runtimes = control.list_runtimes().await?;
    tracing::info!(count = runtimes.len(), "Found deployed agent(s)");
    Ok(runtimes)
}

/// One `  - {name}: {status}` line per runtime.
pub fn format_runtime_list(runtimes: &[RuntimeSummary]) -> String {
    runtimes
        .iter()
        .map(|r| format!("  - {}: {}", r.name, r.status))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Pick the agent's runtime from `runtimes` by name and send it `prompt`.
pub async fn invoke_agent(
    agent: &ResolvedAgent,
    prompt: &str,
    runtimes: &[RuntimeSummary],
    invoker: &dyn RuntimeInvoker,
) -> anyhow::Result<InvokeReport> {
    let agent_arn = find_runtime(runtimes, &agent.name)
        .map(|r| r.arn.clone())
        .ok_or_else(|| {
            let available: Vec<String> = runtimes
                .iter()
                .map(|r| format!("{} ({})", r.name, r.status))
                .collect();
            anyhow::anyhow!(
                "Agent '{}' not found. Available agents: [{}]",
                agent.name,
                available.join(", ")
            )
        })?;

    let output = invoker
        .invoke(&agent_arn, &json!({ "prompt": prompt }))
        .await?;

    Ok(InvokeReport {
        agent_arn,
        raw_len: output.body.len(),
        body: decode_body(&output.content_type, &output.body),
    })
}

/// Interpret a response body by content type.
pub fn decode_body(content_type: &str, body: &[u8]) -> InvokeBody {
    if body.is_empty() {
        return InvokeBody::Empty;
    }

    let text = String::from_utf8_lossy(body);

    if content_type.contains("text/event-stream") {
        let lines: Vec<&str> = text
            .lines()
            .filter_map(|line| line.strip_prefix("data: "))
            .collect();
        return InvokeBody::EventStream(lines.join("\n"));
    }

    match serde_json::from_str::<Value>(&text) {
        Ok(value) => InvokeBody::Json(value),
        Err(_) => InvokeBody::Text(text.into_owned()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cloud::fakes::{FakeControl, FakeInvoker};

    fn resolved(name: &str) -> ResolvedAgent {
        ResolvedAgent {
            key: name.to_string(),
            name: name.to_string(),
            region: DEFAULT_REGION.to_string(),
            agent_id: None,
            agent_arn: None,
        }
    }

    #[tokio::test]
    async fn invokes_runtime_matching_name() {
        let control = FakeControl::with_runtime("my_strands_agent", None);
        let invoker = FakeInvoker::replying("application/json", r#""Jeff Bezos founded AWS.""#);

        let runtimes = list_agents(&control).await.unwrap();
        let report = invoke_agent(
            &resolved("my_strands_agent"),
            DEFAULT_PROMPT,
            &runtimes,
            &invoker,
        )
        .await
        .unwrap();

        let calls = invoker.calls.lock().unwrap();
        assert_eq!(calls[0].0, report.agent_arn);
        assert_eq!(calls[0].1, json!({"prompt": "Who founded AWS?"}));
        assert_eq!(report.body, InvokeBody::Json(json!("Jeff Bezos founded AWS.")));
    }

    #[tokio::test]
    async fn unknown_agent_still_lists_runtimes() {
        let control = FakeControl::with_runtime("other_agent", None);
        let invoker = FakeInvoker::replying("application/json", "{}");

        let runtimes = list_agents(&control).await.unwrap();
        assert_eq!(format_runtime_list(&runtimes), "  - other_agent: READY");

        let err = invoke_agent(&resolved("my_strands_agent"), "hi", &runtimes, &invoker)
            .await
            .unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("Agent 'my_strands_agent' not found"));
        assert!(msg.contains("other_agent (READY)"));
        assert!(invoker.calls.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn list_failure_is_an_error() {
        let control = FakeControl {
            fail_list: true,
            ..Default::default()
        };
        assert!(list_agents(&control).await.is_err());
    }

    #[test]
    fn decodes_event_stream_data_lines() {
        let body = b"data: Hello\n\ndata: world\nevent: done\n";
        assert_eq!(
            decode_body("text/event-stream; charset=utf-8", body),
            InvokeBody::EventStream("Hello\nworld".to_string())
        );
    }

    #[test]
    fn falls_back_to_plain_text() {
        assert_eq!(
            decode_body("text/plain", b"just words"),
            InvokeBody::Text("just words".to_string())
        );
        assert_eq!(decode_body("application/json", b""), InvokeBody::Empty);
    }
}
