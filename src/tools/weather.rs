//! Dummy weather tool.

use async_trait::async_trait;
use serde_json::{json, Value};

use super::Tool;

/// Always reports sunny weather.
pub struct Weather;

#[async_trait]
impl Tool for Weather {
    fn name(&self) -> &str {
        "weather"
    }

    fn description(&self) -> &str {
        "Get weather"
    }

    fn parameters_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {}
        })
    }

    async fn execute(&self, _args: Value) -> anyhow::Result<String> {
        Ok("sunny".to_string())
    }
}
