//! Current date and time

use crate::Tool;
use agent_core::{Error, Result};
use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use serde::Deserialize;
use serde_json::{Value, json};
use std::fmt::Write as _;

#[derive(Debug, Default, Deserialize)]
struct TimeParams {
    /// strftime-style format, e.g. "%Y-%m-%d %H:%M"
    #[serde(default)]
    format: Option<String>,
}

/// Reports the current UTC time
#[derive(Debug, Clone, Copy, Default)]
pub struct CurrentTimeTool {
    fixed: Option<DateTime<Utc>>,
}

impl CurrentTimeTool {
    pub fn new() -> Self {
        Self::default()
    }

    /// Always report `at` instead of the clock
    pub fn fixed(at: DateTime<Utc>) -> Self {
        Self { fixed: Some(at) }
    }

    fn now(&self) -> DateTime<Utc> {
        self.fixed.unwrap_or_else(Utc::now)
    }
}

#[async_trait]
impl Tool for CurrentTimeTool {
    async fn execute(&self, params: Value) -> Result<Value> {
        // Models sometimes send `null` for a tool with no required input
        let params: TimeParams = if params.is_null() {
            TimeParams::default()
        } else {
            serde_json::from_value(params)
                .map_err(|e| Error::InvalidInput(format!("Invalid parameters: {e}")))?
        };

        let now = self.now();
        let formatted = match params.format.as_deref() {
            None | Some("") => now.to_rfc3339_opts(SecondsFormat::Secs, true),
            Some(format) => {
                let mut out = String::new();
                write!(out, "{}", now.format(format)).map_err(|_| {
                    Error::InvalidInput(format!("Invalid time format '{format}'"))
                })?;
                out
            }
        };

        Ok(json!({
            "time": formatted,
            "timezone": "UTC",
            "unix": now.timestamp(),
        }))
    }

    fn name(&self) -> &str {
        "current_time"
    }

    fn description(&self) -> &str {
        "Get the current date and time in UTC. Optionally pass a strftime format."
    }

    fn input_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "format": {
                    "type": "string",
                    "description": "Optional strftime format, e.g. \"%Y-%m-%d\". Defaults to RFC 3339."
                }
            }
        })
    }
}
