//! Lambda-style request handling
//!
//! Accepts the event shapes API Gateway and direct invocation produce and
//! answers with `{statusCode, headers, body}`.

use serde::Serialize;
use serde_json::{Value, json};
use std::collections::BTreeMap;
use std::future::Future;
use tracing::error;

pub const DEFAULT_PROMPT: &str = "Tell me about agentic AI in exactly 50 words";

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LambdaResponse {
    pub status_code: u16,
    pub headers: BTreeMap<String, String>,
    /// JSON document, serialized
    pub body: String,
}

impl LambdaResponse {
    fn new(status_code: u16, body: &Value) -> Self {
        let headers = BTreeMap::from([
            ("Access-Control-Allow-Origin".to_string(), "*".to_string()),
            ("Content-Type".to_string(), "application/json".to_string()),
        ]);
        Self {
            status_code,
            headers,
            body: body.to_string(),
        }
    }

    pub fn ok(prompt: &str, message: &str) -> Self {
        Self::new(200, &json!({ "message": message, "prompt": prompt }))
    }

    pub fn internal_error(error: &str) -> Self {
        Self::new(
            500,
            &json!({ "error": error, "message": "Internal server error" }),
        )
    }
}

fn as_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Prompt carried by `event`
///
/// Looks at `prompt`, then at `body.prompt` where `body` may be a JSON
/// string or an object, and falls back to [`DEFAULT_PROMPT`]. Any event that
/// is not an object is used as the prompt itself.
pub fn extract_prompt(event: &Value) -> anyhow::Result<String> {
    let Value::Object(fields) = event else {
        return Ok(as_text(event));
    };

    if let Some(prompt) = fields.get("prompt") {
        return Ok(as_text(prompt));
    }

    let Some(body) = fields.get("body") else {
        return Ok(DEFAULT_PROMPT.to_string());
    };
    let body = match body {
        Value::String(raw) => serde_json::from_str(raw)?,
        other => other.clone(),
    };
    match body {
        Value::Object(body) => Ok(body
            .get("prompt")
            .map_or_else(|| DEFAULT_PROMPT.to_string(), as_text)),
        other => anyhow::bail!("request body must be a JSON object, got {other}"),
    }
}

/// Answer `event` with `respond`, turning any failure into a 500
pub async fn handle_event<F, Fut>(event: &Value, respond: F) -> LambdaResponse
where
    F: FnOnce(String) -> Fut,
    Fut: Future<Output = anyhow::Result<String>>,
{
    let prompt = match extract_prompt(event) {
        Ok(prompt) => prompt,
        Err(e) => {
            error!(error = %e, "Rejecting event");
            return LambdaResponse::internal_error(&e.to_string());
        }
    };

    match respond(prompt.clone()).await {
        Ok(message) => LambdaResponse::ok(&prompt, &message),
        Err(e) => {
            error!(error = %e, "Handler failed");
            LambdaResponse::internal_error(&format!("{e:#}"))
        }
    }
}
