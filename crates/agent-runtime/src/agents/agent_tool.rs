//! Agents as tools
//!
//! Wrapping a specialist agent in [`AgentTool`] lets an orchestrating agent
//! call it like any other tool: the model sends `{"query": "..."}` and gets
//! the specialist's reply back as the tool result.

use agent_core::{Agent, Context, Error, Result};
use agent_tools::Tool;
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{Value, json};
use std::sync::Arc;
use tracing::info;

#[derive(Debug, Deserialize)]
struct AgentToolParams {
    query: String,
}

/// Exposes an [`Agent`] through the [`Tool`] trait
pub struct AgentTool {
    agent: Arc<dyn Agent>,
}

impl AgentTool {
    pub fn new(agent: Arc<dyn Agent>) -> Self {
        Self { agent }
    }
}

#[async_trait]
impl Tool for AgentTool {
    async fn execute(&self, params: Value) -> Result<Value> {
        let params: AgentToolParams = serde_json::from_value(params)
            .map_err(|e| Error::InvalidInput(format!("Invalid parameters: {e}")))?;

        info!(agent = %self.agent.name(), "Delegating to agent");
        // Each delegated call starts from an empty context
        let mut context = Context::new();
        let reply = self.agent.process(params.query, &mut context).await?;
        Ok(Value::String(reply))
    }

    fn name(&self) -> &str {
        self.agent.name()
    }

    fn description(&self) -> &str {
        self.agent.description()
    }

    fn input_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "query": {
                    "type": "string",
                    "description": "The request to hand to this agent"
                }
            },
            "required": ["query"]
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::executor::AgentExecutor;
    use crate::testing::ScriptedProvider;
    use crate::ToolAgent;
    use agent_tools::ToolRegistry;

    struct Shout;

    #[async_trait]
    impl Agent for Shout {
        async fn process(&self, input: String, _context: &mut Context) -> Result<String> {
            if input.is_empty() {
                return Err(Error::ProcessingFailed("nothing to shout".to_string()));
            }
            Ok(input.to_uppercase())
        }

        fn name(&self) -> &str {
            "shouter"
        }

        fn description(&self) -> &str {
            "Repeats the query in capitals"
        }
    }

    #[tokio::test]
    async fn test_wraps_agent() {
        let tool = AgentTool::new(Arc::new(Shout));
        assert_eq!(tool.name(), "shouter");
        assert_eq!(tool.definition().description, "Repeats the query in capitals");

        let out = tool.execute(json!({"query": "hello"})).await.unwrap();
        assert_eq!(out, json!("HELLO"));
    }

    #[tokio::test]
    async fn test_bad_params_and_agent_errors() {
        let tool = AgentTool::new(Arc::new(Shout));
        let err = tool.execute(json!({"topic": "x"})).await.unwrap_err();
        assert!(matches!(err, Error::InvalidInput(_)));

        let err = tool.execute(json!({"query": ""})).await.unwrap_err();
        assert_eq!(err.to_string(), "Agent processing failed: nothing to shout");
    }

    #[tokio::test]
    async fn test_orchestrator_calls_specialist() {
        let provider = Arc::new(ScriptedProvider::new(vec![
            ScriptedProvider::tool_call("1", "shouter", json!({"query": "agents"})),
            ScriptedProvider::answer("The specialist said AGENTS."),
        ]));
        let registry = ToolRegistry::new().with_tool(Arc::new(AgentTool::new(Arc::new(Shout))));
        let orchestrator = ToolAgent::new(
            AgentExecutor::builder()
                .provider(provider.clone())
                .tool_registry(Arc::new(registry))
                .model("m")
                .build()
                .unwrap(),
            "orchestrator",
        );

        let out = orchestrator
            .process("Ask the shouter about agents".to_string(), &mut Context::new())
            .await
            .unwrap();
        assert_eq!(out, "The specialist said AGENTS.");

        let requests = provider.requests();
        let result = requests[1].messages[2].clone();
        assert_eq!(
            result.content,
            Some(agent_llm::MessageContent::Blocks(vec![
                agent_llm::ContentBlock::ToolResult {
                    tool_use_id: "1".into(),
                    content: "AGENTS".into(),
                    is_error: None,
                }
            ]))
        );
    }
}
