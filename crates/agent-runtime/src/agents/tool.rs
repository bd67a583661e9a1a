//! Tool agent implementation (wraps AgentExecutor)

use crate::executor::{AgentExecutor, ExecutorEventHandler};
use agent_core::{Agent, Context, Result};
use async_trait::async_trait;
use std::sync::Arc;

/// An agent that uses the LLM loop with tool execution
///
/// ToolAgent wraps the [`AgentExecutor`] to provide the Agent trait
/// interface. Use it when the model needs tools to answer.
///
/// # Example
///
/// ```no_run
/// use agent_core::{Agent, Context};
/// use agent_provider::ProviderConfig;
/// use agent_runtime::AgentRuntime;
/// use agent_tools::ToolRegistry;
/// use std::sync::Arc;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let resolution = ProviderConfig::default().process_resolver()?.resolve()?;
/// let runtime = AgentRuntime::new(resolution.handle, Arc::new(ToolRegistry::with_builtins()));
///
/// let agent = runtime.create_tool_agent("assistant")?;
/// let mut context = Context::new();
/// let response = agent.process("What is 15 * 23?".to_string(), &mut context).await?;
/// # Ok(())
/// # }
/// ```
pub struct ToolAgent {
    executor: AgentExecutor,
    name: String,
    description: Option<String>,
}

impl ToolAgent {
    pub fn new(executor: AgentExecutor, name: impl Into<String>) -> Self {
        Self {
            executor,
            name: name.into(),
            description: None,
        }
    }

    /// Description shown when this agent is used as a tool
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Report tool calls made while answering to `handler`
    pub fn with_event_handler(mut self, handler: Arc<dyn ExecutorEventHandler>) -> Self {
        self.executor = self.executor.with_event_handler(handler);
        self
    }

    pub fn executor(&self) -> &AgentExecutor {
        &self.executor
    }
}

#[async_trait]
impl Agent for ToolAgent {
    async fn process(&self, input: String, _context: &mut Context) -> Result<String> {
        self.executor.run(input).await
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn description(&self) -> &str {
        self.description
            .as_deref()
            .unwrap_or("A helpful assistant agent")
    }
}
