//! Runtime for executing agents with dependency injection
//!
//! The AgentRuntime holds the resources every agent in a process shares:
//! one resolved model handle and one tool registry. Agents created from it
//! take their model and sampling settings from the handle.

use agent_core::{Context, Result};
use agent_llm::LLMProvider;
use agent_provider::ModelHandle;
use agent_tools::ToolRegistry;
use std::sync::Arc;
use tracing::debug;

use crate::agents::{SimpleAgent, SimpleConfig, ToolAgent};
use crate::executor::{AgentExecutor, ExecutorConfig};

/// Configuration for the agent runtime
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    /// Default maximum iterations for tool-using agents
    pub default_max_iterations: usize,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            default_max_iterations: 10,
        }
    }
}

/// Runtime for executing agents with dependency injection
///
/// # Example
///
/// ```no_run
/// use agent_provider::ProviderConfig;
/// use agent_runtime::AgentRuntime;
/// use agent_tools::ToolRegistry;
/// use std::sync::Arc;
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let resolution = ProviderConfig::default().process_resolver()?.resolve()?;
/// let runtime = AgentRuntime::builder()
///     .handle(resolution.handle)
///     .tool_registry(Arc::new(ToolRegistry::with_builtins()))
///     .build()?;
///
/// let simple_agent = runtime.create_simple_agent(runtime.simple_config(), "assistant");
/// let tool_agent = runtime.create_tool_agent("researcher")?;
/// # Ok(())
/// # }
/// ```
pub struct AgentRuntime {
    handle: ModelHandle,
    tool_registry: Arc<ToolRegistry>,
    config: RuntimeConfig,
}

impl AgentRuntime {
    pub fn new(handle: ModelHandle, tool_registry: Arc<ToolRegistry>) -> Self {
        Self::with_config(handle, tool_registry, RuntimeConfig::default())
    }

    pub fn with_config(
        handle: ModelHandle,
        tool_registry: Arc<ToolRegistry>,
        config: RuntimeConfig,
    ) -> Self {
        debug!(
            provider = %handle.kind(),
            model = %handle.model(),
            tool_count = tool_registry.len(),
            "Agent runtime created"
        );
        Self {
            handle,
            tool_registry,
            config,
        }
    }

    /// Create a new runtime builder
    pub fn builder() -> AgentRuntimeBuilder {
        AgentRuntimeBuilder::new()
    }

    pub fn handle(&self) -> &ModelHandle {
        &self.handle
    }

    pub fn provider(&self) -> Arc<dyn LLMProvider> {
        self.handle.provider()
    }

    pub fn tools(&self) -> &Arc<ToolRegistry> {
        &self.tool_registry
    }

    pub fn config(&self) -> &RuntimeConfig {
        &self.config
    }

    /// Context pre-filled with the provider id and model of this runtime
    pub fn context(&self) -> Context {
        Context::new()
            .with_provider(self.handle.kind().id())
            .with_model(self.handle.model())
    }

    /// Simple-agent settings derived from the handle
    pub fn simple_config(&self) -> SimpleConfig {
        SimpleConfig::for_handle(&self.handle)
    }

    /// Executor settings derived from the handle and the runtime defaults
    pub fn executor_config(&self) -> ExecutorConfig {
        ExecutorConfig::for_handle(&self.handle)
            .with_max_iterations(self.config.default_max_iterations)
    }

    /// Create a simple agent (LLM only, no tools)
    pub fn create_simple_agent(
        &self,
        config: SimpleConfig,
        name: impl Into<String>,
    ) -> SimpleAgent {
        SimpleAgent::new(self.handle.provider(), config, name)
    }

    /// Create a tool-using agent with the runtime's default executor settings
    ///
    /// # Errors
    ///
    /// Fails if the handle carries an empty model name.
    pub fn create_tool_agent(&self, name: impl Into<String>) -> Result<ToolAgent> {
        self.create_tool_agent_with(self.executor_config(), name)
    }

    /// Create a tool-using agent with explicit executor settings
    ///
    /// # Errors
    ///
    /// Fails if `config` names no model.
    pub fn create_tool_agent_with(
        &self,
        config: ExecutorConfig,
        name: impl Into<String>,
    ) -> Result<ToolAgent> {
        let executor = AgentExecutor::builder()
            .provider(self.handle.provider())
            .tool_registry(Arc::clone(&self.tool_registry))
            .config(config)
            .build()?;
        Ok(ToolAgent::new(executor, name))
    }
}

/// Builder for AgentRuntime
pub struct AgentRuntimeBuilder {
    handle: Option<ModelHandle>,
    tool_registry: Option<Arc<ToolRegistry>>,
    config: RuntimeConfig,
}

impl AgentRuntimeBuilder {
    pub fn new() -> Self {
        Self {
            handle: None,
            tool_registry: None,
            config: RuntimeConfig::default(),
        }
    }

    /// Set the resolved model handle
    pub fn handle(mut self, handle: ModelHandle) -> Self {
        self.handle = Some(handle);
        self
    }

    pub fn tool_registry(mut self, registry: Arc<ToolRegistry>) -> Self {
        self.tool_registry = Some(registry);
        self
    }

    pub fn config(mut self, config: RuntimeConfig) -> Self {
        self.config = config;
        self
    }

    pub fn default_max_iterations(mut self, max: usize) -> Self {
        self.config.default_max_iterations = max;
        self
    }

    /// Build the runtime
    ///
    /// # Errors
    ///
    /// Returns an error if no model handle was set
    pub fn build(self) -> Result<AgentRuntime> {
        let handle = self.handle.ok_or_else(|| {
            agent_core::Error::InitializationFailed("Model handle not set".to_string())
        })?;

        let tool_registry = self
            .tool_registry
            .unwrap_or_else(|| Arc::new(ToolRegistry::new()));

        Ok(AgentRuntime::with_config(handle, tool_registry, self.config))
    }
}

impl Default for AgentRuntimeBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::ScriptedProvider;
    use agent_core::Agent;
    use agent_provider::ProviderKind;

    fn handle(provider: Arc<ScriptedProvider>) -> ModelHandle {
        ModelHandle::new(ProviderKind::OpenRouter, "mistralai/mistral-7b-instruct:free", provider)
            .with_sampling(0.2, 700)
    }

    #[test]
    fn test_runtime_config_default() {
        assert_eq!(RuntimeConfig::default().default_max_iterations, 10);
    }

    #[test]
    fn test_builder_requires_handle() {
        let err = AgentRuntimeBuilder::new().build().err().unwrap();
        assert_eq!(
            err.to_string(),
            "Agent initialization failed: Model handle not set"
        );
    }

    #[test]
    fn test_configs_follow_handle() {
        let runtime = AgentRuntime::builder()
            .handle(handle(Arc::new(ScriptedProvider::new(vec![]))))
            .default_max_iterations(4)
            .build()
            .unwrap();

        assert!(runtime.tools().is_empty());
        let exec = runtime.executor_config();
        assert_eq!(exec.model, "mistralai/mistral-7b-instruct:free");
        assert_eq!(exec.max_iterations, 4);
        assert_eq!(exec.max_tokens, 700);
        assert_eq!(exec.temperature, Some(0.2));

        let simple = runtime.simple_config();
        assert_eq!(
            simple.system_prompt,
            "You are a helpful assistant powered by OpenRouter (Mistral)."
        );

        let context = runtime.context();
        assert_eq!(context.provider(), Some("openrouter"));
        assert_eq!(context.model(), Some("mistralai/mistral-7b-instruct:free"));
    }

    #[tokio::test]
    async fn test_agents_share_the_handle_provider() {
        let provider = Arc::new(ScriptedProvider::new(vec![
            ScriptedProvider::answer("one"),
            ScriptedProvider::answer("two"),
        ]));
        let runtime = AgentRuntime::new(
            handle(provider.clone()),
            Arc::new(agent_tools::ToolRegistry::with_builtins()),
        );

        let simple = runtime.create_simple_agent(runtime.simple_config(), "simple");
        let tooled = runtime.create_tool_agent("tooled").unwrap();

        let mut context = runtime.context();
        assert_eq!(simple.process("a".into(), &mut context).await.unwrap(), "one");
        assert_eq!(tooled.process("b".into(), &mut context).await.unwrap(), "two");

        let requests = provider.requests();
        assert_eq!(requests.len(), 2);
        assert!(requests[0].tools.is_none());
        assert_eq!(requests[1].tools.as_ref().map(Vec::len), Some(5));
        assert!(requests.iter().all(|r| r.max_tokens == 700));
    }
}
