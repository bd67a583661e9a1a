//! Agent executor for running agent loops
//!
//! The AgentExecutor implements the core agent loop pattern:
//! 1. Call the model with the conversation and the available tools
//! 2. Check the stop reason
//! 3. If tool use was requested, run the tools and loop back
//! 4. Otherwise return the final text

use agent_core::Result;
use agent_llm::{
    CompletionRequest, ContentBlock, LLMProvider, Message, MessageContent, Role, StopReason,
    ToolDefinition,
};
use agent_provider::ModelHandle;
use agent_tools::ToolRegistry;
use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};

/// Returned when the loop hits `max_iterations`
pub const MAX_ITERATIONS_MESSAGE: &str = "Max iterations reached without completion";

/// Returned when the model stops on its token limit without any text
pub const TRUNCATED_MESSAGE: &str = "Response truncated due to token limit";

const DEFAULT_SYSTEM_PROMPT: &str = "You are a helpful assistant.";

/// Event handler for agent execution events
///
/// Implement this trait to receive callbacks during agent execution,
/// e.g. to show tool calls as they happen.
#[async_trait]
pub trait ExecutorEventHandler: Send + Sync {
    /// Called when a tool execution starts
    async fn on_tool_start(&self, _id: &str, _name: &str, _input: &Value) {}

    /// Called when a tool execution completes
    async fn on_tool_done(
        &self,
        _id: &str,
        _name: &str,
        _result: std::result::Result<&Value, &str>,
        _duration_ms: u64,
    ) {
    }

    /// Called when the agent completes
    async fn on_complete(&self, _result: &str) {}

    /// Called when the model call fails
    async fn on_error(&self, _error: &str) {}
}

/// No-op event handler for when events are not needed
pub struct NoOpEventHandler;

#[async_trait]
impl ExecutorEventHandler for NoOpEventHandler {}

/// Configuration for agent execution
#[derive(Debug, Clone)]
pub struct ExecutorConfig {
    /// Maximum number of model calls (prevents infinite loops)
    pub max_iterations: usize,

    pub model: String,

    pub system_prompt: Option<String>,

    /// Max tokens per completion
    pub max_tokens: usize,

    pub temperature: Option<f32>,
}

impl Default for ExecutorConfig {
    fn default() -> Self {
        Self {
            max_iterations: 10,
            model: String::new(),
            system_prompt: None,
            max_tokens: agent_provider::catalog::DEFAULT_MAX_TOKENS,
            temperature: Some(agent_provider::catalog::DEFAULT_TEMPERATURE),
        }
    }
}

impl ExecutorConfig {
    /// Model, sampling settings and assistant prompt taken from a resolved handle
    pub fn for_handle(handle: &ModelHandle) -> Self {
        Self {
            model: handle.model().to_string(),
            system_prompt: Some(handle.kind().assistant_prompt()),
            max_tokens: handle.max_tokens(),
            temperature: Some(handle.temperature()),
            ..Self::default()
        }
    }

    pub fn with_system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.system_prompt = Some(prompt.into());
        self
    }

    pub fn with_max_iterations(mut self, max: usize) -> Self {
        self.max_iterations = max;
        self
    }
}

/// Executes an agent loop: LLM → tool calls → execution → loop back
///
/// The AgentExecutor orchestrates the interaction between an LLM provider
/// and a tool registry.
pub struct AgentExecutor {
    provider: Arc<dyn LLMProvider>,
    tool_registry: Arc<ToolRegistry>,
    config: ExecutorConfig,
    event_handler: Option<Arc<dyn ExecutorEventHandler>>,
}

impl AgentExecutor {
    pub fn new(
        provider: Arc<dyn LLMProvider>,
        tool_registry: Arc<ToolRegistry>,
        config: ExecutorConfig,
    ) -> Self {
        Self {
            provider,
            tool_registry,
            config,
            event_handler: None,
        }
    }

    /// Create a new builder
    pub fn builder() -> AgentExecutorBuilder {
        AgentExecutorBuilder::new()
    }

    /// Set the event handler for receiving execution events
    pub fn with_event_handler(mut self, handler: Arc<dyn ExecutorEventHandler>) -> Self {
        self.event_handler = Some(handler);
        self
    }

    pub fn config(&self) -> &ExecutorConfig {
        &self.config
    }

    pub fn tools(&self) -> &Arc<ToolRegistry> {
        &self.tool_registry
    }

    /// Execute the agent loop with a user query
    ///
    /// Returns the final response once the model stops asking for tools.
    pub async fn run(&self, user_message: String) -> Result<String> {
        self.run_with_history(user_message, Vec::new()).await
    }

    /// Execute the agent loop after previous conversation messages
    pub async fn run_with_history(
        &self,
        user_message: String,
        history: Vec<Message>,
    ) -> Result<String> {
        let mut conversation = history;
        conversation.push(Message::user(user_message));
        self.run_conversation(conversation, self.event_handler.clone())
            .await
    }

    /// Like [`run_with_history`](Self::run_with_history) with a per-call handler
    pub async fn run_with_history_and_handler(
        &self,
        user_message: String,
        history: Vec<Message>,
        handler: Arc<dyn ExecutorEventHandler>,
    ) -> Result<String> {
        let mut conversation = history;
        conversation.push(Message::user(user_message));
        self.run_conversation(conversation, Some(handler)).await
    }

    async fn run_conversation(
        &self,
        initial_conversation: Vec<Message>,
        event_handler: Option<Arc<dyn ExecutorEventHandler>>,
    ) -> Result<String> {
        let mut conversation = initial_conversation;
        let tools = self.tool_registry.definitions();
        debug!(tool_count = tools.len(), "Available tools");

        for iteration in 1..=self.config.max_iterations {
            info!(
                iteration,
                max_iterations = self.config.max_iterations,
                "Agent iteration started"
            );

            if let Some(last_msg) = conversation.last() {
                let msg_preview = preview(&last_msg.text().unwrap_or_default(), 200);
                debug!(
                    role = ?last_msg.role,
                    message_preview = %msg_preview,
                    "Processing message"
                );
            }

            let request = self.build_request(&conversation, &tools);
            info!(
                provider = %self.provider.name(),
                model = %self.config.model,
                max_tokens = self.config.max_tokens,
                temperature = ?self.config.temperature,
                tool_count = tools.len(),
                "Sending request to LLM"
            );

            let response = match self.provider.complete(request).await {
                Ok(response) => response,
                Err(e) => {
                    if let Some(handler) = &event_handler {
                        handler.on_error(&e.to_string()).await;
                    }
                    return Err(agent_core::Error::ProcessingFailed(e.to_string()));
                }
            };

            info!(
                stop_reason = ?response.stop_reason,
                input_tokens = response.usage.input_tokens,
                output_tokens = response.usage.output_tokens,
                "LLM response received"
            );

            let text = response.message.text();
            debug!(
                response_preview = %preview(text.as_deref().unwrap_or_default(), 300),
                "LLM response content preview"
            );

            match response.stop_reason {
                StopReason::ToolUse if response.message.has_tool_uses() => {
                    let results = self
                        .execute_tools(&response.message, event_handler.as_ref())
                        .await;
                    info!(
                        result_count = results.len(),
                        "Tool execution completed, continuing agent loop"
                    );
                    conversation.push(response.message);
                    conversation.push(Message {
                        role: Role::User,
                        content: Some(MessageContent::Blocks(results)),
                    });
                }

                StopReason::MaxTokens => {
                    warn!("Hit max tokens in LLM response");
                    return Ok(text.unwrap_or_else(|| TRUNCATED_MESSAGE.to_string()));
                }

                stop_reason => {
                    if stop_reason == StopReason::ToolUse {
                        warn!("Tool use stop reason without any tool calls");
                    }
                    let text = text.unwrap_or_default();
                    info!(
                        iteration,
                        response_length = text.len(),
                        "Agent completed"
                    );
                    if let Some(handler) = &event_handler {
                        handler.on_complete(&text).await;
                    }
                    return Ok(text);
                }
            }
        }

        warn!(
            max_iterations = self.config.max_iterations,
            "Max iterations reached, stopping"
        );
        Ok(MAX_ITERATIONS_MESSAGE.to_string())
    }

    fn build_request(&self, conversation: &[Message], tools: &[ToolDefinition]) -> CompletionRequest {
        let mut builder = CompletionRequest::builder(&self.config.model)
            .messages(conversation.to_vec())
            .system(
                self.config
                    .system_prompt
                    .clone()
                    .unwrap_or_else(|| DEFAULT_SYSTEM_PROMPT.to_string()),
            )
            .max_tokens(self.config.max_tokens)
            .tools(tools.to_vec());

        if let Some(temperature) = self.config.temperature {
            builder = builder.temperature(temperature);
        }
        builder.build()
    }

    /// Run every tool call in `message`, in order
    ///
    /// Failures, including calls to tools that are not registered, come back
    /// as error results so the model can recover.
    async fn execute_tools(
        &self,
        message: &Message,
        event_handler: Option<&Arc<dyn ExecutorEventHandler>>,
    ) -> Vec<ContentBlock> {
        let mut results = Vec::new();

        for tool_use in message.tool_uses() {
            let ContentBlock::ToolUse { id, name, input } = tool_use else {
                continue;
            };

            info!(
                tool_name = %name,
                tool_id = %id,
                input_preview = %preview(&input.to_string(), 500),
                "Executing tool"
            );

            if let Some(handler) = event_handler {
                handler.on_tool_start(id, name, input).await;
            }

            let start_time = Instant::now();
            let outcome = match self.tool_registry.get(name) {
                Some(tool) => tool.execute(input.clone()).await,
                None => Err(agent_core::Error::ToolNotFound(name.clone())),
            };
            let duration_ms = u64::try_from(start_time.elapsed().as_millis()).unwrap_or(u64::MAX);

            let block = match outcome {
                Ok(result) => {
                    let result_str = match &result {
                        Value::String(s) => s.clone(),
                        other => other.to_string(),
                    };
                    info!(
                        tool_name = %name,
                        duration_ms,
                        result_length = result_str.len(),
                        result_preview = %preview(&result_str, 500),
                        "Tool execution succeeded"
                    );
                    if let Some(handler) = event_handler {
                        handler.on_tool_done(id, name, Ok(&result), duration_ms).await;
                    }
                    ContentBlock::ToolResult {
                        tool_use_id: id.clone(),
                        content: result_str,
                        is_error: None,
                    }
                }
                Err(e) => {
                    let error_str = e.to_string();
                    warn!(
                        tool_name = %name,
                        duration_ms,
                        error = %e,
                        "Tool execution failed"
                    );
                    if let Some(handler) = event_handler {
                        handler
                            .on_tool_done(id, name, Err(&error_str), duration_ms)
                            .await;
                    }
                    ContentBlock::ToolResult {
                        tool_use_id: id.clone(),
                        content: format!("Error: {error_str}"),
                        is_error: Some(true),
                    }
                }
            };
            results.push(block);
        }

        results
    }
}

fn preview(text: &str, max_chars: usize) -> String {
    text.chars().take(max_chars).collect()
}

/// Builder for AgentExecutor
pub struct AgentExecutorBuilder {
    provider: Option<Arc<dyn LLMProvider>>,
    tool_registry: Arc<ToolRegistry>,
    config: ExecutorConfig,
    event_handler: Option<Arc<dyn ExecutorEventHandler>>,
}

impl AgentExecutorBuilder {
    pub fn new() -> Self {
        Self {
            provider: None,
            tool_registry: Arc::new(ToolRegistry::new()),
            config: ExecutorConfig::default(),
            event_handler: None,
        }
    }

    /// Provider, model and sampling settings from a resolved handle
    pub fn handle(mut self, handle: &ModelHandle) -> Self {
        let system_prompt = self.config.system_prompt.take();
        let max_iterations = self.config.max_iterations;
        self.provider = Some(handle.provider());
        self.config = ExecutorConfig {
            max_iterations,
            ..ExecutorConfig::for_handle(handle)
        };
        if system_prompt.is_some() {
            self.config.system_prompt = system_prompt;
        }
        self
    }

    pub fn provider(mut self, provider: Arc<dyn LLMProvider>) -> Self {
        self.provider = Some(provider);
        self
    }

    pub fn tool_registry(mut self, registry: Arc<ToolRegistry>) -> Self {
        self.tool_registry = registry;
        self
    }

    /// Set the full configuration
    pub fn config(mut self, config: ExecutorConfig) -> Self {
        self.config = config;
        self
    }

    pub fn max_iterations(mut self, max: usize) -> Self {
        self.config.max_iterations = max;
        self
    }

    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.config.model = model.into();
        self
    }

    pub fn system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.config.system_prompt = Some(prompt.into());
        self
    }

    pub fn max_tokens(mut self, max_tokens: usize) -> Self {
        self.config.max_tokens = max_tokens;
        self
    }

    pub fn temperature(mut self, temperature: f32) -> Self {
        self.config.temperature = Some(temperature);
        self
    }

    pub fn event_handler(mut self, handler: Arc<dyn ExecutorEventHandler>) -> Self {
        self.event_handler = Some(handler);
        self
    }

    /// Build the executor
    ///
    /// # Errors
    ///
    /// Fails when no provider was set or the model name is empty.
    pub fn build(self) -> Result<AgentExecutor> {
        let provider = self.provider.ok_or_else(|| {
            agent_core::Error::InitializationFailed("Provider not set".to_string())
        })?;
        if self.config.model.trim().is_empty() {
            return Err(agent_core::Error::InitializationFailed(
                "Model not set".to_string(),
            ));
        }

        let mut executor = AgentExecutor::new(provider, self.tool_registry, self.config);
        executor.event_handler = self.event_handler;
        Ok(executor)
    }
}

impl Default for AgentExecutorBuilder {
    fn default() -> Self {
        Self::new()
    }
}
