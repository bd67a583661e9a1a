//! Simple agent implementation (LLM only, no tools)

use agent_core::{Agent, Context, Result};
use agent_llm::{CompletionRequest, LLMProvider, Message};
use agent_provider::ModelHandle;
use async_trait::async_trait;
use std::sync::Arc;
use tracing::debug;

/// Configuration for a simple agent
#[derive(Debug, Clone)]
pub struct SimpleConfig {
    pub model: String,

    pub system_prompt: String,

    /// Max tokens per completion
    pub max_tokens: usize,

    /// Temperature for sampling
    pub temperature: f32,
}

impl Default for SimpleConfig {
    fn default() -> Self {
        Self {
            model: String::new(),
            system_prompt: "You are a helpful assistant.".to_string(),
            max_tokens: agent_provider::catalog::DEFAULT_MAX_TOKENS,
            temperature: agent_provider::catalog::DEFAULT_TEMPERATURE,
        }
    }
}

impl SimpleConfig {
    /// Model and sampling settings of a resolved handle
    pub fn for_handle(handle: &ModelHandle) -> Self {
        Self {
            model: handle.model().to_string(),
            system_prompt: handle.kind().assistant_prompt(),
            max_tokens: handle.max_tokens(),
            temperature: handle.temperature(),
        }
    }

    pub fn with_system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.system_prompt = prompt.into();
        self
    }
}

/// A simple agent that uses LLM without tools
///
/// One request per call, no tool loop. Suitable for plain question
/// answering and text generation.
///
/// # Example
///
/// ```no_run
/// use agent_core::{Agent, Context};
/// use agent_provider::ProviderConfig;
/// use agent_runtime::{SimpleAgent, SimpleConfig};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let handle = ProviderConfig::default().process_resolver()?.resolve()?.handle;
/// let agent = SimpleAgent::new(handle.provider(), SimpleConfig::for_handle(&handle), "assistant");
///
/// let mut context = Context::new();
/// let response = agent.process("Hello!".to_string(), &mut context).await?;
/// # Ok(())
/// # }
/// ```
pub struct SimpleAgent {
    provider: Arc<dyn LLMProvider>,
    config: SimpleConfig,
    name: String,
    description: Option<String>,
}

impl SimpleAgent {
    pub fn new(
        provider: Arc<dyn LLMProvider>,
        config: SimpleConfig,
        name: impl Into<String>,
    ) -> Self {
        Self {
            provider,
            config,
            name: name.into(),
            description: None,
        }
    }

    /// Description shown when this agent is used as a tool
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn config(&self) -> &SimpleConfig {
        &self.config
    }
}

#[async_trait]
impl Agent for SimpleAgent {
    async fn process(&self, input: String, context: &mut Context) -> Result<String> {
        let request = CompletionRequest::builder(&self.config.model)
            .messages(vec![Message::user(input)])
            .system(self.config.system_prompt.clone())
            .max_tokens(self.config.max_tokens)
            .temperature(self.config.temperature)
            .build();

        let response = self
            .provider
            .complete(request)
            .await
            .map_err(|e| agent_core::Error::ProcessingFailed(e.to_string()))?;

        debug!(
            agent = %self.name,
            output_tokens = response.usage.output_tokens,
            "Simple agent answered"
        );
        if context.model().is_none() {
            context.insert(agent_core::context::keys::MODEL, self.config.model.clone().into());
        }

        Ok(response.message.text().unwrap_or_default())
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
