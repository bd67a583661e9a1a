//! The providers this workshop knows how to build
//!
//! [`ProviderKind`] is a closed set; each kind knows its id, what it needs
//! from the environment, its default model, and how to turn a
//! [`ProviderEntry`] into a [`ModelHandle`].

use crate::config::{ProviderConfig, ProviderEntry};
use crate::error::BoxError;
use crate::{Environment, ProviderDescriptor, ProviderError, Requirement};
use agent_llm::providers::{
    AwsCredentials, BedrockConfig, BedrockProvider, OpenAIConfig, OpenAIProvider,
    region_from_lookup,
};
use agent_llm::completion::CompletionRequestBuilder;
use agent_llm::{CompletionRequest, LLMProvider};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use tracing::debug;

pub const DEFAULT_TEMPERATURE: f32 = 0.3;
pub const DEFAULT_MAX_TOKENS: usize = 2000;

/// Supported model providers, in default preference order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ProviderKind {
    #[serde(rename = "bedrock")]
    Bedrock,
    #[serde(rename = "openai")]
    OpenAi,
    #[serde(rename = "nvidia")]
    NvidiaNim,
    #[serde(rename = "openrouter")]
    OpenRouter,
}

/// Rough pricing class, shown in the setup guide
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CostTier {
    Premium,
    Free,
}

impl fmt::Display for CostTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Premium => "premium",
            Self::Free => "free",
        })
    }
}

impl ProviderKind {
    pub const ALL: [Self; 4] = [Self::Bedrock, Self::OpenAi, Self::NvidiaNim, Self::OpenRouter];

    /// Stable identifier used in config files, the CLI and usage stats
    pub fn id(self) -> &'static str {
        match self {
            Self::Bedrock => "bedrock",
            Self::OpenAi => "openai",
            Self::NvidiaNim => "nvidia",
            Self::OpenRouter => "openrouter",
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            Self::Bedrock => "AWS Bedrock (Claude 3.7 Sonnet)",
            Self::OpenAi => "OpenAI (GPT-4o)",
            Self::NvidiaNim => "NVIDIA NIM (Llama 3)",
            Self::OpenRouter => "OpenRouter (Mistral)",
        }
    }

    pub fn cost_tier(self) -> CostTier {
        match self {
            Self::Bedrock | Self::OpenAi => CostTier::Premium,
            Self::NvidiaNim | Self::OpenRouter => CostTier::Free,
        }
    }

    pub fn default_model(self) -> &'static str {
        match self {
            Self::Bedrock => "us.anthropic.claude-3-7-sonnet-20250219-v1:0",
            Self::OpenAi => "gpt-4o",
            Self::NvidiaNim => "meta/llama3-8b-instruct",
            Self::OpenRouter => "mistralai/mistral-7b-instruct:free",
        }
    }

    /// Base URL of the OpenAI-compatible API; `None` for Bedrock
    pub fn default_api_base(self) -> Option<&'static str> {
        match self {
            Self::Bedrock => None,
            Self::OpenAi => Some("https://api.openai.com/v1"),
            Self::NvidiaNim => Some("https://integrate.api.nvidia.com/v1"),
            Self::OpenRouter => Some("https://openrouter.ai/api/v1"),
        }
    }

    pub fn requirements(self) -> Vec<Requirement> {
        match self {
            Self::Bedrock => vec![Requirement::any_of([
                Requirement::env_var("AWS_ACCESS_KEY_ID"),
                Requirement::credential_file("~/.aws/credentials"),
            ])],
            Self::OpenAi => vec![Requirement::env_var("OPENAI_API_KEY")],
            Self::NvidiaNim => vec![Requirement::env_var("NVIDIA_API_KEY")],
            Self::OpenRouter => vec![Requirement::env_var("OPENROUTER_API_KEY")],
        }
    }

    /// One-line instruction for making this provider available
    pub fn setup_hint(self) -> &'static str {
        match self {
            Self::Bedrock => "Run `aws configure` or export AWS_ACCESS_KEY_ID and AWS_SECRET_ACCESS_KEY",
            Self::OpenAi => "export OPENAI_API_KEY='sk-...'",
            Self::NvidiaNim => "export NVIDIA_API_KEY='nvapi-...'",
            Self::OpenRouter => "export OPENROUTER_API_KEY='sk-or-...'",
        }
    }

    /// System prompt for a general assistant on this provider
    pub fn assistant_prompt(self) -> String {
        format!(
            "You are a helpful assistant powered by {}.",
            self.display_name()
        )
    }
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

impl FromStr for ProviderKind {
    type Err = ProviderError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|kind| kind.id() == wanted)
            .ok_or_else(|| ProviderError::UnknownProvider(s.to_string()))
    }
}

/// A constructed model client plus the sampling settings to use with it
#[derive(Clone)]
pub struct ModelHandle {
    kind: ProviderKind,
    model: String,
    temperature: f32,
    max_tokens: usize,
    provider: Arc<dyn LLMProvider>,
}

impl ModelHandle {
    pub fn new(kind: ProviderKind, model: impl Into<String>, provider: Arc<dyn LLMProvider>) -> Self {
        Self {
            kind,
            model: model.into(),
            temperature: DEFAULT_TEMPERATURE,
            max_tokens: DEFAULT_MAX_TOKENS,
            provider,
        }
    }

    pub fn with_sampling(mut self, temperature: f32, max_tokens: usize) -> Self {
        self.temperature = temperature;
        self.max_tokens = max_tokens;
        self
    }

    pub fn kind(&self) -> ProviderKind {
        self.kind
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn temperature(&self) -> f32 {
        self.temperature
    }

    pub fn max_tokens(&self) -> usize {
        self.max_tokens
    }

    pub fn provider(&self) -> Arc<dyn LLMProvider> {
        Arc::clone(&self.provider)
    }

    /// Request builder pre-filled with this handle's model and sampling
    pub fn request(&self) -> CompletionRequestBuilder {
        CompletionRequest::builder(&self.model)
            .temperature(self.temperature)
            .max_tokens(self.max_tokens)
    }
}

impl fmt::Debug for ModelHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModelHandle")
            .field("kind", &self.kind)
            .field("model", &self.model)
            .field("temperature", &self.temperature)
            .field("max_tokens", &self.max_tokens)
            .field("provider", &self.provider.name())
            .finish()
    }
}

/// Descriptor for one configured provider
pub fn descriptor(
    entry: &ProviderEntry,
    temperature: f32,
    max_tokens: usize,
) -> ProviderDescriptor<ModelHandle> {
    let entry = entry.clone();
    ProviderDescriptor::new(entry.kind.id(), entry.kind.requirements(), move |env| {
        build_handle(&entry, env).map(|h| h.with_sampling(temperature, max_tokens))
    })
}

/// Descriptors for every entry of `config`, in its order
pub fn descriptors(config: &ProviderConfig) -> Vec<ProviderDescriptor<ModelHandle>> {
    config
        .providers
        .iter()
        .map(|entry| descriptor(entry, config.temperature, config.max_tokens))
        .collect()
}

fn build_handle(entry: &ProviderEntry, env: &dyn Environment) -> Result<ModelHandle, BoxError> {
    let kind = entry.kind;
    let model = entry
        .model
        .clone()
        .unwrap_or_else(|| kind.default_model().to_string());

    let provider = match kind {
        ProviderKind::Bedrock => bedrock_client(entry, env)?,
        ProviderKind::OpenAi => openai_compatible_client(entry, env, "OPENAI_API_KEY")?,
        ProviderKind::NvidiaNim => openai_compatible_client(entry, env, "NVIDIA_API_KEY")?,
        ProviderKind::OpenRouter => openai_compatible_client(entry, env, "OPENROUTER_API_KEY")?,
    };

    Ok(ModelHandle::new(kind, model, provider))
}

/// Converse API client; region from the environment, then the entry
fn bedrock_client(
    entry: &ProviderEntry,
    env: &dyn Environment,
) -> Result<Arc<dyn LLMProvider>, BoxError> {
    let credentials = AwsCredentials::from_lookup(|name| env.var(name))?;
    let region = region_from_lookup(|name| env.var(name))
        .or_else(|| entry.region.clone())
        .unwrap_or_else(|| agent_llm::providers::bedrock::DEFAULT_BEDROCK_REGION.to_string());
    debug!(%region, "Using Bedrock region");

    let mut config = BedrockConfig::new(region);
    if let Some(endpoint) = &entry.api_base {
        config = config.with_endpoint(endpoint.clone());
    }
    if let Some(timeout) = entry.timeout_secs {
        config = config.with_timeout(timeout);
    }
    Ok(Arc::new(BedrockProvider::new(config, credentials)?))
}

fn openai_compatible_client(
    entry: &ProviderEntry,
    env: &dyn Environment,
    key_var: &str,
) -> Result<Arc<dyn LLMProvider>, BoxError> {
    let kind = entry.kind;
    let api_key = env
        .var(key_var)
        .ok_or_else(|| format!("{key_var} is not set"))?;
    let api_base = entry
        .api_base
        .as_deref()
        .or(kind.default_api_base())
        .unwrap_or(agent_llm::providers::openai::DEFAULT_OPENAI_API_BASE);

    let mut config = OpenAIConfig::new(api_key)
        .with_api_base(api_base)
        .with_provider_name(kind.id());
    if kind == ProviderKind::OpenRouter {
        config = config.with_header("X-Title", "agent-workshop");
    }
    if let Some(timeout) = entry.timeout_secs {
        config = config.with_timeout(timeout);
    }
    Ok(Arc::new(OpenAIProvider::with_config(config)?))
}
