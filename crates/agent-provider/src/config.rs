//! Provider table configuration
//!
//! The default table is every [`ProviderKind`] in catalog order. A JSON file
//! can reorder, restrict or tweak it:
//!
//! ```json
//! {
//!   "providers": [
//!     { "kind": "openai", "model": "gpt-4o-mini" },
//!     { "kind": "bedrock", "region": "us-west-2" }
//!   ],
//!   "temperature": 0.3,
//!   "maxTokens": 2000
//! }
//! ```

use crate::catalog::{self, DEFAULT_MAX_TOKENS, DEFAULT_TEMPERATURE, ModelHandle, ProviderKind};
use crate::{Environment, ProcessEnvironment, ProviderError, ProviderResolver, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;
use std::sync::Arc;

/// One row of the provider table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ProviderEntry {
    pub kind: ProviderKind,

    /// Model id; defaults to the kind's catalog model
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,

    /// Bedrock region, used when AWS_REGION/AWS_DEFAULT_REGION are unset
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,

    /// Endpoint override
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_base: Option<String>,

    /// HTTP timeout in seconds
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_secs: Option<u64>,
}

impl ProviderEntry {
    pub fn new(kind: ProviderKind) -> Self {
        Self {
            kind,
            model: None,
            region: None,
            api_base: None,
            timeout_secs: None,
        }
    }
}

/// Ordered provider table plus shared sampling settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProviderConfig {
    #[serde(default = "default_providers")]
    pub providers: Vec<ProviderEntry>,

    #[serde(default = "default_temperature")]
    pub temperature: f32,

    #[serde(default = "default_max_tokens")]
    pub max_tokens: usize,
}

fn default_providers() -> Vec<ProviderEntry> {
    ProviderKind::ALL.into_iter().map(ProviderEntry::new).collect()
}

fn default_temperature() -> f32 {
    DEFAULT_TEMPERATURE
}

fn default_max_tokens() -> usize {
    DEFAULT_MAX_TOKENS
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            providers: default_providers(),
            temperature: DEFAULT_TEMPERATURE,
            max_tokens: DEFAULT_MAX_TOKENS,
        }
    }
}

impl ProviderConfig {
    /// Load and validate a JSON config file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(|e| {
            ProviderError::Configuration(format!(
                "Failed to read config file {}: {e}",
                path.as_ref().display()
            ))
        })?;
        Self::from_json(&content)
    }

    /// Parse and validate a JSON config
    pub fn from_json(content: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(content).map_err(|e| {
            ProviderError::Configuration(format!("Failed to parse config file: {e}"))
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Restrict the table to a subset of kinds, keeping their order
    pub fn only(mut self, kinds: &[ProviderKind]) -> Self {
        self.providers.retain(|entry| kinds.contains(&entry.kind));
        self
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: usize) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.providers.is_empty() {
            return Err(ProviderError::Configuration(
                "At least one provider must be configured".to_string(),
            ));
        }

        let mut seen = HashSet::new();
        for entry in &self.providers {
            if !seen.insert(entry.kind) {
                return Err(ProviderError::Configuration(format!(
                    "Provider '{}' is listed more than once",
                    entry.kind
                )));
            }
        }

        if !(0.0..=2.0).contains(&self.temperature) {
            return Err(ProviderError::Configuration(format!(
                "Temperature must be between 0.0 and 2.0, got {}",
                self.temperature
            )));
        }
        if self.max_tokens == 0 {
            return Err(ProviderError::Configuration(
                "maxTokens must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }

    /// Build a resolver over this table
    pub fn resolver(&self, env: Arc<dyn Environment>) -> Result<ProviderResolver<ModelHandle>> {
        self.validate()?;
        ProviderResolver::new(catalog::descriptors(self), env)
    }

    /// Build a resolver that reads the real process environment
    pub fn process_resolver(&self) -> Result<ProviderResolver<ModelHandle>> {
        self.resolver(Arc::new(ProcessEnvironment))
    }
}
