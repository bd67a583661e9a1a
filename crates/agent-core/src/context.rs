//! Execution context for agents
//!
//! The `Context` struct is a small key-value store that travels with a
//! single run: which provider answered, which pipeline stage is executing,
//! and anything else a caller wants to hand to its agents.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Well-known context keys
pub mod keys {
    /// Session ID for tracking
    pub const SESSION_ID: &str = "session_id";
    /// Id of the provider that produced the model handle (e.g. "openai")
    pub const PROVIDER: &str = "provider";
    /// Model identifier in use
    pub const MODEL: &str = "model";
    /// Name of the workflow stage currently executing
    pub const STAGE: &str = "stage";
}

/// Context passed to agents during execution
///
/// # Example
///
/// ```
/// use agent_core::Context;
///
/// let ctx = Context::new()
///     .with_provider("openai")
///     .with_session_id("session-123");
///
/// assert_eq!(ctx.provider(), Some("openai"));
/// assert_eq!(ctx.session_id(), Some("session-123"));
/// ```
#[derive(Debug, Clone, Default)]
pub struct Context {
    data: HashMap<String, serde_json::Value>,
}

impl Context {
    /// Create a new empty context
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the session ID
    pub fn with_session_id(mut self, session_id: impl Into<String>) -> Self {
        self.insert(keys::SESSION_ID, serde_json::json!(session_id.into()));
        self
    }

    /// Set the provider id
    pub fn with_provider(mut self, provider: impl Into<String>) -> Self {
        self.insert(keys::PROVIDER, serde_json::json!(provider.into()));
        self
    }

    /// Set the model identifier
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.insert(keys::MODEL, serde_json::json!(model.into()));
        self
    }

    pub fn session_id(&self) -> Option<&str> {
        self.get_str(keys::SESSION_ID)
    }

    pub fn provider(&self) -> Option<&str> {
        self.get_str(keys::PROVIDER)
    }

    pub fn model(&self) -> Option<&str> {
        self.get_str(keys::MODEL)
    }

    pub fn stage(&self) -> Option<&str> {
        self.get_str(keys::STAGE)
    }

    /// Record the workflow stage currently executing
    pub fn set_stage(&mut self, stage: impl Into<String>) {
        self.insert(keys::STAGE, serde_json::json!(stage.into()));
    }

    /// Insert a value into the context
    pub fn insert(&mut self, key: impl Into<String>, value: serde_json::Value) {
        self.data.insert(key.into(), value);
    }

    /// Get a value from the context
    pub fn get(&self, key: &str) -> Option<&serde_json::Value> {
        self.data.get(key)
    }

    fn get_str(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(|v| v.as_str())
    }

    /// Insert a typed value, serializing it to JSON first
    pub fn insert_typed<T: Serialize>(
        &mut self,
        key: impl Into<String>,
        value: &T,
    ) -> crate::Result<()> {
        let json_value = serde_json::to_value(value).map_err(|e| {
            crate::Error::ProcessingFailed(format!("Failed to serialize context value: {e}"))
        })?;
        self.data.insert(key.into(), json_value);
        Ok(())
    }

    /// Get a typed value, deserializing it from JSON
    pub fn get_typed<T: for<'de> Deserialize<'de>>(&self, key: &str) -> crate::Result<Option<T>> {
        match self.data.get(key) {
            None => Ok(None),
            Some(value) => {
                let typed = serde_json::from_value(value.clone()).map_err(|e| {
                    crate::Error::ProcessingFailed(format!(
                        "Failed to deserialize context value: {e}"
                    ))
                })?;
                Ok(Some(typed))
            }
        }
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.data.contains_key(key)
    }

    pub fn remove(&mut self, key: &str) -> Option<serde_json::Value> {
        self.data.remove(key)
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Merge another context into this one (other values override)
    pub fn merge(&mut self, other: Context) {
        self.data.extend(other.data);
    }
}
