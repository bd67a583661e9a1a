//! Tool trait definition

use agent_core::Result;
use agent_llm::ToolDefinition;
use async_trait::async_trait;
use serde_json::Value;

/// Trait for tools that agents can execute
///
/// Each tool provides a name, a description and a JSON schema for its
/// input. The LLM reads the description to decide when to call it.
#[async_trait]
pub trait Tool: Send + Sync {
    /// Execute the tool with given parameters
    ///
    /// `params` should match [`Tool::input_schema`]. Errors are reported back
    /// to the model as a failed tool result rather than aborting the run.
    async fn execute(&self, params: Value) -> Result<Value>;

    /// Unique within a [`ToolRegistry`](crate::ToolRegistry)
    fn name(&self) -> &str;

    fn description(&self) -> &str;

    /// Input schema (JSON Schema format)
    ///
    /// # Example
    ///
    /// ```
    /// use serde_json::json;
    ///
    /// // Schema for a letter counting tool:
    /// let schema = json!({
    ///     "type": "object",
    ///     "properties": {
    ///         "word": { "type": "string" },
    ///         "letter": { "type": "string", "minLength": 1, "maxLength": 1 }
    ///     },
    ///     "required": ["word", "letter"]
    /// });
    /// ```
    fn input_schema(&self) -> Value;

    /// Definition sent to the model
    fn definition(&self) -> ToolDefinition {
        ToolDefinition::new(self.name(), self.description(), self.input_schema())
    }
}
