//! Tool registry for managing available tools

use crate::Tool;
use agent_llm::ToolDefinition;
use std::collections::BTreeMap;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use tracing::debug;

/// Registry of tools keyed by name
///
/// Listing order is sorted by name, so the tool list sent to a model is the
/// same from run to run.
#[derive(Default)]
pub struct ToolRegistry {
    tools: RwLock<BTreeMap<String, Arc<dyn Tool>>>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry pre-loaded with every built-in tool
    pub fn with_builtins() -> Self {
        let registry = Self::new();
        crate::builtin::register_all(&registry);
        registry
    }

    /// Register a tool, replacing any tool with the same name
    ///
    /// Returns the replaced tool, if any.
    pub fn register(&self, tool: Arc<dyn Tool>) -> Option<Arc<dyn Tool>> {
        let name = tool.name().to_string();
        debug!(tool = %name, "Registering tool");
        self.write().insert(name, tool)
    }

    /// Builder-style [`register`](Self::register)
    pub fn with_tool(self, tool: Arc<dyn Tool>) -> Self {
        self.register(tool);
        self
    }

    pub fn unregister(&self, name: &str) -> Option<Arc<dyn Tool>> {
        self.write().remove(name)
    }

    /// Get a tool by name
    pub fn get(&self, name: &str) -> Option<Arc<dyn Tool>> {
        self.read().get(name).cloned()
    }

    /// All registered tools, sorted by name
    pub fn list_tools(&self) -> Vec<Arc<dyn Tool>> {
        self.read().values().cloned().collect()
    }

    /// Sorted tool names
    pub fn tool_names(&self) -> Vec<String> {
        self.read().keys().cloned().collect()
    }

    /// Definitions to send to the model, sorted by name
    pub fn definitions(&self) -> Vec<ToolDefinition> {
        self.read().values().map(|tool| tool.definition()).collect()
    }

    pub fn len(&self) -> usize {
        self.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }

    // A panic while holding the lock cannot leave the map half-updated
    fn read(&self) -> RwLockReadGuard<'_, BTreeMap<String, Arc<dyn Tool>>> {
        self.tools.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, BTreeMap<String, Arc<dyn Tool>>> {
        self.tools.write().unwrap_or_else(PoisonError::into_inner)
    }
}

impl std::fmt::Debug for ToolRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ToolRegistry")
            .field("tools", &self.tool_names())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use serde_json::{Value, json};

    struct Named(&'static str, &'static str);

    #[async_trait]
    impl Tool for Named {
        async fn execute(&self, _params: Value) -> agent_core::Result<Value> {
            Ok(json!(self.1))
        }

        fn name(&self) -> &str {
            self.0
        }

        fn description(&self) -> &str {
            "test tool"
        }

        fn input_schema(&self) -> Value {
            json!({"type": "object"})
        }
    }

    #[test]
    fn test_register_and_get() {
        let registry = ToolRegistry::new();
        assert!(registry.is_empty());

        assert!(registry.register(Arc::new(Named("echo", "v1"))).is_none());
        assert_eq!(registry.len(), 1);
        assert!(registry.get("echo").is_some());
        assert!(registry.get("missing").is_none());
    }

    #[tokio::test]
    async fn test_register_replaces_same_name() {
        let registry = ToolRegistry::new().with_tool(Arc::new(Named("echo", "v1")));
        let replaced = registry.register(Arc::new(Named("echo", "v2")));
        assert!(replaced.is_some());
        assert_eq!(registry.len(), 1);

        let result = registry.get("echo").unwrap().execute(json!({})).await.unwrap();
        assert_eq!(result, json!("v2"));
    }

    #[test]
    fn test_listing_is_sorted() {
        let registry = ToolRegistry::new()
            .with_tool(Arc::new(Named("word_counter", "")))
            .with_tool(Arc::new(Named("calculator", "")))
            .with_tool(Arc::new(Named("letter_counter", "")));

        assert_eq!(
            registry.tool_names(),
            ["calculator", "letter_counter", "word_counter"]
        );
        let defs: Vec<String> = registry.definitions().into_iter().map(|d| d.name).collect();
        assert_eq!(defs, registry.tool_names());
    }

    #[test]
    fn test_unregister() {
        let registry = ToolRegistry::new().with_tool(Arc::new(Named("echo", "")));
        assert!(registry.unregister("echo").is_some());
        assert!(registry.unregister("echo").is_none());
        assert!(registry.is_empty());
    }

    #[test]
    fn test_with_builtins() {
        let registry = ToolRegistry::with_builtins();
        assert_eq!(
            registry.tool_names(),
            [
                "calculator",
                "current_time",
                "letter_counter",
                "text_reverser",
                "word_counter"
            ]
        );
    }
}
