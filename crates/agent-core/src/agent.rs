//! Core Agent trait definition

use crate::{Context, Result};
use async_trait::async_trait;

/// Core trait that all agents must implement
///
/// An agent turns a prompt into a reply. Whether it calls a model once, runs
/// a tool loop, or drives a whole pipeline of other agents is up to the
/// implementation.
#[async_trait]
pub trait Agent: Send + Sync {
    /// Process input and return output
    async fn process(&self, input: String, context: &mut Context) -> Result<String>;

    /// Get the agent's name
    fn name(&self) -> &str;

    /// Short description of what the agent is good at
    ///
    /// Used when the agent is exposed to another agent as a tool.
    fn description(&self) -> &str {
        "A helpful assistant agent"
    }
}
