//! Agent runtime for the agent workshop
//!
//! This crate provides the runtime infrastructure for executing agents:
//! the [`AgentExecutor`] tool loop, the [`AgentRuntime`] that hands a
//! resolved model handle and the shared tool registry to every agent it
//! creates, and the concrete agent implementations.

pub mod agents;
pub mod executor;
pub mod runtime;

#[cfg(test)]
pub(crate) mod testing;

pub use agents::{AgentTool, SimpleAgent, SimpleConfig, ToolAgent};
pub use executor::{
    AgentExecutor, AgentExecutorBuilder, ExecutorConfig, ExecutorEventHandler, NoOpEventHandler,
};
pub use runtime::{AgentRuntime, AgentRuntimeBuilder, RuntimeConfig};
