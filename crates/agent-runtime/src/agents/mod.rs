//! Concrete agent implementations
//!
//! - SimpleAgent: one model call, no tools
//! - ToolAgent: the executor's tool loop behind the Agent trait
//! - AgentTool: any agent exposed to another agent as a tool

pub mod agent_tool;
pub mod simple;
pub mod tool;

pub use agent_tool::AgentTool;
pub use simple::{SimpleAgent, SimpleConfig};
pub use tool::ToolAgent;
