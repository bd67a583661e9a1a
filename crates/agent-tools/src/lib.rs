//! Tool framework for the agent workshop
//!
//! Tools are functions an LLM can ask to run. Each one has a name, a
//! description and a JSON schema, and is looked up by name in a
//! [`ToolRegistry`] when the model requests it.
//!
//! The [`builtin`] module holds the workshop's built-in tools: a calculator,
//! the current time, and a few text utilities.

pub mod builtin;
pub mod registry;
pub mod tool;

pub use registry::ToolRegistry;
pub use tool::Tool;
