//! LLM provider abstraction layer for the agent workshop
//!
//! This crate provides provider-agnostic abstractions for talking to hosted
//! Large Language Models. It includes:
//!
//! - Message types for LLM communication
//! - Completion request/response types
//! - Tool definitions for function calling
//! - The [`LLMProvider`] trait
//! - Concrete clients (behind feature flags): an OpenAI-compatible client
//!   used for OpenAI, NVIDIA NIM and OpenRouter, and an AWS Bedrock client

pub mod completion;
pub mod error;
pub mod messages;
pub mod provider;
pub mod tools;

pub use completion::{CompletionRequest, CompletionResponse, StopReason, TokenUsage};
pub use error::{LLMError, Result};
pub use messages::{ContentBlock, Message, MessageContent, Role};
pub use provider::LLMProvider;
pub use tools::ToolDefinition;

#[cfg(any(feature = "openai", feature = "bedrock"))]
pub mod providers;
