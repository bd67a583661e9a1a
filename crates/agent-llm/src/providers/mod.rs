//! Concrete LLM provider clients
//!
//! - [`OpenAIProvider`]: any OpenAI-compatible chat completions endpoint
//!   (OpenAI itself, NVIDIA NIM, OpenRouter)
//! - [`BedrockProvider`]: the AWS Bedrock Converse API

#[cfg(feature = "openai")]
pub mod openai;

#[cfg(feature = "openai")]
pub use openai::{OpenAIConfig, OpenAIProvider};

#[cfg(feature = "bedrock")]
pub mod bedrock;

#[cfg(feature = "bedrock")]
mod sigv4;

#[cfg(feature = "bedrock")]
pub use bedrock::{AwsCredentials, BedrockConfig, BedrockProvider, region_from_lookup};
