//! Provider selection with ordered fallback
//!
//! Given an ordered table of provider descriptors, pick the first one whose
//! requirements are met and whose constructor succeeds:
//!
//! - [`Requirement`] and [`Environment`]: presence checks against env vars
//!   and credential files
//! - [`try_build`]: runs a constructor, turning errors and panics into
//!   [`BuildError`]
//! - [`ProviderResolver`]: the fallback loop and its [`UsageRecorder`]
//! - [`ProviderKind`] / [`ProviderConfig`]: the built-in catalog of Bedrock,
//!   OpenAI, NVIDIA NIM and OpenRouter, producing [`ModelHandle`]s
//!
//! # Example
//!
//! ```no_run
//! use agent_provider::ProviderConfig;
//!
//! # fn example() -> Result<(), agent_provider::ProviderError> {
//! let resolver = ProviderConfig::default().process_resolver()?;
//! let resolution = resolver.resolve()?;
//! println!("Using {} ({})", resolution.provider, resolution.handle.model());
//! # Ok(())
//! # }
//! ```

pub mod catalog;
pub mod config;
pub mod descriptor;
pub mod environment;
pub mod error;
pub mod requirement;
pub mod resolver;
pub mod usage;

pub use catalog::{CostTier, ModelHandle, ProviderKind};
pub use config::{ProviderConfig, ProviderEntry};
pub use descriptor::{ProviderDescriptor, try_build, unmet_requirements};
pub use environment::{Environment, ProcessEnvironment, StaticEnvironment};
pub use error::{
    AttemptOutcome, BoxError, BuildError, ProviderAttempt, ProviderError, Result,
};
pub use requirement::Requirement;
pub use resolver::{Availability, ProviderResolver, Resolution};
pub use usage::{ProviderUsage, UsageRecorder, UsageSummary};
