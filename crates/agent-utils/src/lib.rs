//! Shared utilities for the agent workshop
//!
//! Logging setup and configuration file discovery used by the binaries.

pub mod config;
pub mod error;
pub mod logging;

pub use config::locate_config;
pub use error::{Error, Result};
pub use logging::{LogConfig, LogFormat, init_tracing};
