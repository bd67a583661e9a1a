//! Error types for agent-utils

use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Failed to initialize logging: {0}")]
    Logging(String),

    #[error("Configuration file not found: {}", .0.display())]
    ConfigNotFound(PathBuf),
}
