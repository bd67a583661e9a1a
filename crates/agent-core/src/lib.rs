//! Core abstractions for the agent workshop
//!
//! This crate defines the traits and types every other crate in the
//! workspace builds on: the [`Agent`] trait, the per-run [`Context`], and
//! the shared [`Error`] type.

pub mod agent;
pub mod context;
pub mod error;

pub use agent::Agent;
pub use context::Context;
pub use error::{Error, Result};
