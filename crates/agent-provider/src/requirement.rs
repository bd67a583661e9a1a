//! Presence checks a provider needs before it is worth constructing

use crate::Environment;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// Something that must be present in the environment
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum Requirement {
    /// A non-empty environment variable
    EnvVar(String),

    /// An existing file; a leading `~` is the home directory
    CredentialFile(PathBuf),

    /// At least one of the alternatives
    AnyOf(Vec<Requirement>),
}

impl Requirement {
    pub fn env_var(name: impl Into<String>) -> Self {
        Self::EnvVar(name.into())
    }

    pub fn credential_file(path: impl Into<PathBuf>) -> Self {
        Self::CredentialFile(path.into())
    }

    pub fn any_of(alternatives: impl IntoIterator<Item = Requirement>) -> Self {
        Self::AnyOf(alternatives.into_iter().collect())
    }

    /// Check presence. Never fails; absence is just `false`.
    ///
    /// An empty `AnyOf` is never met.
    pub fn is_met(&self, env: &dyn Environment) -> bool {
        match self {
            Self::EnvVar(name) => env.var(name).is_some(),
            Self::CredentialFile(path) => env.path_exists(&env.expand_path(path)),
            Self::AnyOf(alternatives) => alternatives.iter().any(|r| r.is_met(env)),
        }
    }
}

impl fmt::Display for Requirement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EnvVar(name) => write!(f, "env {name}"),
            Self::CredentialFile(path) => write!(f, "file {}", path.display()),
            Self::AnyOf(alternatives) => {
                let parts: Vec<String> = alternatives.iter().map(ToString::to_string).collect();
                write!(f, "one of ({})", parts.join(" | "))
            }
        }
    }
}

/// Requirements that are not met, in declaration order
pub fn unmet(requirements: &[Requirement], env: &dyn Environment) -> Vec<Requirement> {
    requirements
        .iter()
        .filter(|r| !r.is_met(env))
        .cloned()
        .collect()
}

/// Render a list of requirements for messages and logs
pub fn describe(requirements: &[Requirement]) -> String {
    requirements
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}
