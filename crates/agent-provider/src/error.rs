//! Error types for provider resolution

use crate::Requirement;
use crate::requirement::describe;
use serde::Serialize;
use std::fmt;
use thiserror::Error;

/// Result type for provider resolution
pub type Result<T> = std::result::Result<T, ProviderError>;

/// Boxed error a provider constructor may return
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// A constructor failed (returned an error or panicked)
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
#[error("{provider}: {message}")]
pub struct BuildError {
    pub provider: String,
    pub message: String,
}

/// What happened to one provider during a resolution call
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum AttemptOutcome {
    /// Requirements unmet; no build was attempted
    Skipped { missing: Vec<Requirement> },

    /// Build attempted and failed
    Failed { message: String },
}

/// One entry of the diagnostic list carried by [`ProviderError::AllProvidersExhausted`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProviderAttempt {
    pub provider: String,
    #[serde(flatten)]
    pub outcome: AttemptOutcome,
}

impl ProviderAttempt {
    pub fn is_skip(&self) -> bool {
        matches!(self.outcome, AttemptOutcome::Skipped { .. })
    }
}

impl fmt::Display for ProviderAttempt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.outcome {
            AttemptOutcome::Skipped { missing } => write!(
                f,
                "{}: skipped: missing requirements ({})",
                self.provider,
                describe(missing)
            ),
            AttemptOutcome::Failed { message } => write!(f, "{}: {message}", self.provider),
        }
    }
}

fn list_attempts(attempts: &[ProviderAttempt]) -> String {
    if attempts.is_empty() {
        return "no providers configured".to_string();
    }
    attempts
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// Errors that can occur while resolving a provider
#[derive(Debug, Error)]
pub enum ProviderError {
    /// A specific provider was asked for but its requirements are unmet
    #[error("Provider '{provider}' is not configured: missing {}", describe(.missing))]
    RequirementsUnmet {
        provider: String,
        missing: Vec<Requirement>,
    },

    /// A specific provider was asked for and its constructor failed
    #[error("Failed to build provider {0}")]
    BuildFailure(#[from] BuildError),

    /// No provider in the table could be used
    #[error("All providers exhausted: {}", list_attempts(.attempts))]
    AllProvidersExhausted { attempts: Vec<ProviderAttempt> },

    /// No descriptor with this name
    #[error("Unknown provider: {0}")]
    UnknownProvider(String),

    /// Invalid provider table or configuration file
    #[error("Configuration error: {0}")]
    Configuration(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exhausted_message_lists_every_attempt() {
        let err = ProviderError::AllProvidersExhausted {
            attempts: vec![
                ProviderAttempt {
                    provider: "bedrock".into(),
                    outcome: AttemptOutcome::Skipped {
                        missing: vec![Requirement::env_var("AWS_ACCESS_KEY_ID")],
                    },
                },
                ProviderAttempt {
                    provider: "openai".into(),
                    outcome: AttemptOutcome::Failed {
                        message: "API key is empty".into(),
                    },
                },
            ],
        };
        assert_eq!(
            err.to_string(),
            "All providers exhausted: bedrock: skipped: missing requirements \
             (env AWS_ACCESS_KEY_ID); openai: API key is empty"
        );
    }

    #[test]
    fn test_exhausted_with_empty_table() {
        let err = ProviderError::AllProvidersExhausted { attempts: vec![] };
        assert_eq!(
            err.to_string(),
            "All providers exhausted: no providers configured"
        );
    }

    #[test]
    fn test_requirements_unmet_message() {
        let err = ProviderError::RequirementsUnmet {
            provider: "nvidia".into(),
            missing: vec![Requirement::env_var("NVIDIA_API_KEY")],
        };
        assert_eq!(
            err.to_string(),
            "Provider 'nvidia' is not configured: missing env NVIDIA_API_KEY"
        );
    }

    #[test]
    fn test_attempt_serialization() {
        let attempt = ProviderAttempt {
            provider: "openrouter".into(),
            outcome: AttemptOutcome::Failed {
                message: "boom".into(),
            },
        };
        assert!(!attempt.is_skip());
        let value = serde_json::to_value(&attempt).unwrap();
        assert_eq!(
            value,
            serde_json::json!({"provider": "openrouter", "outcome": "failed", "message": "boom"})
        );
    }
}
