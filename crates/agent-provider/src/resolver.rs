//! The fallback resolution loop
//!
//! Walk the table in order, skip providers whose requirements are unmet,
//! build the rest one at a time and stop at the first success. A skip is not
//! an attempt; a failed build is recorded and the loop moves on.

use crate::descriptor::{try_build, unmet_requirements};
use crate::error::{AttemptOutcome, ProviderAttempt, ProviderError, Result};
use crate::usage::{UsageRecorder, UsageSummary};
use crate::{Environment, ProcessEnvironment, ProviderDescriptor, Requirement};
use serde::Serialize;
use std::collections::HashSet;
use std::sync::{Arc, Mutex, PoisonError};
use tracing::{debug, info, instrument, warn};

/// A selected provider handle
#[derive(Debug)]
pub struct Resolution<H> {
    /// Name of the descriptor that produced the handle
    pub provider: String,

    pub handle: H,

    /// Providers passed over before this one, in table order
    pub passed_over: Vec<ProviderAttempt>,
}

/// Requirement status of one descriptor, without building anything
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Availability {
    pub provider: String,
    pub available: bool,
    pub missing: Vec<Requirement>,
}

/// Ordered provider table plus usage counters
///
/// Counters sit behind a mutex so a resolver can be shared through an `Arc`.
///
/// # Example
///
/// ```
/// use agent_provider::{ProviderDescriptor, ProviderResolver, Requirement, StaticEnvironment};
/// use std::sync::Arc;
///
/// let table = vec![
///     ProviderDescriptor::new("bedrock", vec![Requirement::env_var("AWS_ACCESS_KEY_ID")], |_| Ok("bedrock")),
///     ProviderDescriptor::new("openai", vec![Requirement::env_var("OPENAI_API_KEY")], |_| Ok("openai")),
/// ];
/// let env = StaticEnvironment::new().with_var("OPENAI_API_KEY", "sk-1");
/// let resolver = ProviderResolver::new(table, Arc::new(env)).unwrap();
///
/// let resolution = resolver.resolve().unwrap();
/// assert_eq!(resolution.handle, "openai");
/// assert_eq!(resolver.usage().total_attempts, 1);
/// ```
pub struct ProviderResolver<H> {
    table: Vec<ProviderDescriptor<H>>,
    env: Arc<dyn Environment>,
    usage: Mutex<UsageRecorder>,
}

impl<H> ProviderResolver<H> {
    /// Create a resolver; descriptor names must be unique
    pub fn new(table: Vec<ProviderDescriptor<H>>, env: Arc<dyn Environment>) -> Result<Self> {
        let mut seen = HashSet::new();
        for descriptor in &table {
            if !seen.insert(descriptor.name()) {
                return Err(ProviderError::Configuration(format!(
                    "Duplicate provider name '{}'",
                    descriptor.name()
                )));
            }
        }

        Ok(Self {
            table,
            env,
            usage: Mutex::new(UsageRecorder::new()),
        })
    }

    /// Create a resolver that reads the real process environment
    pub fn from_process_env(table: Vec<ProviderDescriptor<H>>) -> Result<Self> {
        Self::new(table, Arc::new(ProcessEnvironment))
    }

    pub fn descriptors(&self) -> &[ProviderDescriptor<H>] {
        &self.table
    }

    pub fn environment(&self) -> &dyn Environment {
        self.env.as_ref()
    }

    /// Return a handle from the first viable provider
    ///
    /// Requirements are re-checked on every call.
    #[instrument(skip(self), fields(providers = self.table.len()))]
    pub fn resolve(&self) -> Result<Resolution<H>> {
        let mut attempts = Vec::new();

        for descriptor in &self.table {
            let missing = unmet_requirements(descriptor, self.env.as_ref());
            if !missing.is_empty() {
                debug!(provider = descriptor.name(), ?missing, "Skipping provider");
                attempts.push(ProviderAttempt {
                    provider: descriptor.name().to_string(),
                    outcome: AttemptOutcome::Skipped { missing },
                });
                continue;
            }

            match try_build(descriptor, self.env.as_ref()) {
                Ok(handle) => {
                    self.record(descriptor.name(), true);
                    info!(provider = descriptor.name(), "Provider selected");
                    return Ok(Resolution {
                        provider: descriptor.name().to_string(),
                        handle,
                        passed_over: attempts,
                    });
                }
                Err(e) => {
                    self.record(descriptor.name(), false);
                    attempts.push(ProviderAttempt {
                        provider: e.provider,
                        outcome: AttemptOutcome::Failed { message: e.message },
                    });
                }
            }
        }

        warn!(attempts = attempts.len(), "All providers exhausted");
        Err(ProviderError::AllProvidersExhausted { attempts })
    }

    /// Build one named provider, with no fallback
    #[instrument(skip(self))]
    pub fn resolve_named(&self, name: &str) -> Result<Resolution<H>> {
        let descriptor = self
            .table
            .iter()
            .find(|d| d.name() == name)
            .ok_or_else(|| ProviderError::UnknownProvider(name.to_string()))?;

        let missing = unmet_requirements(descriptor, self.env.as_ref());
        if !missing.is_empty() {
            return Err(ProviderError::RequirementsUnmet {
                provider: name.to_string(),
                missing,
            });
        }

        match try_build(descriptor, self.env.as_ref()) {
            Ok(handle) => {
                self.record(name, true);
                info!(provider = name, "Provider selected");
                Ok(Resolution {
                    provider: name.to_string(),
                    handle,
                    passed_over: Vec::new(),
                })
            }
            Err(e) => {
                self.record(name, false);
                Err(ProviderError::BuildFailure(e))
            }
        }
    }

    /// Requirement status for every descriptor, in table order
    pub fn availability(&self) -> Vec<Availability> {
        self.table
            .iter()
            .map(|descriptor| {
                let missing = unmet_requirements(descriptor, self.env.as_ref());
                Availability {
                    provider: descriptor.name().to_string(),
                    available: missing.is_empty(),
                    missing,
                }
            })
            .collect()
    }

    /// Snapshot of attempt counters since this resolver was created
    pub fn usage(&self) -> UsageSummary {
        self.usage
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .summary()
    }

    fn record(&self, provider: &str, success: bool) {
        self.usage
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .record_attempt(provider, success);
    }
}

impl<H> std::fmt::Debug for ProviderResolver<H> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderResolver")
            .field("table", &self.table)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::StaticEnvironment;

    fn ok(name: &'static str, var: &str) -> ProviderDescriptor<&'static str> {
        ProviderDescriptor::new(name, vec![Requirement::env_var(var)], move |_| Ok(name))
    }

    #[test]
    fn test_duplicate_names_rejected() {
        let table = vec![ok("openai", "A"), ok("openai", "B")];
        let result = ProviderResolver::new(table, Arc::new(StaticEnvironment::new()));
        assert!(matches!(result, Err(ProviderError::Configuration(_))));
    }

    #[test]
    fn test_passed_over_reports_skips_and_failures() {
        let table = vec![
            ok("bedrock", "AWS_ACCESS_KEY_ID"),
            ProviderDescriptor::new("nvidia", vec![], |_| Err("bad key".into())),
            ok("openai", "OPENAI_API_KEY"),
        ];
        let env = StaticEnvironment::new().with_var("OPENAI_API_KEY", "sk");
        let resolver = ProviderResolver::new(table, Arc::new(env)).unwrap();

        let resolution = resolver.resolve().unwrap();
        assert_eq!(resolution.provider, "openai");
        assert_eq!(resolution.passed_over.len(), 2);
        assert!(resolution.passed_over[0].is_skip());
        assert_eq!(
            resolution.passed_over[1].outcome,
            AttemptOutcome::Failed {
                message: "bad key".into()
            }
        );
    }

    #[test]
    fn test_resolve_named() {
        let table = vec![ok("bedrock", "AWS_ACCESS_KEY_ID"), ok("openai", "OPENAI_API_KEY")];
        let env = StaticEnvironment::new()
            .with_var("AWS_ACCESS_KEY_ID", "AKIA")
            .with_var("OPENAI_API_KEY", "sk");
        let resolver = ProviderResolver::new(table, Arc::new(env)).unwrap();

        // Named resolution ignores preference order
        let resolution = resolver.resolve_named("openai").unwrap();
        assert_eq!(resolution.handle, "openai");
        assert_eq!(resolver.usage().per_provider["openai"].successes, 1);

        assert!(matches!(
            resolver.resolve_named("anthropic"),
            Err(ProviderError::UnknownProvider(name)) if name == "anthropic"
        ));
    }

    #[test]
    fn test_resolve_named_unmet_is_not_an_attempt() {
        let resolver = ProviderResolver::new(
            vec![ok("nvidia", "NVIDIA_API_KEY")],
            Arc::new(StaticEnvironment::new()),
        )
        .unwrap();

        let err = resolver.resolve_named("nvidia").unwrap_err();
        assert!(matches!(
            err,
            ProviderError::RequirementsUnmet { ref missing, .. }
                if missing == &vec![Requirement::env_var("NVIDIA_API_KEY")]
        ));
        assert_eq!(resolver.usage().total_attempts, 0);
    }

    #[test]
    fn test_resolve_named_build_failure() {
        let table: Vec<ProviderDescriptor<()>> = vec![ProviderDescriptor::new(
            "openrouter",
            vec![],
            |_| Err("timeout".into()),
        )];
        let resolver = ProviderResolver::new(table, Arc::new(StaticEnvironment::new())).unwrap();

        let err = resolver.resolve_named("openrouter").unwrap_err();
        assert!(matches!(err, ProviderError::BuildFailure(ref e) if e.message == "timeout"));
        assert_eq!(resolver.usage().per_provider["openrouter"].failures, 1);
    }

    #[test]
    fn test_availability_builds_nothing() {
        let table: Vec<ProviderDescriptor<()>> = vec![
            ProviderDescriptor::new("bedrock", vec![Requirement::env_var("AWS_ACCESS_KEY_ID")], |_| {
                panic!("must not build")
            }),
            ProviderDescriptor::new("openai", vec![], |_| panic!("must not build")),
        ];
        let resolver = ProviderResolver::new(table, Arc::new(StaticEnvironment::new())).unwrap();

        let availability = resolver.availability();
        assert_eq!(
            availability,
            vec![
                Availability {
                    provider: "bedrock".into(),
                    available: false,
                    missing: vec![Requirement::env_var("AWS_ACCESS_KEY_ID")],
                },
                Availability {
                    provider: "openai".into(),
                    available: true,
                    missing: vec![],
                },
            ]
        );
        assert_eq!(resolver.usage().total_attempts, 0);
    }
}
