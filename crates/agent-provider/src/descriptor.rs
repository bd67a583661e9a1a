//! Provider descriptors and the constructor invoker

use crate::error::{BoxError, BuildError};
use crate::requirement;
use crate::{Environment, Requirement};
use std::fmt;
use std::panic::{AssertUnwindSafe, catch_unwind};
use tracing::{debug, warn};

type BuildFn<H> = Box<dyn Fn(&dyn Environment) -> Result<H, BoxError> + Send + Sync>;

/// One entry of the provider table: a name, what it needs, and how to build it
pub struct ProviderDescriptor<H> {
    name: String,
    requirements: Vec<Requirement>,
    build: BuildFn<H>,
}

impl<H> ProviderDescriptor<H> {
    /// # Example
    ///
    /// ```
    /// use agent_provider::{ProviderDescriptor, Requirement, StaticEnvironment, try_build};
    ///
    /// let openai = ProviderDescriptor::new(
    ///     "openai",
    ///     vec![Requirement::env_var("OPENAI_API_KEY")],
    ///     |env| Ok(format!("client with key {}", env.var("OPENAI_API_KEY").unwrap_or_default())),
    /// );
    ///
    /// let env = StaticEnvironment::new().with_var("OPENAI_API_KEY", "sk-1");
    /// assert_eq!(try_build(&openai, &env).unwrap(), "client with key sk-1");
    /// ```
    pub fn new<F>(name: impl Into<String>, requirements: Vec<Requirement>, build: F) -> Self
    where
        F: Fn(&dyn Environment) -> Result<H, BoxError> + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            requirements,
            build: Box::new(build),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn requirements(&self) -> &[Requirement] {
        &self.requirements
    }
}

impl<H> fmt::Debug for ProviderDescriptor<H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProviderDescriptor")
            .field("name", &self.name)
            .field("requirements", &self.requirements)
            .finish_non_exhaustive()
    }
}

/// Requirements of `descriptor` that `env` does not satisfy, in declaration order
pub fn unmet_requirements<H>(
    descriptor: &ProviderDescriptor<H>,
    env: &dyn Environment,
) -> Vec<Requirement> {
    requirement::unmet(&descriptor.requirements, env)
}

/// Run the descriptor's constructor once
///
/// Errors and panics raised by the constructor both come back as a
/// [`BuildError`]; nothing is re-raised and nothing is retried.
pub fn try_build<H>(
    descriptor: &ProviderDescriptor<H>,
    env: &dyn Environment,
) -> Result<H, BuildError> {
    debug!(provider = %descriptor.name, "Building provider");

    let outcome = catch_unwind(AssertUnwindSafe(|| (descriptor.build)(env)));
    let message = match outcome {
        Ok(Ok(handle)) => return Ok(handle),
        Ok(Err(e)) => e.to_string(),
        Err(payload) => format!("constructor panicked: {}", panic_message(payload.as_ref())),
    };

    warn!(provider = %descriptor.name, error = %message, "Provider construction failed");
    Err(BuildError {
        provider: descriptor.name.clone(),
        message,
    })
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> &str {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s
    } else {
        "unknown panic"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::StaticEnvironment;

    #[test]
    fn test_unmet_requirements() {
        let descriptor: ProviderDescriptor<()> = ProviderDescriptor::new(
            "nvidia",
            vec![
                Requirement::env_var("NVIDIA_API_KEY"),
                Requirement::env_var("NIM_REGION"),
            ],
            |_| Ok(()),
        );
        let env = StaticEnvironment::new().with_var("NIM_REGION", "us");
        assert_eq!(
            unmet_requirements(&descriptor, &env),
            vec![Requirement::env_var("NVIDIA_API_KEY")]
        );
    }

    #[test]
    fn test_build_error_is_captured() {
        let descriptor: ProviderDescriptor<u32> =
            ProviderDescriptor::new("openai", vec![], |_| Err("malformed key".into()));
        let err = try_build(&descriptor, &StaticEnvironment::new()).unwrap_err();
        assert_eq!(
            err,
            BuildError {
                provider: "openai".into(),
                message: "malformed key".into(),
            }
        );
    }

    #[test]
    fn test_panic_is_captured() {
        let descriptor: ProviderDescriptor<u32> =
            ProviderDescriptor::new("bedrock", vec![], |_| panic!("sdk exploded"));
        let err = try_build(&descriptor, &StaticEnvironment::new()).unwrap_err();
        assert_eq!(err.provider, "bedrock");
        assert_eq!(err.message, "constructor panicked: sdk exploded");
    }

    #[test]
    fn test_formatted_panic_is_captured() {
        let descriptor: ProviderDescriptor<u32> =
            ProviderDescriptor::new("bedrock", vec![], |_| panic!("code {}", 7));
        let err = try_build(&descriptor, &StaticEnvironment::new()).unwrap_err();
        assert_eq!(err.message, "constructor panicked: code 7");
    }

    #[test]
    fn test_constructor_sees_environment() {
        let descriptor = ProviderDescriptor::new("openrouter", vec![], |env| {
            env.var("OPENROUTER_API_KEY")
                .ok_or_else(|| "no key".into())
        });
        let env = StaticEnvironment::new().with_var("OPENROUTER_API_KEY", "sk-or");
        assert_eq!(try_build(&descriptor, &env).unwrap(), "sk-or");
    }

    #[test]
    fn test_debug_omits_constructor() {
        let descriptor: ProviderDescriptor<()> =
            ProviderDescriptor::new("openai", vec![Requirement::env_var("K")], |_| Ok(()));
        let debug = format!("{descriptor:?}");
        assert!(debug.contains("openai"));
        assert!(debug.contains(".."));
    }
}
