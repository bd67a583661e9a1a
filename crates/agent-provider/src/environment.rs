//! Where requirements are checked
//!
//! Resolution only ever reads variables and checks file existence, so the
//! environment is a two-method trait. Tests use [`StaticEnvironment`] to get
//! the same answer on every machine.

use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};

/// Read-only view of process variables and the filesystem
pub trait Environment: Send + Sync {
    /// Value of a variable; empty values are reported as `None`
    fn var(&self, name: &str) -> Option<String>;

    /// Whether a file or directory exists at `path`
    fn path_exists(&self, path: &Path) -> bool;

    /// Home directory, used to expand a leading `~`
    fn home_dir(&self) -> Option<PathBuf> {
        self.var("HOME")
            .or_else(|| self.var("USERPROFILE"))
            .map(PathBuf::from)
    }

    /// Expand a leading `~` against [`Environment::home_dir`]
    ///
    /// Paths without `~`, or when no home directory is known, come back
    /// unchanged.
    fn expand_path(&self, path: &Path) -> PathBuf {
        let Ok(rest) = path.strip_prefix("~") else {
            return path.to_path_buf();
        };
        match self.home_dir() {
            Some(home) => home.join(rest),
            None => path.to_path_buf(),
        }
    }
}

/// The real process environment
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessEnvironment;

impl Environment for ProcessEnvironment {
    fn var(&self, name: &str) -> Option<String> {
        std::env::var(name).ok().filter(|v| !v.is_empty())
    }

    fn path_exists(&self, path: &Path) -> bool {
        path.exists()
    }
}

/// Map-backed environment with a fixed set of existing paths
///
/// # Example
///
/// ```
/// use agent_provider::{Environment, StaticEnvironment};
/// use std::path::Path;
///
/// let env = StaticEnvironment::new()
///     .with_var("HOME", "/home/dev")
///     .with_path("/home/dev/.aws/credentials");
///
/// assert!(env.path_exists(&env.expand_path(Path::new("~/.aws/credentials"))));
/// ```
#[derive(Debug, Clone, Default)]
pub struct StaticEnvironment {
    vars: BTreeMap<String, String>,
    paths: BTreeSet<PathBuf>,
}

impl StaticEnvironment {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_var(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.set_var(name, value);
        self
    }

    pub fn with_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.paths.insert(path.into());
        self
    }

    pub fn set_var(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.vars.insert(name.into(), value.into());
    }

    pub fn remove_var(&mut self, name: &str) {
        self.vars.remove(name);
    }
}

impl Environment for StaticEnvironment {
    fn var(&self, name: &str) -> Option<String> {
        self.vars.get(name).filter(|v| !v.is_empty()).cloned()
    }

    fn path_exists(&self, path: &Path) -> bool {
        self.paths.contains(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_var_counts_as_unset() {
        let env = StaticEnvironment::new()
            .with_var("OPENAI_API_KEY", "")
            .with_var("NVIDIA_API_KEY", "nvapi-1");
        assert_eq!(env.var("OPENAI_API_KEY"), None);
        assert_eq!(env.var("NVIDIA_API_KEY").as_deref(), Some("nvapi-1"));
        assert_eq!(env.var("MISSING"), None);
    }

    #[test]
    fn test_expand_path() {
        let env = StaticEnvironment::new().with_var("HOME", "/home/dev");
        assert_eq!(
            env.expand_path(Path::new("~/.aws/credentials")),
            PathBuf::from("/home/dev/.aws/credentials")
        );
        assert_eq!(
            env.expand_path(Path::new("/etc/creds")),
            PathBuf::from("/etc/creds")
        );
        // `~user` is not a home reference
        assert_eq!(
            env.expand_path(Path::new("~other/x")),
            PathBuf::from("~other/x")
        );
    }

    #[test]
    fn test_expand_path_without_home() {
        let env = StaticEnvironment::new();
        assert_eq!(env.expand_path(Path::new("~/x")), PathBuf::from("~/x"));
    }

    #[test]
    fn test_userprofile_fallback() {
        let env = StaticEnvironment::new().with_var("USERPROFILE", "C:/Users/dev");
        assert_eq!(env.home_dir(), Some(PathBuf::from("C:/Users/dev")));
    }

    #[test]
    fn test_set_and_remove() {
        let mut env = StaticEnvironment::new();
        env.set_var("A", "1");
        assert!(env.var("A").is_some());
        env.remove_var("A");
        assert!(env.var("A").is_none());
    }

    #[test]
    fn test_process_environment_paths() {
        let dir = tempfile::tempdir().unwrap();
        assert!(ProcessEnvironment.path_exists(dir.path()));
        assert!(!ProcessEnvironment.path_exists(&dir.path().join("nope")));
    }
}
