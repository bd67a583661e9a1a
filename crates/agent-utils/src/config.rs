//! Locating the workshop configuration file

use std::path::{Path, PathBuf};

/// Environment variable naming the configuration file
pub const CONFIG_ENV_VAR: &str = "WORKSHOP_CONFIG";

/// File name looked for in the working directory
pub const DEFAULT_CONFIG_FILE: &str = "workshop.json";

/// Pick the configuration file to load
///
/// An explicit path wins and must exist. Otherwise `WORKSHOP_CONFIG` (read
/// through `lookup`) and then `workshop.json` in `cwd` are tried. `Ok(None)`
/// means run with built-in defaults.
pub fn locate_config(
    explicit: Option<&Path>,
    cwd: &Path,
    lookup: impl Fn(&str) -> Option<String>,
) -> crate::Result<Option<PathBuf>> {
    if let Some(path) = explicit {
        return if path.is_file() {
            Ok(Some(path.to_path_buf()))
        } else {
            Err(crate::Error::ConfigNotFound(path.to_path_buf()))
        };
    }

    if let Some(value) = lookup(CONFIG_ENV_VAR).filter(|v| !v.trim().is_empty()) {
        let path = PathBuf::from(value);
        return if path.is_file() {
            Ok(Some(path))
        } else {
            Err(crate::Error::ConfigNotFound(path))
        };
    }

    let candidate = cwd.join(DEFAULT_CONFIG_FILE);
    Ok(candidate.is_file().then_some(candidate))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_explicit_path() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("providers.json");
        fs::write(&file, "{}").unwrap();

        let found = locate_config(Some(&file), dir.path(), |_| None).unwrap();
        assert_eq!(found, Some(file));

        let missing = dir.path().join("nope.json");
        let err = locate_config(Some(&missing), dir.path(), |_| None).unwrap_err();
        assert!(matches!(err, crate::Error::ConfigNotFound(p) if p == missing));
    }

    #[test]
    fn test_env_var_then_cwd() {
        let dir = tempfile::tempdir().unwrap();
        let from_env = dir.path().join("env.json");
        fs::write(&from_env, "{}").unwrap();
        let env_value = from_env.to_string_lossy().into_owned();

        let found = locate_config(None, dir.path(), |name| {
            (name == CONFIG_ENV_VAR).then(|| env_value.clone())
        })
        .unwrap();
        assert_eq!(found, Some(from_env));

        assert_eq!(locate_config(None, dir.path(), |_| None).unwrap(), None);

        let default = dir.path().join(DEFAULT_CONFIG_FILE);
        fs::write(&default, "{}").unwrap();
        assert_eq!(
            locate_config(None, dir.path(), |_| Some(String::new())).unwrap(),
            Some(default)
        );
    }
}
