//! Logging and tracing utilities

use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Output format of the log lines
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogFormat {
    /// Human-readable lines
    #[default]
    Text,
    /// One JSON object per line
    Json,
}

/// Logging options, usually taken from command line flags
#[derive(Debug, Clone, Default)]
pub struct LogConfig {
    /// Use `debug` instead of `info` when `RUST_LOG` is not set
    pub verbose: bool,
    pub format: LogFormat,
}

impl LogConfig {
    pub fn new(verbose: bool, json: bool) -> Self {
        Self {
            verbose,
            format: if json { LogFormat::Json } else { LogFormat::Text },
        }
    }

    /// Directive used when `RUST_LOG` is not set
    pub fn default_directive(&self) -> &'static str {
        if self.verbose { "debug" } else { "info" }
    }

    /// `RUST_LOG` if set and valid, the default directive otherwise
    pub fn filter(&self) -> EnvFilter {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(self.default_directive()))
    }
}

/// Initialize the global tracing subscriber
///
/// Logs go to stderr so command output on stdout stays clean. Returns an
/// error if a global subscriber is already installed.
pub fn init_tracing(config: &LogConfig) -> crate::Result<()> {
    let registry = tracing_subscriber::registry().with(config.filter());
    let result = match config.format {
        LogFormat::Text => registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .try_init(),
        LogFormat::Json => registry
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_writer(std::io::stderr),
            )
            .try_init(),
    };
    result.map_err(|e| crate::Error::Logging(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_config() {
        let config = LogConfig::new(true, true);
        assert_eq!(config.format, LogFormat::Json);
        assert_eq!(config.default_directive(), "debug");

        let config = LogConfig::default();
        assert_eq!(config.format, LogFormat::Text);
        assert_eq!(config.default_directive(), "info");
    }

    #[test]
    fn test_second_init_fails() {
        let config = LogConfig::default();
        // Another test in this binary may have installed one already
        let _ = init_tracing(&config);
        assert!(init_tracing(&config).is_err());
    }
}
