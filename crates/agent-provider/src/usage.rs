//! Per-provider attempt counters

use serde::Serialize;
use std::collections::BTreeMap;

/// Tallies build attempts per provider
///
/// Skips are not attempts and are never recorded here.
#[derive(Debug, Clone, Default)]
pub struct UsageRecorder {
    total_attempts: u64,
    successes: BTreeMap<String, u64>,
    failures: BTreeMap<String, u64>,
}

impl UsageRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_attempt(&mut self, provider: &str, success: bool) {
        self.total_attempts += 1;
        let counts = if success {
            &mut self.successes
        } else {
            &mut self.failures
        };
        *counts.entry(provider.to_string()).or_default() += 1;
    }

    pub fn total_attempts(&self) -> u64 {
        self.total_attempts
    }

    pub fn successes(&self, provider: &str) -> u64 {
        self.successes.get(provider).copied().unwrap_or_default()
    }

    pub fn failures(&self, provider: &str) -> u64 {
        self.failures.get(provider).copied().unwrap_or_default()
    }

    /// Snapshot of the counters, ordered by provider name
    pub fn summary(&self) -> UsageSummary {
        let mut per_provider: BTreeMap<String, ProviderUsage> = BTreeMap::new();
        for (name, &count) in &self.successes {
            per_provider.entry(name.clone()).or_default().successes = count;
        }
        for (name, &count) in &self.failures {
            per_provider.entry(name.clone()).or_default().failures = count;
        }
        for usage in per_provider.values_mut() {
            usage.attempts = usage.successes + usage.failures;
            usage.success_rate = usage.successes as f64 / usage.attempts as f64;
        }

        UsageSummary {
            total_attempts: self.total_attempts,
            per_provider,
        }
    }
}

/// Serializable view of a [`UsageRecorder`]
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct UsageSummary {
    pub total_attempts: u64,
    pub per_provider: BTreeMap<String, ProviderUsage>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ProviderUsage {
    pub attempts: u64,
    pub successes: u64,
    pub failures: u64,
    /// Successes over attempts, in `0.0..=1.0`
    pub success_rate: f64,
}

impl UsageSummary {
    pub fn is_empty(&self) -> bool {
        self.total_attempts == 0
    }
}
