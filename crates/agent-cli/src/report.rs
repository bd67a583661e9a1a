//! Tables printed by the commands

use agent_provider::requirement::describe;
use agent_provider::{Availability, ProviderKind, UsageSummary};
use comfy_table::{Table, presets::UTF8_FULL};

fn table(header: &[&str]) -> Table {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL).set_header(header.to_vec());
    table
}

/// One row per provider, in resolution order
pub fn availability_table(availability: &[Availability]) -> Table {
    let mut table = table(&["#", "Provider", "Name", "Tier", "Default model", "Status"]);
    for (position, entry) in availability.iter().enumerate() {
        let kind = entry.provider.parse::<ProviderKind>().ok();
        let status = if entry.available {
            "ready".to_string()
        } else {
            format!("missing {}", describe(&entry.missing))
        };
        table.add_row(vec![
            (position + 1).to_string(),
            entry.provider.clone(),
            kind.map_or("-", ProviderKind::display_name).to_string(),
            kind.map_or_else(|| "-".to_string(), |k| k.cost_tier().to_string()),
            kind.map_or("-", ProviderKind::default_model).to_string(),
            status,
        ]);
    }
    table
}

/// Setup instructions for every provider that is not ready
pub fn setup_guide(availability: &[Availability]) -> Vec<String> {
    availability
        .iter()
        .filter(|entry| !entry.available)
        .filter_map(|entry| entry.provider.parse::<ProviderKind>().ok())
        .map(|kind| format!("{}: {}", kind.display_name(), kind.setup_hint()))
        .collect()
}

pub fn usage_table(usage: &UsageSummary) -> Table {
    let mut table = table(&["Provider", "Attempts", "Successes", "Failures", "Success rate"]);
    for (provider, stats) in &usage.per_provider {
        table.add_row(vec![
            provider.clone(),
            stats.attempts.to_string(),
            stats.successes.to_string(),
            stats.failures.to_string(),
            format!("{:.0}%", stats.success_rate * 100.0),
        ]);
    }
    table
}

#[cfg(test)]
mod tests {
    use super::*;
    use agent_provider::{ProviderConfig, StaticEnvironment, UsageRecorder};
    use std::sync::Arc;

    fn availability() -> Vec<Availability> {
        let env = StaticEnvironment::new().with_var("OPENAI_API_KEY", "sk-test");
        ProviderConfig::default()
            .resolver(Arc::new(env))
            .unwrap()
            .availability()
    }

    #[test]
    fn test_availability_table() {
        let rendered = availability_table(&availability()).to_string();
        assert!(rendered.contains("OpenAI (GPT-4o)"));
        assert!(rendered.contains("ready"));
        assert!(rendered.contains("missing env NVIDIA_API_KEY"));
        assert!(rendered.find("bedrock").unwrap() < rendered.find("openrouter").unwrap());
    }

    #[test]
    fn test_setup_guide_lists_only_missing() {
        let guide = setup_guide(&availability());
        assert_eq!(guide.len(), 3);
        assert!(guide.iter().all(|line| !line.starts_with("OpenAI")));
        assert!(guide.contains(&"NVIDIA NIM (Llama 3): export NVIDIA_API_KEY='nvapi-...'".to_string()));
    }

    #[test]
    fn test_usage_table() {
        let mut recorder = UsageRecorder::new();
        recorder.record_attempt("bedrock", false);
        recorder.record_attempt("openai", true);
        recorder.record_attempt("openai", true);

        let rendered = usage_table(&recorder.summary()).to_string();
        assert!(rendered.contains("100%"));
        assert!(rendered.contains("0%"));
    }
}
