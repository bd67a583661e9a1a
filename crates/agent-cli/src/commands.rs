//! Subcommand implementations

use crate::lambda::handle_event;
use crate::report::{availability_table, setup_guide, usage_table};
use agent_core::Agent;
use agent_provider::{ModelHandle, ProviderConfig, ProviderResolver, Resolution};
use agent_runtime::{AgentRuntime, ExecutorEventHandler, SimpleAgent};
use agent_tools::ToolRegistry;
use agent_workflow::{render_report, research_team};
use anyhow::Context as _;
use async_trait::async_trait;
use serde_json::Value;
use std::path::Path;
use std::process::ExitCode;
use std::sync::Arc;
use tracing::{info, warn};

type Resolver = ProviderResolver<ModelHandle>;

const PING_PROMPT: &str = "Say 'working' if you can hear me.";

/// Resolve one named provider, or the first viable one
fn resolve(resolver: &Resolver, provider: Option<&str>) -> anyhow::Result<Resolution<ModelHandle>> {
    let resolution = match provider {
        Some(name) => resolver.resolve_named(name)?,
        None => resolver.resolve()?,
    };

    for attempt in resolution.passed_over.iter().filter(|a| !a.is_skip()) {
        warn!(provider = %attempt.provider, "Fell back past {attempt}");
    }
    eprintln!(
        "Using {} ({})",
        resolution.handle.kind().display_name(),
        resolution.handle.model()
    );
    Ok(resolution)
}

/// Shows each tool call on stderr while `ask` runs
struct ToolCallPrinter;

#[async_trait]
impl ExecutorEventHandler for ToolCallPrinter {
    async fn on_tool_start(&self, _id: &str, name: &str, input: &Value) {
        eprintln!("-> {name} {input}");
    }

    async fn on_tool_done(
        &self,
        _id: &str,
        name: &str,
        result: Result<&Value, &str>,
        duration_ms: u64,
    ) {
        match result {
            Ok(value) => eprintln!("<- {name} {value} ({duration_ms} ms)"),
            Err(error) => eprintln!("<- {name} failed: {error} ({duration_ms} ms)"),
        }
    }
}

pub fn providers(resolver: &Resolver) {
    let availability = resolver.availability();
    println!("{}", availability_table(&availability));

    let guide = setup_guide(&availability);
    if guide.is_empty() {
        println!("\nAll configured providers are ready.");
    } else {
        println!("\nTo enable the remaining providers:");
        for line in guide {
            println!("  {line}");
        }
    }
}

pub async fn ask(
    resolver: &Resolver,
    prompt: String,
    provider: Option<&str>,
    with_tools: bool,
) -> anyhow::Result<()> {
    let resolution = resolve(resolver, provider)?;
    let tools = if with_tools {
        ToolRegistry::with_builtins()
    } else {
        ToolRegistry::new()
    };
    let runtime = AgentRuntime::new(resolution.handle, Arc::new(tools));

    let mut context = runtime.context();
    let answer = if with_tools {
        runtime
            .create_tool_agent("assistant")?
            .with_event_handler(Arc::new(ToolCallPrinter))
            .process(prompt, &mut context)
            .await?
    } else {
        runtime
            .create_simple_agent(runtime.simple_config(), "assistant")
            .process(prompt, &mut context)
            .await?
    };

    println!("{answer}");
    println!("\n{}", usage_table(&resolver.usage()));
    Ok(())
}

/// Build every available provider on its own
///
/// Fails (exit status 1) when no provider works.
pub async fn check(
    resolver: &Resolver,
    config: &ProviderConfig,
    ping: bool,
) -> anyhow::Result<ExitCode> {
    let mut working = 0usize;

    for entry in &config.providers {
        let name = entry.kind.id();
        let resolution = match resolver.resolve_named(name) {
            Ok(resolution) => resolution,
            Err(e) => {
                println!("[skip] {name}: {e}");
                continue;
            }
        };

        if !ping {
            println!("[ok]   {name}: built {}", resolution.handle.model());
            working += 1;
            continue;
        }

        let handle = resolution.handle;
        let agent = SimpleAgent::new(
            handle.provider(),
            agent_runtime::SimpleConfig::for_handle(&handle),
            name,
        );
        match agent
            .process(PING_PROMPT.to_string(), &mut agent_core::Context::new())
            .await
        {
            Ok(reply) if reply.to_lowercase().contains("working") => {
                println!("[ok]   {name}: {}", reply.trim());
                working += 1;
            }
            Ok(reply) => {
                let preview: String = reply.chars().take(50).collect();
                println!("[??]   {name}: unclear reply: {preview}");
                working += 1;
            }
            Err(e) => println!("[fail] {name}: {e}"),
        }
    }

    println!("\n{working} of {} providers working", config.providers.len());
    Ok(if working == 0 {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    })
}

pub async fn research(
    resolver: &Resolver,
    topic: &str,
    output: Option<&Path>,
    provider: Option<&str>,
) -> anyhow::Result<()> {
    let resolution = resolve(resolver, provider)?;
    let runtime = AgentRuntime::new(resolution.handle, Arc::new(ToolRegistry::new()));
    let workflow = research_team(&runtime)?;

    let mut context = runtime.context();
    let run = workflow.run_with_context(topic, &mut context).await;
    let report = render_report(&run);

    match output {
        Some(path) => {
            std::fs::write(path, &report)
                .with_context(|| format!("Cannot write report to {}", path.display()))?;
            info!(path = %path.display(), "Report written");
            println!(
                "Completed {} of {} stages; report saved to {}",
                run.completed().len(),
                run.stages.len(),
                path.display()
            );
        }
        None => println!("{report}"),
    }
    Ok(())
}

pub async fn invoke(resolver: &Resolver, event: &str) -> anyhow::Result<()> {
    // Anything that is not JSON is treated as a plain-text event
    let event: Value =
        serde_json::from_str(event).unwrap_or_else(|_| Value::String(event.to_string()));

    let response = handle_event(&event, |prompt| async move {
        let handle = resolver.resolve()?.handle;
        let agent = SimpleAgent::new(
            handle.provider(),
            agent_runtime::SimpleConfig::for_handle(&handle),
            "lambda",
        );
        let reply = agent
            .process(prompt, &mut agent_core::Context::new())
            .await?;
        Ok(reply)
    })
    .await;

    println!("{}", serde_json::to_string_pretty(&response)?);
    Ok(())
}
