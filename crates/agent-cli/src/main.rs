//! Command-line interface for the agent workshop

mod commands;
mod lambda;
mod report;

use agent_provider::ProviderConfig;
use agent_utils::{LogConfig, init_tracing, locate_config};
use anyhow::Context as _;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{debug, info};

#[derive(Parser, Debug)]
#[command(name = "workshop", version)]
#[command(about = "Multi-provider LLM agent workshop", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Provider configuration file (defaults to $WORKSHOP_CONFIG or ./workshop.json)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Debug logging when RUST_LOG is not set
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Log as JSON lines
    #[arg(long, global = true)]
    json_logs: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Show which providers are configured and how to set up the rest
    Providers,

    /// Ask a question, using the first provider that works
    Ask {
        prompt: String,

        /// Use only this provider (bedrock, openai, nvidia, openrouter)
        #[arg(long)]
        provider: Option<String>,

        /// Answer without the built-in tools
        #[arg(long)]
        no_tools: bool,
    },

    /// Build every available provider and optionally send a probe prompt
    Check {
        /// Send a short prompt to each provider that builds
        #[arg(long)]
        ping: bool,
    },

    /// Run the research team pipeline on a topic
    Research {
        topic: String,

        /// Write the markdown report here instead of printing it
        #[arg(short, long)]
        output: Option<PathBuf>,

        #[arg(long)]
        provider: Option<String>,
    },

    /// Handle a Lambda-style JSON event and print the response
    Invoke {
        /// Event JSON, e.g. '{"prompt": "Hello"}'
        #[arg(long)]
        event: String,
    },
}

fn load_config(explicit: Option<&std::path::Path>) -> anyhow::Result<ProviderConfig> {
    let cwd = std::env::current_dir().context("Cannot determine the working directory")?;
    match locate_config(explicit, &cwd, |name| std::env::var(name).ok())? {
        Some(path) => {
            info!(path = %path.display(), "Loading provider configuration");
            ProviderConfig::from_file(&path)
                .with_context(|| format!("Invalid provider configuration in {}", path.display()))
        }
        None => {
            debug!("No configuration file, using the built-in provider catalog");
            Ok(ProviderConfig::default())
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();
    init_tracing(&LogConfig::new(cli.verbose, cli.json_logs))?;

    let config = load_config(cli.config.as_deref())?;
    let resolver = config.process_resolver()?;

    match cli.command {
        Command::Providers => {
            commands::providers(&resolver);
            Ok(ExitCode::SUCCESS)
        }
        Command::Ask {
            prompt,
            provider,
            no_tools,
        } => {
            commands::ask(&resolver, prompt, provider.as_deref(), !no_tools).await?;
            Ok(ExitCode::SUCCESS)
        }
        Command::Check { ping } => commands::check(&resolver, &config, ping).await,
        Command::Research {
            topic,
            output,
            provider,
        } => {
            commands::research(&resolver, &topic, output.as_deref(), provider.as_deref()).await?;
            Ok(ExitCode::SUCCESS)
        }
        Command::Invoke { event } => {
            commands::invoke(&resolver, &event).await?;
            Ok(ExitCode::SUCCESS)
        }
    }
}
