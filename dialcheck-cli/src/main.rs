//! dialcheck CLI - Run scenario batches against a voice agent's prompt

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use dialcheck_core::prelude::*;

#[derive(Parser)]
#[command(name = "dialcheck")]
#[command(about = "Scenario test harness for conversational voice agents", long_about = None)]
#[command(version)]
struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Replay a scenario file and report the results
    Run {
        /// Scenario file (`{"scenarios": [...]}`)
        #[arg(short, long)]
        scenarios: PathBuf,

        /// File holding the agent's system prompt
        #[arg(short, long)]
        prompt: PathBuf,

        /// Extra configuration file
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Write the JSON run summary here instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Write a Markdown report here (a directory gets a dated file name)
        #[arg(short, long)]
        report: Option<PathBuf>,
    },
    /// List the outcome catalog
    Catalog {
        /// Extra configuration file
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
    /// Version information
    Version,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing
    let default_filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_filter)),
        )
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Version => {
            println!("dialcheck {}", env!("CARGO_PKG_VERSION"));
            println!("dialcheck-core {}", dialcheck_core::VERSION);
        }
        Commands::Catalog { config } => {
            let config = DialcheckConfig::load_with(config.as_deref())?;
            let catalog = OutcomeCatalog::load(config.catalog_path.as_deref())?;
            for id in catalog.ids() {
                let rules: Vec<&str> = catalog.lookup(id).iter().map(OutcomeRule::pattern).collect();
                println!("{:<28} {}", id, rules.join(" | "));
            }
        }
        Commands::Run {
            scenarios,
            prompt,
            config,
            output,
            report,
        } => {
            let config = DialcheckConfig::load_with(config.as_deref())?;
            let set = ScenarioSet::load(&scenarios)?;
            let system_prompt = std::fs::read_to_string(&prompt)
                .with_context(|| format!("failed to read system prompt {}", prompt.display()))?;

            let provider = Arc::new(OpenAIProvider::from_config(&config.llm)?);
            let info = provider.model_info();
            tracing::info!(
                provider = %info.provider,
                model = %info.model_name,
                "using backend {}",
                provider.base_url()
            );

            let harness = TestHarness::from_config(&config, provider)?;
            let summary = harness.run_all(&set.scenarios, &system_prompt).await?;

            let json = serde_json::to_string_pretty(&summary)?;
            match output {
                Some(path) => std::fs::write(&path, json)
                    .with_context(|| format!("failed to write summary {}", path.display()))?,
                None => println!("{}", json),
            }

            if let Some(path) = report {
                let path = report_path(&path, &summary);
                std::fs::write(&path, render_markdown(&summary))
                    .with_context(|| format!("failed to write report {}", path.display()))?;
                tracing::info!("report written to {}", path.display());
            }

            eprintln!(
                "{}/{} scenarios passed",
                summary.successful, summary.total_scenarios
            );
        }
    }

    Ok(())
}

fn report_path(path: &Path, summary: &RunSummary) -> PathBuf {
    if path.is_dir() {
        path.join(report_file_name(summary.run_at))
    } else {
        path.to_path_buf()
    }
}
