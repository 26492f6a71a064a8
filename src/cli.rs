use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};

use crate::benchmark::{run_benchmark, BenchmarkParams};
use crate::config::PrepassConfig;

#[derive(Parser)]
#[command(name = "prepass")]
#[command(about = "Prepass - walk a declarative UI tree ahead of rendering", long_about = None)]
pub struct Cli {
    /// Path to config file (overrides PREPASS_CONFIG_PATH)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run a pass over a synthetic tree and report throughput
    Bench {
        /// Levels of function components below the root
        #[arg(long, default_value = "6")]
        depth: u32,

        /// Children rendered by every component
        #[arg(long, default_value = "4")]
        breadth: u32,

        /// Suspend every Nth component once (0 disables suspension)
        #[arg(long, default_value = "0")]
        suspend_every: u64,

        /// Time slice length in milliseconds (overrides config)
        #[arg(long)]
        yield_after_ms: Option<u64>,

        /// Disable cooperative yielding
        #[arg(long)]
        no_yield: bool,

        /// Print the report as JSON
        #[arg(long)]
        json: bool,
    },
}

/// Run the CLI by parsing process arguments
pub async fn run_cli() -> Result<()> {
    let cli = Cli::parse();
    run_cli_with_args(cli).await
}

/// Run the CLI with already-collected arguments
pub async fn run_cli_from_args(args: Vec<String>) -> Result<()> {
    let cli = Cli::parse_from(args);
    run_cli_with_args(cli).await
}

async fn run_cli_with_args(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Bench {
            depth,
            breadth,
            suspend_every,
            yield_after_ms,
            no_yield,
            json,
        } => {
            let mut builder = PrepassConfig::builder().config_path(cli.config);
            if let Some(ms) = yield_after_ms {
                builder = builder.yield_after_ms(ms);
            }
            if no_yield {
                builder = builder.cooperative_yield(false);
            }
            let config = builder.build()?;

            tracing::info!(depth, breadth, suspend_every, "starting benchmark");
            run_benchmark(BenchmarkParams {
                depth,
                breadth,
                suspend_every,
                config,
                json,
            })
            .await?;
        }
    }

    Ok(())
}
