//! oak-disperser - bounded-concurrency HTTP batch dispatcher
//!
//! Runs the push endpoint, or dispatches/validates a single batch from a file or stdin.

#![allow(missing_docs)]

use anyhow::Context;
use clap::{Parser, Subcommand};
use oak_disperser::config::Config;
use oak_disperser::utils::logging::init_logging;
use oak_disperser::{Disperser, DisperserError, server};
use std::path::PathBuf;
use std::process::ExitCode;
use tokio::io::AsyncReadExt;

const EXIT_BATCH_FAILED: u8 = 1;
const EXIT_INVALID: u8 = 2;

#[derive(Parser)]
#[command(name = "disperser")]
#[command(about = "Dispatch batches of outbound HTTP actions")]
#[command(version = env!("CARGO_PKG_VERSION"))]
struct Cli {
    /// YAML configuration file; defaults plus environment when omitted
    #[arg(short, long, env = "DISPERSER_CONFIG", global = true)]
    config: Option<PathBuf>,

    /// Override the per-batch concurrency bound
    #[arg(long, global = true)]
    concurrency: Option<usize>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run the HTTP service
    Serve,

    /// Validate and execute one batch, printing the report as JSON
    Dispatch {
        /// Batch JSON file, or `-` for stdin
        input: String,
    },

    /// Print the normalized batch as JSON
    Validate {
        /// Batch JSON file, or `-` for stdin
        input: String,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    let _ = dotenvy::dotenv();
    let cli = Cli::parse();

    match run(cli).await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<ExitCode> {
    let mut config = Config::load(cli.config.as_deref())
        .await
        .context("failed to load configuration")?;

    if let Some(concurrency) = cli.concurrency {
        config.dispatcher.concurrency = concurrency;
        config.validate()?;
    }

    init_logging(config.logging())?;

    match cli.command {
        Command::Serve => {
            server::run_server(config).await?;
            Ok(ExitCode::SUCCESS)
        }
        Command::Dispatch { input } => dispatch(&config, &input).await,
        Command::Validate { input } => validate(&config, &input).await,
    }
}

async fn dispatch(config: &Config, input: &str) -> anyhow::Result<ExitCode> {
    let payload = read_input(input).await?;
    let disperser = Disperser::new(config.dispatcher())?;

    let batch = match disperser.prepare(&payload) {
        Ok(batch) => batch,
        Err(err) => return Ok(report_invalid(err)),
    };

    let report = disperser.dispatch(batch).await;
    println!("{}", serde_json::to_string_pretty(&report.outcome())?);

    if report.is_success() {
        Ok(ExitCode::SUCCESS)
    } else {
        Ok(ExitCode::from(EXIT_BATCH_FAILED))
    }
}

async fn validate(config: &Config, input: &str) -> anyhow::Result<ExitCode> {
    let payload = read_input(input).await?;
    let validator = oak_disperser::BatchValidator::new(config.dispatcher());

    match validator.validate_slice(&payload) {
        Ok(batch) => {
            println!("{}", serde_json::to_string_pretty(&batch)?);
            Ok(ExitCode::SUCCESS)
        }
        Err(err) => Ok(report_invalid(err.into())),
    }
}

fn report_invalid(err: DisperserError) -> ExitCode {
    match &err {
        DisperserError::Validation(validation) => {
            for field in validation.errors() {
                eprintln!("invalid: {}", field);
            }
            ExitCode::from(EXIT_INVALID)
        }
        _ => {
            eprintln!("Error: {}", err);
            ExitCode::FAILURE
        }
    }
}

async fn read_input(input: &str) -> anyhow::Result<Vec<u8>> {
    if input == "-" {
        let mut buffer = Vec::new();
        tokio::io::stdin()
            .read_to_end(&mut buffer)
            .await
            .context("failed to read batch from stdin")?;
        return Ok(buffer);
    }

    tokio::fs::read(input)
        .await
        .with_context(|| format!("failed to read batch from {}", input))
}
