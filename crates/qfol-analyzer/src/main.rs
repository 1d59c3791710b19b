//! CLI entry point: replay an event log and print a QFOL report.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use tokio::io::BufReader;
use tracing_subscriber::{fmt, EnvFilter};

use qfol_analyzer::replay::{replay_file, replay_reader};
use qfol_analyzer::report::{Report, ReportAction};
use qfol_analyzer::QfolAnalyzer;
use qfol_core::QfolConfig;

#[derive(Parser)]
#[command(name = "qfol")]
#[command(about = "Score assistant interaction logs and check the deployment gate")]
struct Cli {
    /// JSONL event log to replay ("-" reads stdin).
    #[arg(short, long, default_value = "-")]
    input: String,

    /// Report to print: status, gate-check, metrics-only.
    #[arg(short, long, default_value = "status")]
    action: String,

    /// Also print one ingest receipt per accepted event.
    #[arg(long)]
    receipts: bool,

    /// Exit with a failure status when the deployment gate is closed.
    #[arg(long)]
    fail_on_gate: bool,

    /// Seed for the placeholder heuristics (overrides config).
    #[arg(long)]
    seed: Option<u64>,

    /// Config file prefix (default: qfol).
    #[arg(short, long, default_value = "qfol")]
    config: String,
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .json()
        .init();

    let cli = Cli::parse();
    let action: ReportAction = cli.action.parse()?;

    let mut config = QfolConfig::load(&cli.config)?;
    if cli.seed.is_some() {
        config.heuristic_seed = cli.seed;
    }
    let analyzer = QfolAnalyzer::new(config);

    let summary = if cli.input == "-" {
        replay_reader(&analyzer, BufReader::new(tokio::io::stdin())).await?
    } else {
        replay_file(&analyzer, &PathBuf::from(&cli.input)).await?
    };

    if cli.receipts {
        for receipt in &summary.receipts {
            println!("{}", serde_json::to_string(receipt)?);
        }
    }

    let report = analyzer.report(action);
    println!("{}", serde_json::to_string_pretty(&report)?);

    if let Report::Deployment(deployment) = &report {
        if cli.fail_on_gate && !deployment.deployment.allowed {
            return Ok(ExitCode::FAILURE);
        }
    }

    Ok(ExitCode::SUCCESS)
}
