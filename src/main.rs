use clap::Parser;
use indowater::interfaces::report::ReportWriter;
use indowater::interfaces::runner::ScenarioRunner;
use indowater::interfaces::scenario::ScenarioReader;
use miette::{IntoDiagnostic, Result};
use std::fs::File;
use std::io::{self, BufReader};
use std::path::PathBuf;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Scenario file to replay (JSON lines)
    scenario: PathBuf,

    /// Payment gateway call timeout in milliseconds
    #[arg(long, default_value_t = 2_000)]
    gateway_timeout_ms: u64,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();
    let mut runner = ScenarioRunner::new(Duration::from_millis(cli.gateway_timeout_ms));

    let file = File::open(cli.scenario).into_diagnostic()?;
    let reader = ScenarioReader::new(BufReader::new(file));
    for event in reader.events() {
        match event {
            Ok(event) => {
                if let Err(e) = runner.apply(event).await {
                    tracing::error!(error = %e, "scenario step failed");
                }
            }
            Err(e) => {
                tracing::error!(error = %e, "skipping malformed scenario line");
            }
        }
    }

    let report = runner.report().await.into_diagnostic()?;
    let stdout = io::stdout();
    let mut writer = ReportWriter::new(stdout.lock());
    writer.write_report(&report).into_diagnostic()?;

    Ok(())
}
