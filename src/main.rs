use bid_scraper::aggregator::{Aggregator, AggregateError, RunSummary, SourceOutcome, SourceRegistry};
use bid_scraper::cli::{Cli, Commands};
use bid_scraper::config::RunConfig;
use bid_scraper::logging::{init_logging, LoggingError};
use std::process::ExitCode;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum MainError {
    #[error("Logging error: {0}")]
    Logging(#[from] LoggingError),

    #[error("{0}")]
    Aggregate(#[from] AggregateError),
}

impl MainError {
    fn exit_code(&self) -> u8 {
        match self {
            MainError::Aggregate(AggregateError::Snapshot(_)) => 3,
            MainError::Aggregate(AggregateError::NoSourcesSelected { .. }) => 2,
            MainError::Aggregate(AggregateError::Client(_)) | MainError::Logging(_) => 1,
        }
    }
}

fn print_summary(summary: &RunSummary) {
    for report in &summary.reports {
        let note = match &report.outcome {
            SourceOutcome::Listed => String::new(),
            SourceOutcome::Inaccessible(reason) => format!(" (standing: {reason})"),
            SourceOutcome::Failed(error) => format!(" (failed: {error})"),
        };
        let dropped = if report.dropped > 0 {
            format!(", {} dropped", report.dropped)
        } else {
            String::new()
        };
        println!("  {:<18} {:>3} records{}{}", report.id, report.records, dropped, note);
    }
    println!(
        "Done! {} bids written to {}",
        summary.total,
        summary.output.display()
    );
    println!("  Michigan: {}  |  Ohio: {}", summary.michigan, summary.ohio);
}

fn list_sources() {
    for source in SourceRegistry::with_defaults().iter() {
        println!(
            "{:<18} {}  {:<22} {}",
            source.id(),
            source.state(),
            source.name(),
            source.portal_url()
        );
    }
}

async fn run(config: RunConfig) -> Result<(), MainError> {
    let _guard = init_logging(config.log_dir.as_deref())?;

    let aggregator = Aggregator::from_config(SourceRegistry::with_defaults(), &config)?;
    let summary = aggregator.run().await?;
    print_summary(&summary);

    Ok(())
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse_args();

    let result = match cli.into_command() {
        Commands::Run(args) => run(RunConfig::from(args)).await,
        Commands::Sources => {
            list_sources();
            Ok(())
        }
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, "Run failed");
            eprintln!("Error: {e}");
            ExitCode::from(e.exit_code())
        }
    }
}
