use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use crate::config::{Config, RunConfig};

/// CLI entry point for the bid aggregator.
/// Exit codes: 0=snapshot written, 1=setup failure, 2=invalid arguments or
/// no source selected, 3=snapshot could not be written
#[derive(Parser, Debug)]
#[command(name = "bid_scraper")]
#[command(about = "Aggregates Michigan and Ohio construction bids into one JSON snapshot")]
#[command(version)]
pub struct Cli {
    // None means `run` with default settings
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Scrape every enabled portal and replace the snapshot file.
    Run(RunArgs),

    /// List registered sources and their portal pages.
    Sources,
}

#[derive(Args, Debug, Clone, PartialEq, Eq)]
pub struct RunArgs {
    #[arg(
        long,
        value_delimiter = ',',
        help = "Only run these source ids (comma-separated)"
    )]
    pub only: Vec<String>,

    #[arg(
        long,
        value_delimiter = ',',
        help = "Skip these source ids (comma-separated)"
    )]
    pub skip: Vec<String>,

    #[arg(
        short,
        long,
        default_value_t = Config::DEFAULT_TIMEOUT_SECS,
        help = "Per-request timeout in seconds (clamped to 1-120)"
    )]
    pub timeout: u64,

    #[arg(
        short,
        long,
        default_value = Config::DEFAULT_OUTPUT,
        help = "Snapshot file to write"
    )]
    pub output: PathBuf,

    #[arg(
        short,
        long,
        default_value = Config::USER_AGENT,
        help = "User agent string for requests"
    )]
    pub user_agent: String,

    #[arg(
        long,
        default_value_t = Config::CLOSING_WINDOW_DAYS,
        help = "Open bids due within this many days are marked closing"
    )]
    pub closing_window_days: i64,

    #[arg(long, help = "Also write rolling text and JSON logs to this directory")]
    pub log_dir: Option<PathBuf>,
}

impl Default for RunArgs {
    fn default() -> Self {
        let config = RunConfig::default();
        Self {
            only: config.only,
            skip: config.skip,
            timeout: config.timeout_secs,
            output: config.output,
            user_agent: config.user_agent,
            closing_window_days: config.closing_window_days,
            log_dir: config.log_dir,
        }
    }
}

impl From<RunArgs> for RunConfig {
    fn from(args: RunArgs) -> Self {
        RunConfig {
            only: args.only,
            skip: args.skip,
            timeout_secs: args.timeout,
            output: args.output,
            user_agent: args.user_agent,
            closing_window_days: args.closing_window_days,
            log_dir: args.log_dir,
        }
    }
}

impl Cli {
    /// On error, clap prints help and exits with code 2 (usage error).
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// The subcommand to execute; a bare invocation is a default run.
    pub fn into_command(self) -> Commands {
        self.command
            .unwrap_or_else(|| Commands::Run(RunArgs::default()))
    }
}
