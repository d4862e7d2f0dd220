// Global configuration constants - single source of truth

use std::path::PathBuf;

pub struct Config;

impl Config {
    // HTTP/Network config
    pub const DEFAULT_TIMEOUT_SECS: u64 = 20;
    pub const MIN_TIMEOUT_SECS: u64 = 1;
    pub const MAX_TIMEOUT_SECS: u64 = 120;
    pub const CONNECT_TIMEOUT_SECS: u64 = 10;
    pub const MAX_CONTENT_SIZE: usize = 10 * 1024 * 1024; // 10MB
    pub const USER_AGENT: &'static str = "ElectriBid-Scraper/1.0 (construction bid aggregator)";

    // Output
    pub const DEFAULT_OUTPUT: &'static str = "bids.json";

    // Normalization
    pub const CLOSING_WINDOW_DAYS: i64 = 14;
    pub const SHORT_TITLE_MAX: usize = 100;
    pub const LONG_TITLE_MAX: usize = 120;
    pub const LINK_TITLE_MAX: usize = 80;
}

/// Runtime settings for one aggregation run, assembled from CLI flags.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunConfig {
    /// Source ids to run; empty means every registered source.
    pub only: Vec<String>,
    /// Source ids to leave out.
    pub skip: Vec<String>,
    pub timeout_secs: u64,
    pub output: PathBuf,
    pub user_agent: String,
    pub closing_window_days: i64,
    pub log_dir: Option<PathBuf>,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            only: Vec::new(),
            skip: Vec::new(),
            timeout_secs: Config::DEFAULT_TIMEOUT_SECS,
            output: PathBuf::from(Config::DEFAULT_OUTPUT),
            user_agent: Config::USER_AGENT.to_string(),
            closing_window_days: Config::CLOSING_WINDOW_DAYS,
            log_dir: None,
        }
    }
}

impl RunConfig {
    /// Whether a source id survives the `only`/`skip` filters.
    pub fn is_enabled(&self, source_id: &str) -> bool {
        let selected = self.only.is_empty() || self.only.iter().any(|id| id == source_id);
        selected && !self.skip.iter().any(|id| id == source_id)
    }

    /// Timeout clamped to the supported range.
    pub fn effective_timeout_secs(&self) -> u64 {
        self.timeout_secs
            .clamp(Config::MIN_TIMEOUT_SECS, Config::MAX_TIMEOUT_SECS)
    }
}
