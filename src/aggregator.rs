//! Runs every registered source, normalizes what they return and writes the
//! snapshot.

use futures_util::future::join_all;
use std::path::{Path, PathBuf};
use tracing::Instrument;

use crate::config::RunConfig;
use crate::models::{BidRecord, UsState};
use crate::network::{FetchError, HttpClient};
use crate::normalize::Normalizer;
use crate::snapshot::{write_snapshot, SnapshotError};
use crate::sources::{default_sources, ExtractContext, Extraction, Source};

/// Ordered set of sources the aggregator runs.
#[derive(Default)]
pub struct SourceRegistry {
    sources: Vec<Box<dyn Source>>,
}

impl SourceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry holding every known portal.
    pub fn with_defaults() -> Self {
        Self {
            sources: default_sources(),
        }
    }

    pub fn register(&mut self, source: Box<dyn Source>) {
        self.sources.push(source);
    }

    pub fn with(mut self, source: impl Source + 'static) -> Self {
        self.register(Box::new(source));
        self
    }

    /// Keep only the sources the run configuration enables.
    ///
    /// Ids in `only`/`skip` that match nothing are logged and ignored, but a
    /// selection that leaves no source at all from a non-empty registry is
    /// rejected so a typo cannot replace the snapshot with an empty one.
    pub fn filtered(self, config: &RunConfig) -> Result<Self, AggregateError> {
        for id in config.only.iter().chain(config.skip.iter()) {
            if !self.sources.iter().any(|s| s.id() == id.as_str()) {
                tracing::warn!(source = %id, "Unknown source id ignored");
            }
        }

        let registered = self.sources.len();
        let sources: Vec<_> = self
            .sources
            .into_iter()
            .filter(|s| config.is_enabled(s.id()))
            .collect();

        if sources.is_empty() && registered > 0 {
            return Err(AggregateError::NoSourcesSelected {
                only: config.only.clone(),
                skip: config.skip.clone(),
            });
        }
        Ok(Self { sources })
    }

    pub fn iter(&self) -> impl Iterator<Item = &dyn Source> {
        self.sources.iter().map(|s| &**s)
    }

    pub fn len(&self) -> usize {
        self.sources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }
}

/// How a single source fared.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceOutcome {
    /// Page read; listings (possibly none) extracted
    Listed,
    /// Portal unreachable or unreadable; standing entry emitted
    Inaccessible(String),
    /// Extractor failed outright; contributed nothing
    Failed(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceReport {
    pub id: String,
    pub name: String,
    pub outcome: SourceOutcome,
    /// Records that made it into the snapshot
    pub records: usize,
    /// Candidates rejected by the normalizer
    pub dropped: usize,
}

/// Operator-facing result of a run. Not part of the snapshot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSummary {
    pub output: PathBuf,
    pub reports: Vec<SourceReport>,
    pub total: usize,
    pub michigan: usize,
    pub ohio: usize,
}

impl RunSummary {
    pub fn failed_sources(&self) -> impl Iterator<Item = &SourceReport> {
        self.reports
            .iter()
            .filter(|r| matches!(r.outcome, SourceOutcome::Failed(_)))
    }
}

#[derive(Debug, thiserror::Error)]
pub enum AggregateError {
    #[error("failed to write snapshot: {0}")]
    Snapshot(#[from] SnapshotError),

    #[error("HTTP client error: {0}")]
    Client(#[from] FetchError),

    #[error("no registered source left after --only {only:?} / --skip {skip:?}")]
    NoSourcesSelected { only: Vec<String>, skip: Vec<String> },
}

pub struct Aggregator {
    registry: SourceRegistry,
    http: HttpClient,
    normalizer: Normalizer,
    output: PathBuf,
}

impl Aggregator {
    pub fn new(
        registry: SourceRegistry,
        http: HttpClient,
        normalizer: Normalizer,
        output: impl Into<PathBuf>,
    ) -> Self {
        Self {
            registry,
            http,
            normalizer,
            output: output.into(),
        }
    }

    /// Wire up an aggregator from CLI-level settings.
    pub fn from_config(
        registry: SourceRegistry,
        config: &RunConfig,
    ) -> Result<Self, AggregateError> {
        let registry = registry.filtered(config)?;
        let http = HttpClient::new(config.user_agent.clone(), config.effective_timeout_secs())?;
        let normalizer = Normalizer::new(
            chrono::Local::now().date_naive(),
            config.closing_window_days,
        );
        Ok(Self::new(
            registry,
            http,
            normalizer,
            config.output.clone(),
        ))
    }

    pub fn output(&self) -> &Path {
        &self.output
    }

    pub fn registry(&self) -> &SourceRegistry {
        &self.registry
    }

    /// Extract from every source and normalize the results.
    ///
    /// Sources are fetched concurrently, but nothing is returned until all
    /// of them have finished. Records come back grouped in registration
    /// order, each group in the order its extractor produced them.
    pub async fn collect(&self) -> (Vec<BidRecord>, Vec<SourceReport>) {
        let ctx = ExtractContext {
            http: &self.http,
            today: self.normalizer.today(),
        };

        let results = join_all(self.registry.iter().map(|source| {
            let span = tracing::info_span!("source", id = %source.id());
            let ctx = &ctx;
            async move { (source, source.extract(ctx).await) }.instrument(span)
        }))
        .await;

        let mut records = Vec::new();
        let mut reports = Vec::with_capacity(results.len());

        for (source, result) in results {
            let (outcome, candidates) = match result {
                Ok(Extraction::Listings(candidates)) => (SourceOutcome::Listed, candidates),
                Ok(Extraction::Inaccessible { reason, standing }) => {
                    tracing::info!(source = %source.id(), %reason, "Source inaccessible, using standing entry");
                    (SourceOutcome::Inaccessible(reason), vec![standing])
                }
                Err(e) => {
                    tracing::error!(source = %source.id(), error = %e, "Source extraction failed");
                    (SourceOutcome::Failed(e.to_string()), Vec::new())
                }
            };

            let mut kept = 0;
            let mut dropped = 0;
            for candidate in &candidates {
                match self.normalizer.normalize(candidate, source.name()) {
                    Ok(record) => {
                        records.push(record);
                        kept += 1;
                    }
                    Err(e) => {
                        tracing::warn!(
                            source = %source.id(),
                            title = ?candidate.title,
                            error = %e,
                            "Dropping invalid candidate"
                        );
                        dropped += 1;
                    }
                }
            }

            tracing::info!(source = %source.id(), records = kept, dropped, "Source done");
            reports.push(SourceReport {
                id: source.id().to_string(),
                name: source.name().to_string(),
                outcome,
                records: kept,
                dropped,
            });
        }

        (records, reports)
    }

    /// Run every source and replace the snapshot.
    ///
    /// Only a failure to write the snapshot is an error; anything that goes
    /// wrong inside a source is reflected in the summary instead.
    pub async fn run(&self) -> Result<RunSummary, AggregateError> {
        tracing::info!(sources = self.registry.len(), output = %self.output.display(), "Starting run");

        let (records, reports) = self.collect().await;
        write_snapshot(&self.output, &records).await?;

        let count = |state: UsState| records.iter().filter(|r| r.state == state).count();
        let summary = RunSummary {
            output: self.output.clone(),
            total: records.len(),
            michigan: count(UsState::MI),
            ohio: count(UsState::OH),
            reports,
        };

        tracing::info!(
            total = summary.total,
            michigan = summary.michigan,
            ohio = summary.ohio,
            "Snapshot written"
        );
        Ok(summary)
    }
}
