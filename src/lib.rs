pub mod aggregator;
pub mod cli;
pub mod config;
pub mod logging;
pub mod models;
pub mod network;
pub mod normalize;
pub mod parser;
pub mod snapshot;
pub mod sources;

// Re-export main types for library usage
pub use aggregator::{Aggregator, AggregateError, RunSummary, SourceOutcome, SourceRegistry};
pub use models::{BidRecord, BidStatus, Drawings, RawCandidate, UsState};
pub use network::{FetchError, FetchResult, HttpClient};
pub use normalize::{normalize, parse_value_sortable, NormalizeError, Normalizer};
pub use snapshot::{read_snapshot, write_snapshot, SnapshotError};
pub use sources::{ExtractContext, Extraction, Source, SourceError};
