//! Procurement portal integrations.
//!
//! Every portal is an independent [`Source`]. A source does at most one
//! page fetch per run and reports either the listings it found or that the
//! portal could not be read, in which case it hands back a single standing
//! placeholder that links to the portal for manual lookup.
//!
//! - `umich`: U-M AEC "Out to Bid" tables
//! - `mdot`: MDOT letting schedule, filtered to electrical/signal work
//! - `ofcc`: OFCC solicitation links and public notice tables
//! - `odot`: ODOT letting/advertisement links
//! - `standing`: login-gated portals that are never fetched

pub mod mdot;
pub mod odot;
pub mod ofcc;
pub mod standing;
pub mod umich;

use async_trait::async_trait;
use chrono::NaiveDate;

use crate::models::{BidStatus, Drawings, RawCandidate, UsState, VARIES};
use crate::network::HttpClient;

pub use mdot::MdotLetting;
pub use odot::OdotLetting;
pub use ofcc::{OfccBids, OfccNotices};
pub use standing::StandingSource;
pub use umich::UmichAec;

/// What a source needs from the outside world for one run.
pub struct ExtractContext<'a> {
    pub http: &'a HttpClient,
    /// Reference date for filtering past deadlines.
    pub today: NaiveDate,
}

/// Outcome of one extractor call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Extraction {
    /// The page was read; zero or more listings were found on it.
    Listings(Vec<RawCandidate>),
    /// The portal could not be read directly (login wall, PDF-only,
    /// unreachable, timed out, or nothing recognizable on the page).
    Inaccessible {
        reason: String,
        standing: RawCandidate,
    },
}

impl Extraction {
    pub fn into_candidates(self) -> Vec<RawCandidate> {
        match self {
            Extraction::Listings(candidates) => candidates,
            Extraction::Inaccessible { standing, .. } => vec![standing],
        }
    }

    pub fn is_inaccessible(&self) -> bool {
        matches!(self, Extraction::Inaccessible { .. })
    }
}

/// An extractor broke in a way it could not turn into a standing entry.
/// The aggregator logs it and moves on to the next source.
#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    #[error("extraction failed: {0}")]
    Failed(String),
}

/// A procurement portal integration.
#[async_trait]
pub trait Source: Send + Sync {
    /// Stable identifier used by `--only` / `--skip`.
    fn id(&self) -> &str;

    /// Portal name as shown in the `source` field.
    fn name(&self) -> &str;

    fn state(&self) -> UsState;

    /// Portal-level landing page that standing entries link to.
    fn portal_url(&self) -> &str;

    async fn extract(&self, ctx: &ExtractContext<'_>) -> Result<Extraction, SourceError>;
}

/// Fixed description of a portal used when it cannot be scraped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StandingEntry {
    pub title: &'static str,
    pub sub: &'static str,
    pub location: &'static str,
    pub state: UsState,
    pub value: &'static str,
    pub source: &'static str,
    pub url: &'static str,
    pub drawings: Drawings,
    pub drawings_note: &'static str,
}

impl StandingEntry {
    pub fn to_candidate(&self) -> RawCandidate {
        RawCandidate::new(self.title, self.state, self.url)
            .with_sub(self.sub)
            .with_location(self.location)
            .with_status(BidStatus::Standing)
            .with_deadline(VARIES)
            .with_value(self.value)
            .with_source(self.source)
            .with_drawings(self.drawings, self.drawings_note)
    }

    pub fn inaccessible(&self, reason: impl Into<String>) -> Extraction {
        Extraction::Inaccessible {
            reason: reason.into(),
            standing: self.to_candidate(),
        }
    }
}

/// Fetch a portal page, turning every way it can fail into a standing entry.
pub(crate) async fn fetch_html(
    ctx: &ExtractContext<'_>,
    url: &str,
    standing: &StandingEntry,
) -> Result<String, Extraction> {
    match ctx.http.fetch(url).await {
        Ok(page) if page.is_html() => Ok(page.content),
        Ok(page) => {
            let content_type = page.content_type.unwrap_or_default();
            tracing::warn!(url, content_type = %content_type, "Portal returned non-HTML content");
            Err(standing.inaccessible(format!("non-HTML content ({content_type})")))
        }
        Err(e) => {
            tracing::warn!(url, error = %e, "Failed to fetch portal page");
            Err(standing.inaccessible(e.to_string()))
        }
    }
}

/// Resolve a possibly relative href against the page it appeared on.
pub(crate) fn resolve_href(page_url: &str, href: &str) -> Option<String> {
    let base = url::Url::parse(page_url).ok()?;
    let joined = base.join(href).ok()?;
    match joined.scheme() {
        "http" | "https" => Some(joined.to_string()),
        _ => None,
    }
}

/// Every portal this scraper knows, in registration order.
pub fn default_sources() -> Vec<Box<dyn Source>> {
    let mut sources: Vec<Box<dyn Source>> = vec![
        Box::new(UmichAec::new()),
        Box::new(MdotLetting::new()),
        Box::new(OfccBids::new()),
        Box::new(OfccNotices::new()),
        Box::new(OdotLetting::new()),
    ];
    sources.extend(
        standing::catalog()
            .into_iter()
            .map(|source| Box::new(source) as Box<dyn Source>),
    );
    sources
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_default_source_ids_unique() {
        let sources = default_sources();
        assert_eq!(sources.len(), 11);

        let ids: HashSet<&str> = sources.iter().map(|s| s.id()).collect();
        assert_eq!(ids.len(), sources.len());
    }

    #[test]
    fn test_standing_entry_candidate() {
        let entry = StandingEntry {
            title: "Portal",
            sub: "Browse the portal",
            location: "Various",
            state: UsState::OH,
            value: "$50K–$1M+",
            source: "Portal Inc",
            url: "https://portal.example/",
            drawings: Drawings::Reg,
            drawings_note: "Requires vendor registration",
        };

        match entry.inaccessible("login required") {
            Extraction::Inaccessible { reason, standing } => {
                assert_eq!(reason, "login required");
                assert_eq!(standing.status.as_deref(), Some("standing"));
                assert_eq!(standing.url.as_deref(), Some("https://portal.example/"));
                assert_eq!(standing.deadline.as_deref(), Some("Varies"));
            }
            other => panic!("Expected Inaccessible, got {other:?}"),
        }
    }

    #[test]
    fn test_resolve_href() {
        let page = "https://ofcc.ohio.gov/project-opportunities/bids-rfqs";
        assert_eq!(
            resolve_href(page, "/docs/SOL-1.pdf").as_deref(),
            Some("https://ofcc.ohio.gov/docs/SOL-1.pdf")
        );
        assert_eq!(
            resolve_href(page, "https://other.example/x").as_deref(),
            Some("https://other.example/x")
        );
        assert_eq!(resolve_href(page, "ftp://files.example/x"), None);
        assert_eq!(resolve_href("not a url", "/x"), None);
    }
}
