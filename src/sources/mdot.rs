//! MDOT bid letting schedule, narrowed to electrical and signal work.

use async_trait::async_trait;
use chrono::NaiveDate;

use super::{fetch_html, ExtractContext, Extraction, Source, SourceError, StandingEntry};
use crate::config::Config;
use crate::models::{BidStatus, Drawings, RawCandidate, UsState};
use crate::parser::{extract_tables, parse_date, truncate_chars};

pub const FETCH_URL: &str = "https://mdotjboss.state.mi.us/BidLetting/BidLettingHome.htm";
pub const PORTAL_URL: &str = "https://www.michigan.gov/mdot/business/contractors/bid-letting";
const SOURCE_NAME: &str = "MDOT Bid Letting";
const DRAWINGS_NOTE: &str = "Full plans & specs on Bid Express — free download";

const KEYWORDS: &[&str] = &["signal", "electric", "lighting", "illumin", "its ", "traffic"];

const STANDING: StandingEntry = StandingEntry {
    title: "MDOT 2026 Signalization & Electrical — Statewide Lettings",
    sub: "Multiple traffic signalization, highway lighting, and ITS projects — check Bid Express for current listings",
    location: "Statewide",
    state: UsState::MI,
    value: "$1M–$5M",
    source: SOURCE_NAME,
    url: PORTAL_URL,
    drawings: Drawings::Yes,
    drawings_note: DRAWINGS_NOTE,
};

pub struct MdotLetting {
    url: String,
}

impl MdotLetting {
    pub fn new() -> Self {
        Self::with_url(FETCH_URL)
    }

    pub fn with_url(url: impl Into<String>) -> Self {
        Self { url: url.into() }
    }
}

impl Default for MdotLetting {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Source for MdotLetting {
    fn id(&self) -> &str {
        "mdot-letting"
    }

    fn name(&self) -> &str {
        SOURCE_NAME
    }

    fn state(&self) -> UsState {
        UsState::MI
    }

    fn portal_url(&self) -> &str {
        PORTAL_URL
    }

    async fn extract(&self, ctx: &ExtractContext<'_>) -> Result<Extraction, SourceError> {
        let html = match fetch_html(ctx, &self.url, &STANDING).await {
            Ok(html) => html,
            Err(fallback) => return Ok(fallback),
        };

        let listings = parse_listings(&html, ctx.today);
        if listings.is_empty() {
            tracing::warn!(url = %self.url, "No electrical lettings recognized on MDOT schedule");
            return Ok(STANDING.inaccessible("no electrical lettings recognized on schedule page"));
        }
        Ok(Extraction::Listings(listings))
    }
}

/// Letting rows whose text mentions electrical or signal work.
pub fn parse_listings(html: &str, today: NaiveDate) -> Vec<RawCandidate> {
    let mut listings = Vec::new();

    for row in extract_tables(html).into_iter().flatten() {
        let cells = row.data_cells();
        if cells.len() < 2 {
            continue;
        }

        let text = format!("{} ", row.text().to_lowercase());
        if !KEYWORDS.iter().any(|kw| text.contains(kw)) {
            continue;
        }

        let title = truncate_chars(cells[0], Config::SHORT_TITLE_MAX);
        if title.is_empty() {
            continue;
        }

        let deadline = cells
            .iter()
            .filter_map(|cell| parse_date(cell))
            .find(|date| *date >= today);

        let mut candidate = RawCandidate::new(title, UsState::MI, PORTAL_URL)
            .with_sub("MDOT highway electrical / signalization project")
            .with_location("Michigan")
            .with_status(BidStatus::Open)
            .with_value("See Bid Docs")
            .with_source(SOURCE_NAME)
            .with_drawings(Drawings::Yes, DRAWINGS_NOTE);
        if let Some(date) = deadline {
            candidate = candidate.with_deadline(date.format("%Y-%m-%d").to_string());
        }
        listings.push(candidate);
    }

    listings
}
