//! Ohio Facilities Construction Commission: solicitations and public notices.
//!
//! The two pages are separate sources so each one does a single fetch and
//! falls back independently.

use async_trait::async_trait;

use super::{fetch_html, resolve_href, ExtractContext, Extraction, Source, SourceError, StandingEntry};
use crate::config::Config;
use crate::models::{BidStatus, Drawings, RawCandidate, UsState};
use crate::parser::{extract_links, extract_tables, truncate_chars};

pub const BIDS_URL: &str = "https://ofcc.ohio.gov/project-opportunities/bids-rfqs";
pub const NOTICES_URL: &str = "https://ofcc.ohio.gov/project-opportunities/public-notices";
const SOURCE_NAME: &str = "OFCC / Bid Express";

const BIDS_STANDING: StandingEntry = StandingEntry {
    title: "OFCC Bids & RFQs — State Facility Construction",
    sub: "Ohio Facilities Construction Commission solicitations — check ofcc.ohio.gov for current listings",
    location: "Ohio",
    state: UsState::OH,
    value: "See Bid Docs",
    source: SOURCE_NAME,
    url: BIDS_URL,
    drawings: Drawings::Yes,
    drawings_note: "Available on ofcc.ohio.gov and Bid Express",
};

const NOTICES_STANDING: StandingEntry = StandingEntry {
    title: "OFCC Public Notices — Ohio School & State Construction",
    sub: "OFCC public notices may include electrical scope — check ofcc.ohio.gov for current notices",
    location: "Ohio",
    state: UsState::OH,
    value: "See Bid Docs",
    source: SOURCE_NAME,
    url: NOTICES_URL,
    drawings: Drawings::Yes,
    drawings_note: "Bid Express — free download after registration",
};

/// Solicitation links on the OFCC bids page.
pub struct OfccBids {
    url: String,
}

impl OfccBids {
    pub fn new() -> Self {
        Self::with_url(BIDS_URL)
    }

    pub fn with_url(url: impl Into<String>) -> Self {
        Self { url: url.into() }
    }
}

impl Default for OfccBids {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Source for OfccBids {
    fn id(&self) -> &str {
        "ofcc-bids"
    }

    fn name(&self) -> &str {
        SOURCE_NAME
    }

    fn state(&self) -> UsState {
        UsState::OH
    }

    fn portal_url(&self) -> &str {
        BIDS_URL
    }

    async fn extract(&self, ctx: &ExtractContext<'_>) -> Result<Extraction, SourceError> {
        let html = match fetch_html(ctx, &self.url, &BIDS_STANDING).await {
            Ok(html) => html,
            Err(fallback) => return Ok(fallback),
        };

        let listings = parse_solicitations(&html, &self.url);
        if listings.is_empty() {
            tracing::warn!(url = %self.url, "No solicitation links found on OFCC bids page");
        }
        Ok(Extraction::Listings(listings))
    }
}

/// Links that point at a `SOL-` document or whose text mentions a bid.
pub fn parse_solicitations(html: &str, page_url: &str) -> Vec<RawCandidate> {
    extract_links(html)
        .into_iter()
        .filter(|link| {
            link.href.to_uppercase().contains("SOL-") || link.text.to_uppercase().contains("BID")
        })
        .filter(|link| !link.text.is_empty())
        .map(|link| {
            let url = resolve_href(page_url, &link.href).unwrap_or_else(|| BIDS_URL.to_string());
            RawCandidate::new(truncate_chars(&link.text, Config::LONG_TITLE_MAX), UsState::OH, url)
                .with_sub("Ohio Facilities Construction Commission solicitation")
                .with_location("Ohio")
                .with_status(BidStatus::Open)
                .with_value("See Bid Docs")
                .with_source(SOURCE_NAME)
                .with_drawings(Drawings::Yes, "Available on ofcc.ohio.gov and Bid Express")
        })
        .collect()
}

/// Notice tables on the OFCC public notices page.
pub struct OfccNotices {
    url: String,
}

impl OfccNotices {
    pub fn new() -> Self {
        Self::with_url(NOTICES_URL)
    }

    pub fn with_url(url: impl Into<String>) -> Self {
        Self { url: url.into() }
    }
}

impl Default for OfccNotices {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Source for OfccNotices {
    fn id(&self) -> &str {
        "ofcc-notices"
    }

    fn name(&self) -> &str {
        SOURCE_NAME
    }

    fn state(&self) -> UsState {
        UsState::OH
    }

    fn portal_url(&self) -> &str {
        NOTICES_URL
    }

    async fn extract(&self, ctx: &ExtractContext<'_>) -> Result<Extraction, SourceError> {
        let html = match fetch_html(ctx, &self.url, &NOTICES_STANDING).await {
            Ok(html) => html,
            Err(fallback) => return Ok(fallback),
        };

        let listings = parse_notices(&html);
        if listings.is_empty() {
            tracing::warn!(url = %self.url, "No notice rows found on OFCC public notices page");
        }
        Ok(Extraction::Listings(listings))
    }
}

/// Body rows of every notice table; the first row of each table is its header.
pub fn parse_notices(html: &str) -> Vec<RawCandidate> {
    let mut listings = Vec::new();

    for table in extract_tables(html) {
        for row in table.iter().skip(1) {
            let cells = row.data_cells();
            if cells.len() < 2 {
                continue;
            }

            let title = cells[0];
            if title.chars().count() <= 5 {
                continue;
            }

            listings.push(
                RawCandidate::new(
                    truncate_chars(title, Config::LONG_TITLE_MAX),
                    UsState::OH,
                    NOTICES_URL,
                )
                .with_sub("OFCC public notice — may include electrical scope")
                .with_location("Ohio")
                .with_status(BidStatus::Open)
                .with_value("See Bid Docs")
                .with_source(SOURCE_NAME)
                .with_drawings(Drawings::Yes, "Bid Express — free download after registration"),
            );
        }
    }

    listings
}
