//! ODOT contract administration page. Lettings are published as PDFs, so
//! only the links to them are picked up.

use async_trait::async_trait;

use super::{fetch_html, resolve_href, ExtractContext, Extraction, Source, SourceError, StandingEntry};
use crate::config::Config;
use crate::models::{BidStatus, Drawings, RawCandidate, UsState};
use crate::parser::{extract_links, truncate_chars};

pub const PAGE_URL: &str =
    "https://www.dot.state.oh.us/Divisions/ContractAdmin/Contracts/Pages/default.aspx";
const SOURCE_NAME: &str = "ODOT Bid Letting";

const KEYWORDS: &[&str] = &["letting", "schedule", "advertisement"];

const STANDING: StandingEntry = StandingEntry {
    title: "ODOT 2026 Statewide Highway Electrical Lettings",
    sub: "Multiple lighting, signalization, and ITS electrical projects — check Bid Express for current listings",
    location: "Statewide",
    state: UsState::OH,
    value: "$1M–$5M",
    source: SOURCE_NAME,
    url: PAGE_URL,
    drawings: Drawings::Yes,
    drawings_note: "Full plans via ODOT eProposal and Bid Express",
};

pub struct OdotLetting {
    url: String,
}

impl OdotLetting {
    pub fn new() -> Self {
        Self::with_url(PAGE_URL)
    }

    pub fn with_url(url: impl Into<String>) -> Self {
        Self { url: url.into() }
    }
}

impl Default for OdotLetting {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Source for OdotLetting {
    fn id(&self) -> &str {
        "odot-letting"
    }

    fn name(&self) -> &str {
        SOURCE_NAME
    }

    fn state(&self) -> UsState {
        UsState::OH
    }

    fn portal_url(&self) -> &str {
        PAGE_URL
    }

    async fn extract(&self, ctx: &ExtractContext<'_>) -> Result<Extraction, SourceError> {
        let html = match fetch_html(ctx, &self.url, &STANDING).await {
            Ok(html) => html,
            Err(fallback) => return Ok(fallback),
        };

        let listings = parse_letting_links(&html, &self.url);
        if listings.is_empty() {
            tracing::warn!(url = %self.url, "No letting links found on ODOT page");
            return Ok(STANDING.inaccessible("no letting links found on contracts page"));
        }
        Ok(Extraction::Listings(listings))
    }
}

pub fn parse_letting_links(html: &str, page_url: &str) -> Vec<RawCandidate> {
    extract_links(html)
        .into_iter()
        .filter(|link| {
            let text = link.text.to_lowercase();
            KEYWORDS.iter().any(|kw| text.contains(kw))
        })
        .map(|link| {
            let title = format!(
                "ODOT Letting — {}",
                truncate_chars(&link.text, Config::LINK_TITLE_MAX)
            );
            let url = resolve_href(page_url, &link.href).unwrap_or_else(|| PAGE_URL.to_string());
            RawCandidate::new(title, UsState::OH, url)
                .with_sub("Ohio DOT construction letting — check for electrical/signalization scope")
                .with_location("Statewide")
                .with_status(BidStatus::Open)
                .with_value("See Bid Docs")
                .with_source(SOURCE_NAME)
                .with_drawings(Drawings::Yes, "ODOT eProposal and Bid Express")
        })
        .collect()
}
