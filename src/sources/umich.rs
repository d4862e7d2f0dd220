//! University of Michigan AEC "Out to Bid" page.

use async_trait::async_trait;
use chrono::NaiveDate;
use lazy_static::lazy_static;
use regex::Regex;

use super::{fetch_html, ExtractContext, Extraction, Source, SourceError, StandingEntry};
use crate::models::{BidStatus, Drawings, RawCandidate, UsState};
use crate::parser::{extract_tables, parse_date};

pub const PAGE_URL: &str = "https://umaec.umich.edu/for-vendors/bids-proposals/";
const SOURCE_NAME: &str = "U-M AEC";
const DRAWINGS_NOTE: &str = "BuildingConnected — vendor registration required";

lazy_static! {
    // "P00012345 – Chiller Replacement"
    static ref PROJECT_TITLE: Regex =
        Regex::new(r"^(P\d+)\s*[–-]\s*(.*)$").expect("Invalid project regex");
}

const STANDING: StandingEntry = StandingEntry {
    title: "University of Michigan — AEC Out to Bid",
    sub: "U-M Architecture, Engineering & Construction projects — check the Out to Bid page for current listings",
    location: "Ann Arbor",
    state: UsState::MI,
    value: "See Bid Docs",
    source: SOURCE_NAME,
    url: PAGE_URL,
    drawings: Drawings::Reg,
    drawings_note: DRAWINGS_NOTE,
};

pub struct UmichAec {
    url: String,
}

impl UmichAec {
    pub fn new() -> Self {
        Self::with_url(PAGE_URL)
    }

    /// Point the extractor at a different page, e.g. a mirror.
    pub fn with_url(url: impl Into<String>) -> Self {
        Self { url: url.into() }
    }
}

impl Default for UmichAec {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Source for UmichAec {
    fn id(&self) -> &str {
        "umich-aec"
    }

    fn name(&self) -> &str {
        SOURCE_NAME
    }

    fn state(&self) -> UsState {
        UsState::MI
    }

    fn portal_url(&self) -> &str {
        PAGE_URL
    }

    async fn extract(&self, ctx: &ExtractContext<'_>) -> Result<Extraction, SourceError> {
        let html = match fetch_html(ctx, &self.url, &STANDING).await {
            Ok(html) => html,
            Err(fallback) => return Ok(fallback),
        };

        let listings = parse_listings(&html, ctx.today);
        if listings.is_empty() {
            tracing::warn!(url = %self.url, "No bid rows found on U-M AEC page");
        }
        Ok(Extraction::Listings(listings))
    }
}

/// Pull open projects out of every table on the page.
///
/// Header rows, awarded projects and rows whose deadline has already
/// passed are skipped. Rows with an unreadable deadline are kept.
pub fn parse_listings(html: &str, today: NaiveDate) -> Vec<RawCandidate> {
    let mut listings = Vec::new();

    for row in extract_tables(html).into_iter().flatten() {
        if row.cells.len() < 2 {
            continue;
        }

        let first = row.cells[0].text.as_str();
        if first.is_empty() || (first.contains("Project") && first.contains("Name")) {
            continue;
        }

        if row.text().to_lowercase().contains("awarded") {
            continue;
        }

        let (project_number, title) = match PROJECT_TITLE.captures(first) {
            Some(caps) => (caps[1].to_string(), caps[2].trim().to_string()),
            None => (String::new(), first.to_string()),
        };
        if title.is_empty() {
            continue;
        }

        let deadline = row.cells.last().and_then(|cell| parse_date(&cell.text));
        if matches!(deadline, Some(date) if date < today) {
            continue;
        }

        let sub = if project_number.is_empty() {
            "University of Michigan construction project".to_string()
        } else {
            format!("{project_number} · University of Michigan construction project")
        };

        let mut candidate = RawCandidate::new(title, UsState::MI, PAGE_URL)
            .with_sub(sub)
            .with_location("Ann Arbor")
            .with_status(BidStatus::Open)
            .with_value("See Bid Docs")
            .with_source(SOURCE_NAME)
            .with_drawings(Drawings::Reg, DRAWINGS_NOTE);
        if let Some(date) = deadline {
            candidate = candidate.with_deadline(date.format("%Y-%m-%d").to_string());
        }
        listings.push(candidate);
    }

    listings
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::network::HttpClient;

    const PAGE: &str = r#"
        <html><body>
        <table>
          <tr><th>Project Name</th><th>Bid Due</th></tr>
          <tr><td>P00012345 – Hospital Switchgear Replacement</td><td>05/15/2026</td></tr>
          <tr><td>P00099999 - Central Campus Tunnel Lighting</td><td>TBD</td></tr>
          <tr><td>North Campus Chiller Plant</td><td>Awarded</td></tr>
          <tr><td>Old Boiler Project</td><td>01/05/2026</td></tr>
          <tr><td>Single cell row</td></tr>
          <tr><td></td><td>05/15/2026</td></tr>
        </table>
        </body></html>
    "#;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 4, 1).unwrap()
    }

    #[test]
    fn test_parse_listings() {
        let listings = parse_listings(PAGE, today());
        assert_eq!(listings.len(), 2);

        let first = &listings[0];
        assert_eq!(first.title.as_deref(), Some("Hospital Switchgear Replacement"));
        assert_eq!(
            first.sub.as_deref(),
            Some("P00012345 · University of Michigan construction project")
        );
        assert_eq!(first.deadline.as_deref(), Some("2026-05-15"));
        assert_eq!(first.state.as_deref(), Some("MI"));
        assert_eq!(first.drawings.as_deref(), Some("reg"));

        let second = &listings[1];
        assert_eq!(second.title.as_deref(), Some("Central Campus Tunnel Lighting"));
        assert_eq!(second.deadline, None);
    }

    #[test]
    fn test_parse_listings_without_tables() {
        assert!(parse_listings("<p>We are updating this page.</p>", today()).is_empty());
    }

    #[tokio::test]
    async fn test_unreachable_portal_yields_standing_entry() {
        let http = HttpClient::new("TestBot/1.0".to_string(), 2).unwrap();
        let ctx = ExtractContext {
            http: &http,
            today: today(),
        };

        let source = UmichAec::with_url("http://127.0.0.1:1/bids");
        let extraction = source.extract(&ctx).await.unwrap();

        match extraction {
            Extraction::Inaccessible { standing, .. } => {
                assert_eq!(standing.status.as_deref(), Some("standing"));
                assert_eq!(standing.url.as_deref(), Some(PAGE_URL));
            }
            other => panic!("Expected Inaccessible, got {other:?}"),
        }
    }
}
