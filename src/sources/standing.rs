//! Login-gated portals.
//!
//! These require a vendor account to list individual bids, so they are
//! never fetched and always contribute their standing entry.

use async_trait::async_trait;

use super::{ExtractContext, Extraction, Source, SourceError, StandingEntry};
use crate::models::{Drawings, UsState};

/// A portal that is represented only by its standing entry.
#[derive(Debug, Clone)]
pub struct StandingSource {
    id: &'static str,
    reason: &'static str,
    entry: StandingEntry,
}

impl StandingSource {
    pub const fn new(id: &'static str, reason: &'static str, entry: StandingEntry) -> Self {
        Self { id, reason, entry }
    }

    pub fn entry(&self) -> &StandingEntry {
        &self.entry
    }
}

#[async_trait]
impl Source for StandingSource {
    fn id(&self) -> &str {
        self.id
    }

    fn name(&self) -> &str {
        self.entry.source
    }

    fn state(&self) -> UsState {
        self.entry.state
    }

    fn portal_url(&self) -> &str {
        self.entry.url
    }

    async fn extract(&self, _ctx: &ExtractContext<'_>) -> Result<Extraction, SourceError> {
        Ok(self.entry.inaccessible(self.reason))
    }
}

pub fn catalog() -> Vec<StandingSource> {
    vec![
        StandingSource::new(
            "dtmb-sigma",
            "SIGMA VSS listings require a vendor login",
            StandingEntry {
                title: "Michigan DTMB — State Facility Electrical Projects",
                sub: "DTMB Design & Construction capital improvement projects — browse SIGMA VSS for current listings",
                location: "Lansing / Various",
                state: UsState::MI,
                value: "$500K–$2M",
                source: "DTMB SIGMA VSS",
                url: "https://www.michigan.gov/dtmb/procurement/design-and-construction",
                drawings: Drawings::Reg,
                drawings_note: "SIGMA VSS — vendor registration required",
            },
        ),
        StandingSource::new(
            "msu-ipf",
            "MSU Plan Room listings require a Bid Manager login",
            StandingEntry {
                title: "MSU Capital Projects — Electrical & Building Systems",
                sub: "Michigan State University IPF construction bids — check Plan Room for current listings",
                location: "East Lansing",
                state: UsState::MI,
                value: "$200K–$2M+",
                source: "MSU IPF Plan Room",
                url: "https://ipf.msu.edu/plan-room",
                drawings: Drawings::Reg,
                drawings_note: "MSU Plan Room — Bid Manager registration required",
            },
        ),
        StandingSource::new(
            "bidnet-mitn",
            "BidNet listings require a login",
            StandingEntry {
                title: "MITN Local Government Electrical — Multiple MI Municipalities",
                sub: "Aggregated electrical bids from ~200 Michigan local governments incl. schools & utilities",
                location: "Various",
                state: UsState::MI,
                value: "$50K–$1M+",
                source: "BidNet / MITN",
                url: "https://www.bidnetdirect.com/mitn",
                drawings: Drawings::Reg,
                drawings_note: "Varies by agency — most require BidNet login",
            },
        ),
        StandingSource::new(
            "osu-bidexpress",
            "Bid Express listings require vendor registration",
            StandingEntry {
                title: "Ohio State University — Campus Electrical & Infrastructure",
                sub: "OSU Facilities Operations capital projects — browse Bid Express for current listings",
                location: "Columbus",
                state: UsState::OH,
                value: "$1M–$5M",
                source: "OSU / Bid Express",
                url: "https://fod.osu.edu/resources",
                drawings: Drawings::Reg,
                drawings_note: "Bid Express — free vendor registration required",
            },
        ),
        StandingSource::new(
            "franklin-county",
            "County bid ads are published as documents, not listings",
            StandingEntry {
                title: "Franklin County — Public Works Electrical Projects",
                sub: "County construction bids incl. electrical, lighting, and building systems — Columbus metro",
                location: "Columbus",
                state: UsState::OH,
                value: "$200K–$2M",
                source: "Franklin County",
                url: "https://bids.franklincountyohio.gov/",
                drawings: Drawings::Tbd,
                drawings_note: "Obtain at county office (373 S. High St) or per ad",
            },
        ),
        StandingSource::new(
            "bidnet-ohio",
            "BidNet listings require registration",
            StandingEntry {
                title: "Ohio Purchasing Group — Statewide Local Electrical Bids",
                sub: "Aggregated state and local government electrical RFPs and bids across Ohio municipalities",
                location: "Various",
                state: UsState::OH,
                value: "$50K–$1M+",
                source: "BidNet / Ohio",
                url: "https://www.bidnetdirect.com/ohio",
                drawings: Drawings::Reg,
                drawings_note: "Varies by agency — most require BidNet registration",
            },
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::network::HttpClient;
    use chrono::NaiveDate;

    #[test]
    fn test_catalog_covers_both_states() {
        let catalog = catalog();
        assert_eq!(catalog.len(), 6);
        assert_eq!(catalog.iter().filter(|s| s.state() == UsState::MI).count(), 3);
        assert_eq!(catalog.iter().filter(|s| s.state() == UsState::OH).count(), 3);
        for source in &catalog {
            assert!(!source.entry().drawings_note.is_empty(), "{}", source.id());
            assert!(source.portal_url().starts_with("https://"), "{}", source.id());
        }
    }

    #[tokio::test]
    async fn test_standing_source_never_lists() {
        let http = HttpClient::new("TestBot/1.0".to_string(), 1).unwrap();
        let ctx = ExtractContext {
            http: &http,
            today: NaiveDate::from_ymd_opt(2026, 4, 1).unwrap(),
        };

        for source in catalog() {
            let extraction = source.extract(&ctx).await.unwrap();
            assert!(extraction.is_inaccessible(), "{}", source.id());
            let candidates = extraction.into_candidates();
            assert_eq!(candidates.len(), 1);
            assert_eq!(candidates[0].url.as_deref(), Some(source.portal_url()));
        }
    }
}
