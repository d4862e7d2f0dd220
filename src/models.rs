use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Placeholder for a deadline or value the portal does not state.
pub const VARIES: &str = "Varies";

/// State a listing belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum UsState {
    MI,
    OH,
}

impl UsState {
    pub fn as_str(&self) -> &'static str {
        match self {
            UsState::MI => "MI",
            UsState::OH => "OH",
        }
    }
}

impl fmt::Display for UsState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for UsState {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "MI" => Ok(UsState::MI),
            "OH" => Ok(UsState::OH),
            _ => Err(()),
        }
    }
}

/// Listing status. `Standing` marks a portal placeholder rather than a listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BidStatus {
    Open,
    Closing,
    Standing,
}

impl BidStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            BidStatus::Open => "open",
            BidStatus::Closing => "closing",
            BidStatus::Standing => "standing",
        }
    }
}

impl fmt::Display for BidStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BidStatus {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "open" => Ok(BidStatus::Open),
            "closing" => Ok(BidStatus::Closing),
            "standing" => Ok(BidStatus::Standing),
            _ => Err(()),
        }
    }
}

/// Availability of drawings for a bid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Drawings {
    /// Directly downloadable
    Yes,
    /// Requires vendor registration
    Reg,
    #[default]
    Tbd,
}

impl FromStr for Drawings {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "yes" => Ok(Drawings::Yes),
            "reg" => Ok(Drawings::Reg),
            "tbd" => Ok(Drawings::Tbd),
            _ => Err(()),
        }
    }
}

/// One normalized listing (or standing placeholder) in the snapshot.
///
/// Field names and enum spellings are the contract with the dashboard, so
/// every field is always serialized, including `posted` as `null`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BidRecord {
    pub title: String,
    pub sub: String,
    pub location: String,
    pub state: UsState,
    pub status: BidStatus,
    /// `YYYY-MM-DD` or [`VARIES`]
    pub deadline: String,
    pub value: String,
    pub value_sortable: u64,
    pub posted: Option<String>,
    pub source: String,
    pub url: String,
    pub drawings: Drawings,
    pub drawings_note: String,
}

/// Free-form listing data as an extractor found it.
///
/// Everything is optional text; the normalizer decides what is valid.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawCandidate {
    pub title: Option<String>,
    pub sub: Option<String>,
    pub location: Option<String>,
    pub state: Option<String>,
    pub status: Option<String>,
    pub deadline: Option<String>,
    pub value: Option<String>,
    pub posted: Option<String>,
    pub source: Option<String>,
    pub url: Option<String>,
    pub drawings: Option<String>,
    pub drawings_note: Option<String>,
}

impl RawCandidate {
    /// Start a candidate with the fields every listing needs.
    pub fn new(title: impl Into<String>, state: UsState, url: impl Into<String>) -> Self {
        Self {
            title: Some(title.into()),
            state: Some(state.as_str().to_string()),
            url: Some(url.into()),
            ..Default::default()
        }
    }

    pub fn with_sub(mut self, sub: impl Into<String>) -> Self {
        self.sub = Some(sub.into());
        self
    }

    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location = Some(location.into());
        self
    }

    pub fn with_status(mut self, status: BidStatus) -> Self {
        self.status = Some(status.as_str().to_string());
        self
    }

    pub fn with_deadline(mut self, deadline: impl Into<String>) -> Self {
        self.deadline = Some(deadline.into());
        self
    }

    pub fn with_value(mut self, value: impl Into<String>) -> Self {
        self.value = Some(value.into());
        self
    }

    pub fn with_posted(mut self, posted: impl Into<String>) -> Self {
        self.posted = Some(posted.into());
        self
    }

    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }

    pub fn with_drawings(mut self, drawings: Drawings, note: impl Into<String>) -> Self {
        let tag = match drawings {
            Drawings::Yes => "yes",
            Drawings::Reg => "reg",
            Drawings::Tbd => "tbd",
        };
        self.drawings = Some(tag.to_string());
        self.drawings_note = Some(note.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_serializes_contract_field_names() {
        let record = BidRecord {
            title: "Bridge Repair".to_string(),
            sub: String::new(),
            location: String::new(),
            state: UsState::MI,
            status: BidStatus::Open,
            deadline: "2026-05-01".to_string(),
            value: "$2M–$4M".to_string(),
            value_sortable: 2_000_000,
            posted: None,
            source: "MDOT".to_string(),
            url: "https://mdot.example".to_string(),
            drawings: Drawings::Tbd,
            drawings_note: String::new(),
        };

        let json: serde_json::Value = serde_json::to_value(&record).unwrap();
        let obj = json.as_object().unwrap();

        assert_eq!(obj.len(), 13);
        assert_eq!(json["state"], "MI");
        assert_eq!(json["status"], "open");
        assert_eq!(json["drawings"], "tbd");
        assert_eq!(json["valueSortable"], 2_000_000);
        assert!(obj.contains_key("drawingsNote"));
        assert_eq!(json["posted"], serde_json::Value::Null);
    }

    #[test]
    fn test_enum_parsing_is_case_insensitive() {
        assert_eq!("mi".parse::<UsState>(), Ok(UsState::MI));
        assert_eq!(" OH ".parse::<UsState>(), Ok(UsState::OH));
        assert!("IN".parse::<UsState>().is_err());

        assert_eq!("Standing".parse::<BidStatus>(), Ok(BidStatus::Standing));
        assert!("awarded".parse::<BidStatus>().is_err());

        assert_eq!("REG".parse::<Drawings>(), Ok(Drawings::Reg));
    }

    #[test]
    fn test_candidate_builder() {
        let raw = RawCandidate::new("Tunnel Lighting", UsState::OH, "https://x.example")
            .with_status(BidStatus::Standing)
            .with_drawings(Drawings::Reg, "Login required");

        assert_eq!(raw.state.as_deref(), Some("OH"));
        assert_eq!(raw.status.as_deref(), Some("standing"));
        assert_eq!(raw.drawings.as_deref(), Some("reg"));
        assert_eq!(raw.drawings_note.as_deref(), Some("Login required"));
        assert!(raw.sub.is_none());
    }
}
