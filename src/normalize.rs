//! Map free-form extractor output onto the snapshot schema.
//!
//! Normalization is a pure function of the candidate, the source name and
//! the reference date used for closing-soon marking. Nothing here touches
//! the network or the filesystem.

use chrono::NaiveDate;
use lazy_static::lazy_static;
use regex::Regex;

use crate::config::Config;
use crate::models::{BidRecord, BidStatus, Drawings, RawCandidate, UsState, VARIES};
use crate::parser::{clean_text, parse_date};

lazy_static! {
    // Optional `$`, the number, then a multiplier word or letter that ends at a word boundary.
    static ref VALUE_PATTERN: Regex = Regex::new(
        r"(?i)(\$\s*)?(\d[\d,]*(?:\.\d+)?)\s*(?:(thousand|million|billion|mil|mm|k|m|b)\b)?"
    )
    .expect("Invalid value regex");
}

/// Why a candidate could not become a record. The candidate is dropped.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum NormalizeError {
    #[error("missing required field `{0}`")]
    MissingField(&'static str),

    #[error("unrecognized state `{0}`")]
    InvalidState(String),

    #[error("unrecognized status `{0}`")]
    InvalidStatus(String),
}

/// Lower bound of a human-readable currency range, in dollars.
///
/// Takes the first `$`-prefixed number in the string, or the first bare
/// number when no amount carries a `$`. A following multiplier is applied:
/// `K`/`Thousand`, `M`/`MM`/`Mil`/`Million`, `B`/`Billion` (any case, but
/// not the start of a longer word). The result is rounded to the nearest
/// integer. Strings without a number yield 0.
///
/// ```
/// use bid_scraper::normalize::parse_value_sortable;
///
/// assert_eq!(parse_value_sortable("$2M–$4M"), 2_000_000);
/// assert_eq!(parse_value_sortable("Phase 2 – $500K"), 500_000);
/// assert_eq!(parse_value_sortable("$2.5 Million"), 2_500_000);
/// assert_eq!(parse_value_sortable("Varies"), 0);
/// ```
pub fn parse_value_sortable(value: &str) -> u64 {
    let caps = VALUE_PATTERN
        .captures_iter(value)
        .find(|caps| caps.get(1).is_some())
        .or_else(|| VALUE_PATTERN.captures(value));
    let Some(caps) = caps else {
        return 0;
    };

    let digits = caps[2].replace(',', "");
    let Ok(number) = digits.parse::<f64>() else {
        return 0;
    };

    let suffix = caps.get(3).map(|m| m.as_str().to_ascii_lowercase());
    let multiplier = match suffix.as_deref() {
        Some("k" | "thousand") => 1_000.0,
        Some("m" | "mm" | "mil" | "million") => 1_000_000.0,
        Some("b" | "billion") => 1_000_000_000.0,
        _ => 1.0,
    };

    // `as` saturates, so absurd inputs pin at u64::MAX instead of wrapping
    (number * multiplier).round() as u64
}

/// Normalize with today's local date as the closing-soon reference.
pub fn normalize(raw: &RawCandidate, source_name: &str) -> Result<BidRecord, NormalizeError> {
    Normalizer::default().normalize(raw, source_name)
}

/// Converts [`RawCandidate`]s into [`BidRecord`]s.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Normalizer {
    today: NaiveDate,
    closing_window_days: i64,
}

impl Default for Normalizer {
    fn default() -> Self {
        Self::new(chrono::Local::now().date_naive(), Config::CLOSING_WINDOW_DAYS)
    }
}

impl Normalizer {
    pub fn new(today: NaiveDate, closing_window_days: i64) -> Self {
        Self {
            today,
            closing_window_days,
        }
    }

    pub fn today(&self) -> NaiveDate {
        self.today
    }

    pub fn normalize(
        &self,
        raw: &RawCandidate,
        source_name: &str,
    ) -> Result<BidRecord, NormalizeError> {
        let title = required(&raw.title, "title")?;
        let url = required(&raw.url, "url")?;
        let source = non_blank(&raw.source)
            .or_else(|| Some(clean_text(source_name)).filter(|s| !s.is_empty()))
            .ok_or(NormalizeError::MissingField("source"))?;

        let state_text = required(&raw.state, "state")?;
        let state = state_text
            .parse::<UsState>()
            .map_err(|_| NormalizeError::InvalidState(state_text.clone()))?;

        let status = match non_blank(&raw.status) {
            Some(text) => text
                .parse::<BidStatus>()
                .map_err(|_| NormalizeError::InvalidStatus(text.clone()))?,
            None => BidStatus::Open,
        };

        let deadline_date = raw.deadline.as_deref().and_then(parse_date);
        let deadline = deadline_date
            .map(|d| d.format("%Y-%m-%d").to_string())
            .unwrap_or_else(|| VARIES.to_string());

        let status = self.promote_closing(status, deadline_date);

        let value = non_blank(&raw.value).unwrap_or_else(|| VARIES.to_string());
        let value_sortable = parse_value_sortable(&value);

        let posted = raw
            .posted
            .as_deref()
            .and_then(parse_date)
            .map(|d| d.format("%Y-%m-%d").to_string());

        let drawings = match non_blank(&raw.drawings) {
            Some(text) => text.parse::<Drawings>().unwrap_or_else(|_| {
                tracing::warn!(drawings = %text, title = %title, "Unrecognized drawings value, using tbd");
                Drawings::Tbd
            }),
            None => Drawings::Tbd,
        };

        Ok(BidRecord {
            title,
            sub: non_blank(&raw.sub).unwrap_or_default(),
            location: non_blank(&raw.location).unwrap_or_default(),
            state,
            status,
            deadline,
            value,
            value_sortable,
            posted,
            source,
            url,
            drawings,
            drawings_note: non_blank(&raw.drawings_note).unwrap_or_default(),
        })
    }

    fn promote_closing(&self, status: BidStatus, deadline: Option<NaiveDate>) -> BidStatus {
        match (status, deadline) {
            (BidStatus::Open, Some(date))
                if (date - self.today).num_days() <= self.closing_window_days =>
            {
                BidStatus::Closing
            }
            _ => status,
        }
    }
}

fn non_blank(field: &Option<String>) -> Option<String> {
    field
        .as_deref()
        .map(clean_text)
        .filter(|s| !s.is_empty())
}

fn required(field: &Option<String>, name: &'static str) -> Result<String, NormalizeError> {
    non_blank(field).ok_or(NormalizeError::MissingField(name))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn normalizer() -> Normalizer {
        Normalizer::new(NaiveDate::from_ymd_opt(2026, 4, 1).unwrap(), 14)
    }

    fn bridge_repair() -> RawCandidate {
        RawCandidate {
            title: Some("Bridge Repair".to_string()),
            value: Some("$2M–$4M".to_string()),
            state: Some("MI".to_string()),
            status: Some("open".to_string()),
            deadline: Some("2026-05-01".to_string()),
            source: Some("MDOT".to_string()),
            url: Some("https://mdot.example".to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn test_value_sortable_examples() {
        assert_eq!(parse_value_sortable("$1M–$3M"), 1_000_000);
        assert_eq!(parse_value_sortable("$2M–$4M"), 2_000_000);
        assert_eq!(parse_value_sortable("$500K"), 500_000);
        assert_eq!(parse_value_sortable("$200K–$2M+"), 200_000);
        assert_eq!(parse_value_sortable("$50K–$1M+"), 50_000);
        assert_eq!(parse_value_sortable("$1.5M"), 1_500_000);
        assert_eq!(parse_value_sortable("$75,000"), 75_000);
        assert_eq!(parse_value_sortable("$2 m"), 2_000_000);
        assert_eq!(parse_value_sortable("$1B"), 1_000_000_000);
        assert_eq!(parse_value_sortable("$2.5 Million"), 2_500_000);
        assert_eq!(parse_value_sortable("$10MM"), 10_000_000);
        assert_eq!(parse_value_sortable("$3 mil"), 3_000_000);
        assert_eq!(parse_value_sortable("$750 Thousand"), 750_000);
        assert_eq!(parse_value_sortable("$1.2 billion"), 1_200_000_000);
    }

    #[test]
    fn test_value_prefers_dollar_amount() {
        assert_eq!(parse_value_sortable("Phase 2 – $500K"), 500_000);
        assert_eq!(parse_value_sortable("3 buildings, $1.5M–$2M"), 1_500_000);
        assert_eq!(parse_value_sortable("$ 40,000 per year"), 40_000);
        // No dollar sign anywhere: first bare number
        assert_eq!(parse_value_sortable("250K estimate"), 250_000);
    }

    #[test]
    fn test_value_sortable_without_number() {
        assert_eq!(parse_value_sortable("Varies"), 0);
        assert_eq!(parse_value_sortable("See Bid Docs"), 0);
        assert_eq!(parse_value_sortable(""), 0);
    }

    #[test]
    fn test_value_suffix_must_not_start_a_word() {
        assert_eq!(parse_value_sortable("10 Buildings"), 10);
        assert_eq!(parse_value_sortable("3 months"), 3);
        assert_eq!(parse_value_sortable("$5 Million-ish"), 5_000_000);
        assert_eq!(parse_value_sortable("$7 Milestones"), 7);
    }

    #[test]
    fn test_value_sortable_deterministic() {
        for input in ["$1M–$3M", "$500K", "Varies", "$1.25M"] {
            assert_eq!(parse_value_sortable(input), parse_value_sortable(input));
        }
    }

    #[test]
    fn test_normalize_fills_defaults() {
        let record = normalizer().normalize(&bridge_repair(), "MDOT").unwrap();

        assert_eq!(record.title, "Bridge Repair");
        assert_eq!(record.sub, "");
        assert_eq!(record.location, "");
        assert_eq!(record.state, UsState::MI);
        assert_eq!(record.status, BidStatus::Open);
        assert_eq!(record.deadline, "2026-05-01");
        assert_eq!(record.value_sortable, 2_000_000);
        assert_eq!(record.posted, None);
        assert_eq!(record.drawings, Drawings::Tbd);
        assert_eq!(record.drawings_note, "");
    }

    #[test]
    fn test_normalize_ignores_extractor_sortable_value() {
        // There is no way to pass one in; the value string is the only input.
        let mut raw = bridge_repair();
        raw.value = None;
        let record = normalizer().normalize(&raw, "MDOT").unwrap();
        assert_eq!(record.value, "Varies");
        assert_eq!(record.value_sortable, 0);
    }

    #[test]
    fn test_normalize_rejects_bad_enums() {
        let mut raw = bridge_repair();
        raw.state = Some("IN".to_string());
        assert_eq!(
            normalizer().normalize(&raw, "MDOT"),
            Err(NormalizeError::InvalidState("IN".to_string()))
        );

        let mut raw = bridge_repair();
        raw.status = Some("awarded".to_string());
        assert_eq!(
            normalizer().normalize(&raw, "MDOT"),
            Err(NormalizeError::InvalidStatus("awarded".to_string()))
        );
    }

    #[test]
    fn test_normalize_requires_title_url_state() {
        let mut raw = bridge_repair();
        raw.title = Some("   ".to_string());
        assert_eq!(
            normalizer().normalize(&raw, "MDOT"),
            Err(NormalizeError::MissingField("title"))
        );

        let mut raw = bridge_repair();
        raw.url = None;
        assert_eq!(
            normalizer().normalize(&raw, "MDOT"),
            Err(NormalizeError::MissingField("url"))
        );

        let mut raw = bridge_repair();
        raw.state = None;
        assert_eq!(
            normalizer().normalize(&raw, "MDOT"),
            Err(NormalizeError::MissingField("state"))
        );
    }

    #[test]
    fn test_source_falls_back_to_source_name() {
        let mut raw = bridge_repair();
        raw.source = None;
        let record = normalizer().normalize(&raw, "MDOT Bid Letting").unwrap();
        assert_eq!(record.source, "MDOT Bid Letting");

        assert_eq!(
            normalizer().normalize(&raw, " "),
            Err(NormalizeError::MissingField("source"))
        );
    }

    #[test]
    fn test_deadline_normalized_or_varies() {
        let mut raw = bridge_repair();
        raw.deadline = Some("05/20/2026".to_string());
        assert_eq!(normalizer().normalize(&raw, "MDOT").unwrap().deadline, "2026-05-20");

        for text in ["TBD", "See Document", "See Schedule", ""] {
            raw.deadline = Some(text.to_string());
            assert_eq!(normalizer().normalize(&raw, "MDOT").unwrap().deadline, "Varies");
        }

        raw.deadline = None;
        assert_eq!(normalizer().normalize(&raw, "MDOT").unwrap().deadline, "Varies");
    }

    #[test]
    fn test_closing_soon_promotion() {
        let mut raw = bridge_repair();

        raw.deadline = Some("2026-04-15".to_string());
        assert_eq!(normalizer().normalize(&raw, "MDOT").unwrap().status, BidStatus::Closing);

        raw.deadline = Some("2026-04-16".to_string());
        assert_eq!(normalizer().normalize(&raw, "MDOT").unwrap().status, BidStatus::Open);

        raw.deadline = Some("2026-04-10".to_string());
        raw.status = Some("standing".to_string());
        assert_eq!(normalizer().normalize(&raw, "MDOT").unwrap().status, BidStatus::Standing);
    }

    #[test]
    fn test_missing_status_defaults_to_open() {
        let mut raw = bridge_repair();
        raw.status = None;
        assert_eq!(normalizer().normalize(&raw, "MDOT").unwrap().status, BidStatus::Open);
    }

    #[test]
    fn test_text_cleanup_and_drawings() {
        let mut raw = bridge_repair();
        raw.title = Some("  Bridge \n  Repair ".to_string());
        raw.drawings = Some("REG".to_string());
        raw.drawings_note = Some("BidNet login".to_string());
        raw.posted = Some("04/01/2026".to_string());

        let record = normalizer().normalize(&raw, "MDOT").unwrap();
        assert_eq!(record.title, "Bridge Repair");
        assert_eq!(record.drawings, Drawings::Reg);
        assert_eq!(record.drawings_note, "BidNet login");
        assert_eq!(record.posted.as_deref(), Some("2026-04-01"));

        raw.drawings = Some("maybe".to_string());
        assert_eq!(normalizer().normalize(&raw, "MDOT").unwrap().drawings, Drawings::Tbd);
    }
}
