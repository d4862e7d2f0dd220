use chrono::{Datelike, NaiveDate};
use lazy_static::lazy_static;
use scraper::{ElementRef, Html, Selector};

lazy_static! {
    static ref TABLE: Selector = Selector::parse("table").expect("Invalid CSS selector");
    static ref ROW: Selector = Selector::parse("tr").expect("Invalid CSS selector");
    static ref CELL: Selector = Selector::parse("td, th").expect("Invalid CSS selector");
    static ref LINK: Selector = Selector::parse("a[href]").expect("Invalid CSS selector");
}

/// Formats portals use for dates, tried in order.
const DATE_FORMATS: &[&str] = &[
    "%m/%d/%Y",
    "%m-%d-%Y",
    "%B %d, %Y",
    "%b %d, %Y",
    "%Y-%m-%d",
    "%m/%d/%y",
];

const DATETIME_FORMATS: &[&str] = &["%m/%d/%Y %I:%M%p", "%m/%d/%Y %I:%M %p"];

/// A table cell's visible text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cell {
    pub text: String,
    pub is_header: bool,
}

/// One `<tr>` with its cells in document order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Row {
    pub cells: Vec<Cell>,
}

impl Row {
    /// Cells that are `<td>`, skipping `<th>`.
    pub fn data_cells(&self) -> Vec<&str> {
        self.cells
            .iter()
            .filter(|c| !c.is_header)
            .map(|c| c.text.as_str())
            .collect()
    }

    /// All cell texts joined by a single space.
    pub fn text(&self) -> String {
        self.cells
            .iter()
            .map(|c| c.text.as_str())
            .filter(|t| !t.is_empty())
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Anchor with an href and its visible text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Link {
    pub href: String,
    pub text: String,
}

/// Collapse whitespace runs into single spaces and trim.
pub fn clean_text(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn element_text(element: &ElementRef<'_>) -> String {
    clean_text(&element.text().collect::<String>())
}

/// Extract every table in the document as rows of cleaned cell text.
///
/// Nested tables show up both inside their parent's cell text and as
/// their own entry.
pub fn extract_tables(html_body: &str) -> Vec<Vec<Row>> {
    let document = Html::parse_document(html_body);

    document
        .select(&TABLE)
        .map(|table| {
            table
                .select(&ROW)
                .map(|row| Row {
                    cells: row
                        .select(&CELL)
                        .map(|cell| Cell {
                            text: element_text(&cell),
                            is_header: cell.value().name() == "th",
                        })
                        .collect(),
                })
                .collect()
        })
        .collect()
}

/// Extract hyperlinks with their visible text.
///
/// Skips empty, javascript, mailto, tel and data links.
pub fn extract_links(html_body: &str) -> Vec<Link> {
    let document = Html::parse_document(html_body);

    document
        .select(&LINK)
        .filter_map(|element| {
            let href = element.value().attr("href")?.trim();
            if href.is_empty()
                || href.starts_with("javascript:")
                || href.starts_with("mailto:")
                || href.starts_with("tel:")
                || href.starts_with("data:")
            {
                return None;
            }
            Some(Link {
                href: href.to_string(),
                text: element_text(&element),
            })
        })
        .collect()
}

/// Parse the date formats portals commonly publish.
pub fn parse_date(text: &str) -> Option<NaiveDate> {
    let text = text.trim();
    if text.is_empty() {
        return None;
    }

    // %Y happily reads "26" as year 26, so insist on a plausible year and
    // let the two-digit format pick it up instead.
    DATE_FORMATS
        .iter()
        .filter_map(|fmt| NaiveDate::parse_from_str(text, fmt).ok())
        .find(|date| date.year() >= 1900)
        .or_else(|| {
            DATETIME_FORMATS.iter().find_map(|fmt| {
                chrono::NaiveDateTime::parse_from_str(text, fmt)
                    .ok()
                    .map(|dt| dt.date())
            })
        })
}

/// Truncate to at most `max` characters without splitting a code point.
pub fn truncate_chars(s: &str, max: usize) -> String {
    match s.char_indices().nth(max) {
        Some((idx, _)) => s[..idx].trim_end().to_string(),
        None => s.to_string(),
    }
}
