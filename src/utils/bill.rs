// src/utils/bill.rs

//! Bill-number helpers for congressional feeds.

use regex::Regex;

/// Canonical display forms keyed by the compact bill type.
const BILL_TYPES: [(&str, &str); 8] = [
    ("HCONRES", "H.Con.Res."),
    ("SCONRES", "S.Con.Res."),
    ("HJRES", "H.J.Res."),
    ("SJRES", "S.J.Res."),
    ("HRES", "H.Res."),
    ("SRES", "S.Res."),
    ("HR", "H.R."),
    ("S", "S."),
];

/// Find a bill number in a feed title and render it canonically.
///
/// Accepts the usual spellings (`H.R. 1234`, `HR1234`, `S. 56`,
/// `H.J.Res. 7`, ...) and returns e.g. `H.R. 1234`.
pub fn extract_bill_number(title: &str) -> Option<String> {
    let pattern = Regex::new(
        r"(?i)\b(H\.?\s*Con\.?\s*Res|S\.?\s*Con\.?\s*Res|H\.?\s*J\.?\s*Res|S\.?\s*J\.?\s*Res|H\.?\s*Res|S\.?\s*Res|H\.?\s*R|S)\.?\s*(\d+)\b",
    )
    .ok()?;

    let caps = pattern.captures(title)?;
    let raw_type = caps.get(1)?.as_str();
    let number = caps.get(2)?.as_str();

    let compact: String = raw_type
        .chars()
        .filter(|c| c.is_ascii_alphabetic())
        .collect::<String>()
        .to_ascii_uppercase();

    BILL_TYPES
        .iter()
        .find(|(key, _)| *key == compact)
        .map(|(_, display)| format!("{} {}", display, number))
}

/// Sponsor phrasings seen in feed descriptions, tried in order.
const DESCRIPTION_SPONSOR_PATTERNS: [&str; 3] = [
    r"(?i)\bintroduced by\s+((?:(?:rep|sen|del)\.\s+)?[^.\n]+)",
    r"(?i)\bsponsor[:\s]+((?:(?:rep|sen|del)\.\s+)?[^.\n]+)",
    r"(?i)\bby\s+((?:rep|sen)\.\s+[^.\n]+)",
];

/// Titles only name a sponsor as "... by Rep. Name - ...".
const TITLE_SPONSOR_PATTERN: &str = r"(?i)\bby\s+((?:rep|sen)\.\s+[^-\n]+)";

/// Find the sponsoring member in a feed description, falling back to the
/// title. Returns e.g. `Sen. Jane Smith`.
pub fn extract_sponsor(description: &str, title: &str) -> Option<String> {
    DESCRIPTION_SPONSOR_PATTERNS
        .iter()
        .find_map(|pattern| first_capture(pattern, description))
        .or_else(|| first_capture(TITLE_SPONSOR_PATTERN, title))
}

fn first_capture(pattern: &str, haystack: &str) -> Option<String> {
    let caps = Regex::new(pattern).ok()?.captures(haystack)?;
    let text = caps.get(1)?.as_str().trim();
    (!text.is_empty()).then(|| text.to_string())
}

/// Number of the Congress sitting in `year`. Each Congress spans two years
/// starting with the 1st in 1789.
pub fn congress_for_year(year: i32) -> Option<u32> {
    if year < 1789 {
        return None;
    }
    u32::try_from((year - 1789) / 2 + 1).ok()
}

/// English ordinal: 1st, 2nd, 3rd, 11th, 119th.
pub fn ordinal(n: u32) -> String {
    let suffix = match (n % 10, n % 100) {
        (_, 11..=13) => "th",
        (1, _) => "st",
        (2, _) => "nd",
        (3, _) => "rd",
        _ => "th",
    };
    format!("{}{}", n, suffix)
}
