//! Publication date normalization.
//!
//! The feed writes the `updated` property in two shapes depending on the
//! record: `2023-01-01T10:00:00.000Z` and `2023-01-01T11:00:00+11:00`. One
//! pattern cannot parse both, so the trailing `Z` selects the branch.

use chrono::{DateTime, NaiveDateTime, Utc};

const NAIVE_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";
const OFFSET_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%z";

/// Parse a publication date into UTC.
///
/// Returns `None` for empty input or anything that does not parse. The
/// branch chosen by the trailing `Z` is final; a failure there never retries
/// with the other format.
pub fn parse_publication_date(raw: &str) -> Option<DateTime<Utc>> {
    if raw.is_empty() {
        return None;
    }

    match raw.strip_suffix('Z') {
        Some(rest) => parse_zulu(rest),
        None => DateTime::parse_from_str(raw, OFFSET_FORMAT)
            .ok()
            .map(|dt| dt.with_timezone(&Utc)),
    }
}

fn parse_zulu(rest: &str) -> Option<DateTime<Utc>> {
    let whole_seconds = strip_fraction(rest);
    NaiveDateTime::parse_from_str(whole_seconds, NAIVE_FORMAT)
        .ok()
        .map(|naive| naive.and_utc())
}

/// Drop a trailing `.digits` token.
fn strip_fraction(s: &str) -> &str {
    match s.rsplit_once('.') {
        Some((head, digits))
            if !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit()) =>
        {
            head
        }
        _ => s,
    }
}
