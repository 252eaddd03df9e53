use chrono::NaiveDate;

use crate::error::{SeriesError, SeriesResult};

/// Parse a `month/day/year` header token.
///
/// Month and day are zero-padded first. A four-digit year is tried with `%Y`,
/// anything else falls back to the two-digit `%y` pattern.
pub fn parse_date(token: &str) -> SeriesResult<NaiveDate> {
    let malformed = || SeriesError::MalformedDate(token.to_string());
    let parts: Vec<&str> = token.trim().split('/').collect();
    if parts.len() != 3 || parts.iter().any(|p| p.is_empty() || !p.bytes().all(|b| b.is_ascii_digit())) {
        return Err(malformed());
    }
    let padded = format!("{:0>2}/{:0>2}/{}", parts[0], parts[1], parts[2]);
    let four_digit = NaiveDate::parse_from_str(&padded, "%m/%d/%Y")
        .ok()
        .filter(|_| parts[2].len() == 4);
    match four_digit {
        Some(date) => Ok(date),
        None if parts[2].len() == 2 => {
            NaiveDate::parse_from_str(&padded, "%m/%d/%y").map_err(|_| malformed())
        }
        None => Err(malformed()),
    }
}

pub fn parse_dates(tokens: &[String]) -> SeriesResult<Vec<NaiveDate>> {
    tokens.iter().map(|t| parse_date(t)).collect()
}
