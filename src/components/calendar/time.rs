use crate::error::{validation_error, AppResult};
use chrono::{DateTime, FixedOffset, LocalResult, NaiveDate, NaiveDateTime, TimeZone};
use chrono_tz::Tz;

/// Offset-carrying layouts RFC 3339 parsing does not cover
const OFFSET_FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M%:z", "%Y-%m-%d %H:%M%:z"];

/// Wall-clock layouts, `%.f` also matches a missing fraction
const NAIVE_FORMATS: [&str; 4] = [
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
];

/// Parse an IANA timezone name
pub fn parse_timezone(name: &str) -> AppResult<Tz> {
    name.trim()
        .parse::<Tz>()
        .map_err(|_| validation_error(&format!("Unknown timezone: {}", name)))
}

/// Rewrite a trailing `Z` designator as an explicit `+00:00` offset
pub fn normalize_utc_suffix(input: &str) -> String {
    match input.strip_suffix('Z').or_else(|| input.strip_suffix('z')) {
        Some(rest) => format!("{}+00:00", rest),
        None => input.to_string(),
    }
}

/// Parse an ISO-8601 time string and express it in `tz`.
///
/// Strings with an offset keep their instant. Wall-clock strings are read as
/// local time in `tz`; a time inside a DST fold resolves to the earlier
/// instant and a time inside a DST gap is rejected.
pub fn localize(input: &str, tz: Tz) -> AppResult<DateTime<Tz>> {
    let normalized = normalize_utc_suffix(input.trim());

    if let Some(dt) = parse_with_offset(&normalized) {
        return Ok(dt.with_timezone(&tz));
    }

    let naive = parse_naive(&normalized)
        .ok_or_else(|| validation_error(&format!("Invalid ISO time string: {}", input)))?;

    match tz.from_local_datetime(&naive) {
        LocalResult::Single(dt) => Ok(dt),
        LocalResult::Ambiguous(earliest, _) => Ok(earliest),
        LocalResult::None => Err(validation_error(&format!(
            "Time {} does not exist in timezone {}",
            input, tz
        ))),
    }
}

/// Format a localized time the way the provider expects it
pub fn to_provider_string(dt: &DateTime<Tz>) -> String {
    dt.to_rfc3339()
}

fn parse_with_offset(input: &str) -> Option<DateTime<FixedOffset>> {
    DateTime::parse_from_rfc3339(input).ok().or_else(|| {
        OFFSET_FORMATS
            .iter()
            .find_map(|format| DateTime::parse_from_str(input, format).ok())
    })
}

fn parse_naive(input: &str) -> Option<NaiveDateTime> {
    NAIVE_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(input, format).ok())
        .or_else(|| {
            NaiveDate::parse_from_str(input, "%Y-%m-%d")
                .ok()
                .and_then(|date| date.and_hms_opt(0, 0, 0))
        })
}
