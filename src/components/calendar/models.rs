use super::time::{localize, parse_timezone, to_provider_string};
use crate::error::{validation_error, AppResult};
use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

/// A half-open interval `[start, end)` localized into one timezone
#[derive(Debug, Clone, PartialEq)]
pub struct TimeRange {
    start: DateTime<Tz>,
    end: DateTime<Tz>,
    timezone: Tz,
}

impl TimeRange {
    /// Build a range, expressing `end` in the timezone of `start`
    pub fn new(start: DateTime<Tz>, end: DateTime<Tz>) -> AppResult<Self> {
        let timezone = start.timezone();
        let end = end.with_timezone(&timezone);

        if start >= end {
            return Err(validation_error(&format!(
                "Start time {} must be before end time {}",
                to_provider_string(&start),
                to_provider_string(&end)
            )));
        }

        Ok(Self { start, end, timezone })
    }

    /// Parse ISO-8601 strings and localize them into the named timezone
    pub fn parse(start: &str, end: &str, timezone: &str) -> AppResult<Self> {
        let tz = parse_timezone(timezone)?;
        Self::new(localize(start, tz)?, localize(end, tz)?)
    }

    pub fn start(&self) -> &DateTime<Tz> {
        &self.start
    }

    pub fn end(&self) -> &DateTime<Tz> {
        &self.end
    }

    pub fn timezone(&self) -> Tz {
        self.timezone
    }

    /// Whether `[start, end)` shares any instant with this range
    pub fn overlaps(&self, start: DateTime<Utc>, end: DateTime<Utc>) -> bool {
        start < self.end.with_timezone(&Utc) && end > self.start.with_timezone(&Utc)
    }
}

/// An event to be created on the calendar
#[derive(Debug, Clone, PartialEq)]
pub struct NewEvent {
    pub title: String,
    pub description: String,
    pub range: TimeRange,
}

/// Simplified calendar event representation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct CalendarEvent {
    pub id: String,
    pub title: Option<String>,
    pub description: Option<String>,
    /// RFC 3339 date-time, or `YYYY-MM-DD` for all-day events
    pub start: Option<String>,
    pub end: Option<String>,
    pub timezone: Option<String>,
    #[serde(default)]
    pub all_day: bool,
}

impl CalendarEvent {
    /// Start and end as instants. Dates of all-day events are read as
    /// midnight in `zone` unless the event names its own timezone.
    pub fn interval(&self, zone: Tz) -> Option<(DateTime<Utc>, DateTime<Utc>)> {
        let zone = self
            .timezone
            .as_deref()
            .and_then(|name| name.parse::<Tz>().ok())
            .unwrap_or(zone);

        let start = localize(self.start.as_deref()?, zone).ok()?;
        let end = localize(self.end.as_deref()?, zone).ok()?;

        Some((start.with_timezone(&Utc), end.with_timezone(&Utc)))
    }
}
