use super::{BookingIntent, IntentParser};
use chrono::{Duration, FixedOffset, NaiveDate, Offset, TimeZone, Utc};
use lazy_static::lazy_static;
use regex::Regex;

/// UTC+05:30, the offset chat bookings are always expressed in
pub const CHAT_OFFSET_SECS: i32 = 5 * 3600 + 30 * 60;

lazy_static! {
    static ref HOUR_PATTERN: Regex =
        Regex::new(r"at ([0-9]{1,2})\s*pm").expect("hour pattern is a valid regex");
}

/// Clamp a parsed hour: above 12 becomes 12, 0 becomes 12
pub fn normalize_hour(hour: u32) -> u32 {
    match hour {
        0 => 12,
        h if h > 12 => 12,
        h => h,
    }
}

/// Matches "at <N> pm" and books a one-hour slot today
#[derive(Debug, Clone)]
pub struct RegexIntentParser {
    offset: FixedOffset,
    fixed_date: Option<NaiveDate>,
}

impl Default for RegexIntentParser {
    fn default() -> Self {
        Self::new()
    }
}

impl RegexIntentParser {
    pub fn new() -> Self {
        Self {
            offset: FixedOffset::east_opt(CHAT_OFFSET_SECS).unwrap_or_else(|| Utc.fix()),
            fixed_date: None,
        }
    }

    /// Use `date` instead of today's date
    pub fn with_fixed_date(mut self, date: NaiveDate) -> Self {
        self.fixed_date = Some(date);
        self
    }

    fn today(&self) -> NaiveDate {
        self.fixed_date
            .unwrap_or_else(|| Utc::now().with_timezone(&self.offset).date_naive())
    }

    fn slot_on(&self, date: NaiveDate, hour: u32) -> Option<BookingIntent> {
        let naive = date.and_hms_opt(hour, 0, 0)?;
        let start = self.offset.from_local_datetime(&naive).single()?;

        Some(BookingIntent {
            hour,
            start,
            end: start + Duration::hours(1),
        })
    }
}

impl IntentParser for RegexIntentParser {
    fn is_booking_request(&self, text: &str) -> bool {
        let text = text.to_lowercase();
        text.contains("book") && text.contains("meeting")
    }

    fn extract_intent(&self, text: &str) -> Option<BookingIntent> {
        if !self.is_booking_request(text) {
            return None;
        }

        let text = text.to_lowercase();
        let captures = HOUR_PATTERN.captures(&text)?;
        let hour = normalize_hour(captures.get(1)?.as_str().parse().ok()?);

        self.slot_on(self.today(), hour)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Timelike;

    fn parser() -> RegexIntentParser {
        RegexIntentParser::new().with_fixed_date(NaiveDate::from_ymd_opt(2025, 7, 2).unwrap())
    }

    #[test]
    fn hours_are_normalized() {
        assert_eq!(normalize_hour(13), 12);
        assert_eq!(normalize_hour(0), 12);
        assert_eq!(normalize_hour(6), 6);
        assert_eq!(normalize_hour(12), 12);
        assert_eq!(normalize_hour(99), 12);
    }

    #[test]
    fn six_pm_stays_hour_six() {
        let intent = parser()
            .extract_intent("please book a meeting at 6 pm")
            .unwrap();

        assert_eq!(intent.hour, 6);
        assert_eq!(intent.start.hour(), 6);
        assert_eq!(intent.end.hour(), 7);
        assert_eq!(intent.start.to_rfc3339(), "2025-07-02T06:00:00+05:30");
        assert_eq!(intent.end.to_rfc3339(), "2025-07-02T07:00:00+05:30");
    }

    #[test]
    fn matching_is_case_insensitive_and_spacing_tolerant() {
        let intent = parser().extract_intent("Book a Meeting AT 5PM").unwrap();
        assert_eq!(intent.hour, 5);
    }

    #[test]
    fn out_of_range_hours_are_clamped() {
        assert_eq!(parser().extract_intent("book a meeting at 13 pm").unwrap().hour, 12);

        let midnight = parser().extract_intent("book a meeting at 0 pm").unwrap();
        assert_eq!(midnight.hour, 12);
        assert_eq!(midnight.end.hour(), 13);
    }

    #[test]
    fn no_time_or_no_booking_yields_nothing() {
        let parser = parser();

        assert!(parser.is_booking_request("book a meeting"));
        assert_eq!(parser.extract_intent("book a meeting"), None);
        assert_eq!(parser.extract_intent("book a meeting at 6 am"), None);

        assert!(!parser.is_booking_request("what is on at 6 pm"));
        assert_eq!(parser.extract_intent("what is on at 6 pm"), None);
    }

    #[test]
    fn only_ascii_digits_name_an_hour() {
        let parser = parser();

        assert!(!HOUR_PATTERN.is_match("at \u{0666} pm"));
        assert_eq!(parser.extract_intent("book a meeting at \u{0666} pm"), None);
        assert_eq!(parser.extract_intent("book a meeting at 6 pm").map(|i| i.hour), Some(6));
    }

    #[test]
    fn offset_is_fixed_at_five_thirty() {
        let intent = RegexIntentParser::new()
            .extract_intent("book a meeting at 3 pm")
            .unwrap();
        assert_eq!(intent.start.offset().local_minus_utc(), CHAT_OFFSET_SECS);
    }
}
