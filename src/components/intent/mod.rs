mod regex_parser;

pub use regex_parser::RegexIntentParser;

use chrono::{DateTime, FixedOffset};

/// A one-hour meeting slot pulled out of free text
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookingIntent {
    /// Normalized hour as it appeared in the text
    pub hour: u32,
    pub start: DateTime<FixedOffset>,
    pub end: DateTime<FixedOffset>,
}

/// Turns a chat message into a booking intent
pub trait IntentParser: Send + Sync {
    /// Whether the message asks for a booking at all
    fn is_booking_request(&self, text: &str) -> bool;

    /// The requested slot, if the message names one
    fn extract_intent(&self, text: &str) -> Option<BookingIntent>;
}
