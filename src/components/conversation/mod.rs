use crate::components::booking::{BookingResult, BookingService};
use crate::components::calendar::{CalendarEvent, NewEvent, TimeRange};
use crate::components::intent::{BookingIntent, IntentParser};
use crate::error::AppResult;
use chrono_tz::Tz;
use serde::Serialize;
use std::sync::Arc;
use tracing::debug;

/// Zone chat bookings are filed under
pub const CHAT_TIMEZONE: Tz = chrono_tz::Asia::Kolkata;

pub const NO_BOOKING_PROMPT: &str = "Please specify a booking request, e.g., 'book a meeting'.";
pub const NO_TIME_PROMPT: &str = "Please specify a time, e.g., 'book a meeting at 6 PM'.";

const CHAT_EVENT_TITLE: &str = "Meeting";
const CHAT_EVENT_DESCRIPTION: &str = "Scheduled via chat";

/// Reply to a chat message
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChatReply {
    pub response: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub event: Option<CalendarEvent>,
}

impl ChatReply {
    fn text(response: impl Into<String>) -> Self {
        Self {
            response: response.into(),
            event: None,
        }
    }
}

/// Single-turn chat front end for booking meetings
#[derive(Clone)]
pub struct Conversation {
    booking: BookingService,
    parser: Arc<dyn IntentParser>,
}

impl Conversation {
    pub fn new(booking: BookingService, parser: Arc<dyn IntentParser>) -> Self {
        Self { booking, parser }
    }

    /// Answer one message, booking a meeting when it asks for a free slot
    pub async fn respond(&self, message: &str) -> AppResult<ChatReply> {
        if !self.parser.is_booking_request(message) {
            return Ok(ChatReply::text(NO_BOOKING_PROMPT));
        }

        let Some(intent) = self.parser.extract_intent(message) else {
            return Ok(ChatReply::text(NO_TIME_PROMPT));
        };
        debug!("Chat asked for a meeting at {}", intent.start);

        let event = NewEvent {
            title: CHAT_EVENT_TITLE.to_string(),
            description: CHAT_EVENT_DESCRIPTION.to_string(),
            range: TimeRange::new(
                intent.start.with_timezone(&CHAT_TIMEZONE),
                intent.end.with_timezone(&CHAT_TIMEZONE),
            )?,
        };

        let reply = match self.booking.book_if_available(&event).await {
            BookingResult::Success(created) => ChatReply {
                response: booked_message(&intent),
                event: Some(created),
            },
            BookingResult::Conflict(_) => ChatReply::text(format!(
                "That slot at {}:00 PM is taken. Please try another time.",
                intent.hour
            )),
            BookingResult::Failure(reason) => ChatReply::text(format!(
                "Could not book the meeting at {}:00 PM: {}",
                intent.hour, reason
            )),
        };

        Ok(reply)
    }
}

fn booked_message(intent: &BookingIntent) -> String {
    format!(
        "Meeting booked for {}, {}:00 PM to {}:00 PM IST!",
        intent.start.format("%B %-d"),
        intent.hour,
        intent.hour + 1
    )
}
