// Export components
pub mod booking;
pub mod calendar;
pub mod conversation;
pub mod google_calendar;
pub mod intent;

pub use booking::BookingService;
pub use calendar::{CalendarProvider, InMemoryCalendar};
pub use conversation::Conversation;
pub use google_calendar::GoogleCalendarClient;
pub use intent::{IntentParser, RegexIntentParser};

use crate::config::{CalendarBackend, Config};
use crate::error::AppResult;
use std::sync::Arc;
use tracing::info;

/// Build the calendar provider selected by the configuration
pub fn build_provider(config: &Config) -> AppResult<Arc<dyn CalendarProvider>> {
    let provider: Arc<dyn CalendarProvider> = match config.backend {
        CalendarBackend::Google => Arc::new(GoogleCalendarClient::new(config)?),
        CalendarBackend::Memory => Arc::new(InMemoryCalendar::new()),
    };

    info!("Using calendar provider: {}", provider.name());
    Ok(provider)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn backend_selects_the_provider() {
        let memory = Config {
            backend: CalendarBackend::Memory,
            ..Config::default()
        };
        assert_eq!(build_provider(&memory).unwrap().name(), "memory");

        let google = Config::default();
        assert_eq!(build_provider(&google).unwrap().name(), "google_calendar");
    }
}
