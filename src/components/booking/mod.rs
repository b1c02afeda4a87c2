use crate::components::calendar::{CalendarEvent, CalendarProvider, NewEvent, TimeRange};
use crate::error::AppResult;
use serde::Serialize;
use std::sync::Arc;
use tracing::{info, warn};

/// Result of an availability check
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Availability {
    pub available: bool,
    pub conflicts: Vec<CalendarEvent>,
}

/// Outcome of a check-then-book attempt
#[derive(Debug, Clone, PartialEq)]
pub enum BookingResult {
    Success(CalendarEvent),
    Conflict(Vec<CalendarEvent>),
    Failure(String),
}

/// Availability checks and bookings against a calendar provider.
///
/// Nothing here serializes concurrent callers: two requests for overlapping
/// ranges can both see a free slot and both insert.
#[derive(Clone)]
pub struct BookingService {
    provider: Arc<dyn CalendarProvider>,
}

impl BookingService {
    pub fn new(provider: Arc<dyn CalendarProvider>) -> Self {
        Self { provider }
    }

    /// Name of the backing provider
    pub fn provider_name(&self) -> &'static str {
        self.provider.name()
    }

    /// A range is available iff the provider reports no event intersecting it
    pub async fn check_availability(&self, range: &TimeRange) -> AppResult<Availability> {
        let conflicts = self.provider.list_events(range).await?;

        Ok(Availability {
            available: conflicts.is_empty(),
            conflicts,
        })
    }

    /// Insert an event without checking for conflicts first
    pub async fn book_appointment(&self, event: &NewEvent) -> AppResult<CalendarEvent> {
        let created = self.provider.insert_event(event).await?;
        info!(
            "Booked '{}' ({}) via {}",
            event.title,
            created.id,
            self.provider.name()
        );
        Ok(created)
    }

    /// Insert an event only if its range is currently free
    pub async fn book_if_available(&self, event: &NewEvent) -> BookingResult {
        let availability = match self.check_availability(&event.range).await {
            Ok(availability) => availability,
            Err(e) => {
                warn!("Availability check failed: {}", e);
                return BookingResult::Failure(e.to_string());
            }
        };

        if !availability.available {
            return BookingResult::Conflict(availability.conflicts);
        }

        match self.book_appointment(event).await {
            Ok(created) => BookingResult::Success(created),
            Err(e) => {
                warn!("Booking failed: {}", e);
                BookingResult::Failure(e.to_string())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::calendar::InMemoryCalendar;
    use crate::error::provider_error;
    use async_trait::async_trait;

    struct UnreachableCalendar;

    #[async_trait]
    impl CalendarProvider for UnreachableCalendar {
        fn name(&self) -> &'static str {
            "unreachable"
        }

        async fn list_events(&self, _range: &TimeRange) -> AppResult<Vec<CalendarEvent>> {
            Err(provider_error("connection refused"))
        }

        async fn insert_event(&self, _event: &NewEvent) -> AppResult<CalendarEvent> {
            Err(provider_error("connection refused"))
        }
    }

    fn meeting(start: &str, end: &str) -> NewEvent {
        NewEvent {
            title: "Meeting".to_string(),
            description: "Scheduled via chat".to_string(),
            range: TimeRange::parse(start, end, "Asia/Kolkata").unwrap(),
        }
    }

    #[tokio::test]
    async fn empty_calendar_is_available() {
        let service = BookingService::new(Arc::new(InMemoryCalendar::new()));
        let event = meeting("2025-07-02T14:00:00", "2025-07-02T15:00:00");

        let availability = service.check_availability(&event.range).await.unwrap();
        assert!(availability.available);
        assert!(availability.conflicts.is_empty());
    }

    #[tokio::test]
    async fn booked_range_reports_a_conflict() {
        let service = BookingService::new(Arc::new(InMemoryCalendar::new()));
        let event = meeting("2025-07-02T14:00:00", "2025-07-02T15:00:00");

        let created = service.book_appointment(&event).await.unwrap();
        let availability = service.check_availability(&event.range).await.unwrap();

        assert!(!availability.available);
        assert_eq!(availability.conflicts, vec![created]);
    }

    #[tokio::test]
    async fn book_appointment_does_not_recheck() {
        let service = BookingService::new(Arc::new(InMemoryCalendar::new()));
        let event = meeting("2025-07-02T14:00:00", "2025-07-02T15:00:00");

        service.book_appointment(&event).await.unwrap();
        // Double booking is allowed on this path
        assert!(service.book_appointment(&event).await.is_ok());
    }

    #[tokio::test]
    async fn book_if_available_reports_each_outcome() {
        let service = BookingService::new(Arc::new(InMemoryCalendar::new()));
        let event = meeting("2025-07-02T14:00:00", "2025-07-02T15:00:00");

        let first = service.book_if_available(&event).await;
        let created = match first {
            BookingResult::Success(created) => created,
            other => panic!("expected success, got {:?}", other),
        };

        let overlapping = meeting("2025-07-02T14:30:00", "2025-07-02T15:30:00");
        assert_eq!(
            service.book_if_available(&overlapping).await,
            BookingResult::Conflict(vec![created])
        );
    }

    #[tokio::test]
    async fn provider_failure_is_not_reported_as_free() {
        let service = BookingService::new(Arc::new(UnreachableCalendar));
        let event = meeting("2025-07-02T14:00:00", "2025-07-02T15:00:00");

        assert!(matches!(
            service.check_availability(&event.range).await,
            Err(crate::error::Error::Provider(_))
        ));
        assert!(matches!(
            service.book_if_available(&event).await,
            BookingResult::Failure(_)
        ));
    }
}
