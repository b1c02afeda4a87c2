use super::models::{CalendarEvent, NewEvent, TimeRange};
use super::time::to_provider_string;
use super::CalendarProvider;
use crate::error::AppResult;
use async_trait::async_trait;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::RwLock;
use tracing::debug;

/// In-memory calendar (for local development and testing)
#[derive(Debug, Default)]
pub struct InMemoryCalendar {
    events: RwLock<Vec<CalendarEvent>>,
    next_id: AtomicU64,
}

impl InMemoryCalendar {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a calendar pre-populated with events
    pub fn with_events(events: Vec<CalendarEvent>) -> Self {
        Self {
            events: RwLock::new(events),
            next_id: AtomicU64::new(0),
        }
    }

    /// Snapshot of every stored event
    pub async fn all_events(&self) -> Vec<CalendarEvent> {
        self.events.read().await.clone()
    }
}

#[async_trait]
impl CalendarProvider for InMemoryCalendar {
    fn name(&self) -> &'static str {
        "memory"
    }

    async fn list_events(&self, range: &TimeRange) -> AppResult<Vec<CalendarEvent>> {
        let events = self.events.read().await;

        let mut matching: Vec<_> = events
            .iter()
            .filter_map(|event| {
                let (start, end) = event.interval(range.timezone())?;
                range.overlaps(start, end).then(|| (start, event.clone()))
            })
            .collect();
        matching.sort_by_key(|(start, _)| *start);

        debug!("In-memory calendar matched {} events", matching.len());
        Ok(matching.into_iter().map(|(_, event)| event).collect())
    }

    async fn insert_event(&self, event: &NewEvent) -> AppResult<CalendarEvent> {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst) + 1;
        let created = CalendarEvent {
            id: format!("mem-{}", id),
            title: Some(event.title.clone()),
            description: Some(event.description.clone()),
            start: Some(to_provider_string(event.range.start())),
            end: Some(to_provider_string(event.range.end())),
            timezone: Some(event.range.timezone().name().to_string()),
            all_day: false,
        };

        self.events.write().await.push(created.clone());
        Ok(created)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn range(start: &str, end: &str) -> TimeRange {
        TimeRange::parse(start, end, "Asia/Kolkata").unwrap()
    }

    #[tokio::test]
    async fn lists_only_overlapping_events_in_start_order() {
        let calendar = InMemoryCalendar::with_events(vec![
            CalendarEvent {
                id: "late".to_string(),
                start: Some("2025-07-02T14:30:00+05:30".to_string()),
                end: Some("2025-07-02T16:00:00+05:30".to_string()),
                ..Default::default()
            },
            CalendarEvent {
                id: "early".to_string(),
                start: Some("2025-07-02T13:30:00+05:30".to_string()),
                end: Some("2025-07-02T14:15:00+05:30".to_string()),
                ..Default::default()
            },
            CalendarEvent {
                id: "elsewhere".to_string(),
                start: Some("2025-07-03T14:00:00+05:30".to_string()),
                end: Some("2025-07-03T15:00:00+05:30".to_string()),
                ..Default::default()
            },
        ]);

        let events = calendar
            .list_events(&range("2025-07-02T14:00:00", "2025-07-02T15:00:00"))
            .await
            .unwrap();

        let ids: Vec<_> = events.iter().map(|e| e.id.as_str()).collect();
        assert_eq!(ids, vec!["early", "late"]);
    }

    #[tokio::test]
    async fn inserted_events_get_unique_ids() {
        let calendar = InMemoryCalendar::new();
        let new_event = NewEvent {
            title: "Sync".to_string(),
            description: "Weekly".to_string(),
            range: range("2025-07-02T14:00:00", "2025-07-02T15:00:00"),
        };

        let first = calendar.insert_event(&new_event).await.unwrap();
        let second = calendar.insert_event(&new_event).await.unwrap();

        assert_ne!(first.id, second.id);
        assert_eq!(first.start.as_deref(), Some("2025-07-02T14:00:00+05:30"));
        assert_eq!(first.timezone.as_deref(), Some("Asia/Kolkata"));
        assert_eq!(calendar.all_events().await.len(), 2);
    }
}
