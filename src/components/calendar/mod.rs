pub mod memory;
pub mod models;
pub mod time;

pub use memory::InMemoryCalendar;
pub use models::{CalendarEvent, NewEvent, TimeRange};

use crate::error::AppResult;
use async_trait::async_trait;

/// A calendar backend that can list and create events
#[async_trait]
pub trait CalendarProvider: Send + Sync + 'static {
    /// Get the name of the provider
    fn name(&self) -> &'static str;

    /// Events intersecting `range`, ordered by start time ascending
    async fn list_events(&self, range: &TimeRange) -> AppResult<Vec<CalendarEvent>>;

    /// Create an event and return it as stored by the provider
    async fn insert_event(&self, event: &NewEvent) -> AppResult<CalendarEvent>;
}
