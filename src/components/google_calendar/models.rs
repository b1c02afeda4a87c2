use crate::components::calendar::time::to_provider_string;
use crate::components::calendar::{CalendarEvent, NewEvent};
use serde::{Deserialize, Serialize};

/// `start`/`end` object of a Calendar API event
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventDateTime {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date_time: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time_zone: Option<String>,
}

/// Event resource as sent to and returned by the Calendar API
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiEvent {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start: Option<EventDateTime>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end: Option<EventDateTime>,
}

/// One page of an `events.list` response
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventsPage {
    #[serde(default)]
    pub items: Vec<ApiEvent>,
    pub next_page_token: Option<String>,
}

impl From<&NewEvent> for ApiEvent {
    fn from(event: &NewEvent) -> Self {
        let time_zone = event.range.timezone().name().to_string();

        ApiEvent {
            id: None,
            summary: Some(event.title.clone()),
            description: Some(event.description.clone()),
            start: Some(EventDateTime {
                date_time: Some(to_provider_string(event.range.start())),
                date: None,
                time_zone: Some(time_zone.clone()),
            }),
            end: Some(EventDateTime {
                date_time: Some(to_provider_string(event.range.end())),
                date: None,
                time_zone: Some(time_zone),
            }),
        }
    }
}

impl From<ApiEvent> for CalendarEvent {
    fn from(event: ApiEvent) -> Self {
        let start = event.start.unwrap_or_default();
        let end = event.end.unwrap_or_default();
        let all_day = start.date_time.is_none() && start.date.is_some();

        CalendarEvent {
            id: event.id.unwrap_or_default(),
            title: event.summary,
            description: event.description,
            timezone: start.time_zone.or(end.time_zone),
            start: start.date_time.or(start.date),
            end: end.date_time.or(end.date),
            all_day,
        }
    }
}
