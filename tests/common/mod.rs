#![allow(dead_code)]

use async_trait::async_trait;
use calendar_booker::components::calendar::{CalendarEvent, CalendarProvider, NewEvent, TimeRange};
use calendar_booker::error::{auth_error, provider_error, AppResult, Error};
use std::io::Write;
use tempfile::NamedTempFile;

const SERVICE_ACCOUNT: &str = include_str!("../fixtures/service_account.json");

/// Write the fixture service account key with its token URI pointed at `token_uri`
pub fn write_credentials(token_uri: &str) -> NamedTempFile {
    let mut key: serde_json::Value = serde_json::from_str(SERVICE_ACCOUNT).unwrap();
    key["token_uri"] = serde_json::json!(token_uri);

    let mut file = NamedTempFile::new().unwrap();
    write!(file, "{}", key).unwrap();
    file
}

/// How a [`FailingCalendar`] fails
#[derive(Debug, Clone, Copy)]
pub enum Failure {
    Auth,
    Provider,
}

/// Calendar provider whose every call fails
#[derive(Debug, Clone, Copy)]
pub struct FailingCalendar(pub Failure);

impl FailingCalendar {
    fn error(&self) -> Error {
        match self.0 {
            Failure::Auth => auth_error("credentials rejected"),
            Failure::Provider => provider_error("HTTP 503 Service Unavailable"),
        }
    }
}

#[async_trait]
impl CalendarProvider for FailingCalendar {
    fn name(&self) -> &'static str {
        "failing"
    }

    async fn list_events(&self, _range: &TimeRange) -> AppResult<Vec<CalendarEvent>> {
        Err(self.error())
    }

    async fn insert_event(&self, _event: &NewEvent) -> AppResult<CalendarEvent> {
        Err(self.error())
    }
}
