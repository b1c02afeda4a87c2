use super::models::{ApiEvent, EventsPage};
use super::token::TokenManager;
use crate::components::calendar::time::to_provider_string;
use crate::components::calendar::{CalendarEvent, CalendarProvider, NewEvent, TimeRange};
use crate::config::Config;
use crate::error::{provider_error, AppResult};
use async_trait::async_trait;
use reqwest::{Client, Response};
use std::collections::HashSet;
use std::path::PathBuf;
use std::time::Duration;
use tracing::{debug, info};
use url::Url;

/// Upper bound on result pages fetched for one listing
const MAX_PAGES: usize = 100;

/// Google Calendar REST client bound to one calendar
#[derive(Clone)]
pub struct GoogleCalendarClient {
    calendar_id: String,
    api_base: String,
    token_manager: TokenManager,
    client: Client,
}

impl GoogleCalendarClient {
    /// Create a client from the service configuration
    pub fn new(config: &Config) -> AppResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .map_err(|e| provider_error(&format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self::with_client(
            config.credentials_file.clone(),
            config.calendar_id.clone(),
            config.calendar_api_base.clone(),
            client,
        ))
    }

    /// Create a client from explicit parts
    pub fn with_client(
        credentials_file: PathBuf,
        calendar_id: String,
        api_base: String,
        client: Client,
    ) -> Self {
        Self {
            calendar_id,
            api_base,
            token_manager: TokenManager::new(credentials_file, client.clone()),
            client,
        }
    }

    /// `{api_base}/calendars/{calendar_id}/events`, with the ID escaped
    fn events_url(&self) -> AppResult<Url> {
        let mut url = Url::parse(&self.api_base)
            .map_err(|e| provider_error(&format!("Failed to parse URL: {}", e)))?;

        url.path_segments_mut()
            .map_err(|_| provider_error(&format!("Invalid API base URL: {}", self.api_base)))?
            .pop_if_empty()
            .extend(["calendars", self.calendar_id.as_str(), "events"]);

        Ok(url)
    }

    async fn fetch_page(
        &self,
        access_token: &str,
        range: &TimeRange,
        page_token: Option<&str>,
    ) -> AppResult<EventsPage> {
        let mut url = self.events_url()?;
        {
            let mut query = url.query_pairs_mut();
            query.append_pair("timeMin", &to_provider_string(range.start()));
            query.append_pair("timeMax", &to_provider_string(range.end()));
            query.append_pair("singleEvents", "true");
            query.append_pair("orderBy", "startTime");
            if let Some(token) = page_token {
                query.append_pair("pageToken", token);
            }
        }

        let response = self
            .client
            .get(url)
            .bearer_auth(access_token)
            .send()
            .await
            .map_err(|e| provider_error(&format!("Failed to fetch events: {}", e)))?;

        let response = ensure_success(response, "Failed to fetch events").await?;

        response
            .json()
            .await
            .map_err(|e| provider_error(&format!("Failed to parse events response: {}", e)))
    }
}

/// Turn a non-2xx response into a provider error carrying the body
async fn ensure_success(response: Response, context: &str) -> AppResult<Response> {
    if response.status().is_success() {
        return Ok(response);
    }

    let status = response.status();
    let error_body = response
        .text()
        .await
        .unwrap_or_else(|_| "Could not read error response".to_string());

    Err(provider_error(&format!(
        "{}: HTTP {} - {}",
        context, status, error_body
    )))
}

#[async_trait]
impl CalendarProvider for GoogleCalendarClient {
    fn name(&self) -> &'static str {
        "google_calendar"
    }

    async fn list_events(&self, range: &TimeRange) -> AppResult<Vec<CalendarEvent>> {
        let token = self.token_manager.get_token().await?;

        let mut events = Vec::new();
        let mut page_token: Option<String> = None;
        let mut seen_tokens = HashSet::new();

        for _ in 0..MAX_PAGES {
            let page = self
                .fetch_page(&token.token, range, page_token.as_deref())
                .await?;
            events.extend(page.items.into_iter().map(CalendarEvent::from));

            let Some(next) = page.next_page_token else {
                debug!(
                    "Fetched {} events from calendar {}",
                    events.len(),
                    self.calendar_id
                );
                return Ok(events);
            };

            if !seen_tokens.insert(next.clone()) {
                return Err(provider_error(&format!(
                    "Calendar API repeated page token {}",
                    next
                )));
            }
            page_token = Some(next);
        }

        Err(provider_error(&format!(
            "Calendar listing did not finish within {} pages",
            MAX_PAGES
        )))
    }

    async fn insert_event(&self, event: &NewEvent) -> AppResult<CalendarEvent> {
        let token = self.token_manager.get_token().await?;
        let url = self.events_url()?;

        let response = self
            .client
            .post(url)
            .bearer_auth(&token.token)
            .json(&ApiEvent::from(event))
            .send()
            .await
            .map_err(|e| provider_error(&format!("Failed to create event: {}", e)))?;

        let response = ensure_success(response, "Failed to create event").await?;

        let created: ApiEvent = response
            .json()
            .await
            .map_err(|e| provider_error(&format!("Failed to parse created event: {}", e)))?;

        let created = CalendarEvent::from(created);
        info!("Created event {} on calendar {}", created.id, self.calendar_id);

        Ok(created)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client_with_base(api_base: &str) -> GoogleCalendarClient {
        GoogleCalendarClient::with_client(
            PathBuf::from("unused.json"),
            "team@group.calendar.google.com".to_string(),
            api_base.to_string(),
            Client::new(),
        )
    }

    #[test]
    fn events_url_escapes_the_calendar_id() {
        let url = client_with_base("https://www.googleapis.com/calendar/v3")
            .events_url()
            .unwrap();
        assert_eq!(
            url.as_str(),
            "https://www.googleapis.com/calendar/v3/calendars/team@group.calendar.google.com/events"
        );

        let client = GoogleCalendarClient::with_client(
            PathBuf::from("unused.json"),
            "a/b c".to_string(),
            "http://localhost:9000/".to_string(),
            Client::new(),
        );
        assert_eq!(
            client.events_url().unwrap().as_str(),
            "http://localhost:9000/calendars/a%2Fb%20c/events"
        );
    }

    #[test]
    fn unusable_api_base_is_a_provider_error() {
        assert!(matches!(
            client_with_base("not a url").events_url(),
            Err(crate::error::Error::Provider(_))
        ));
    }
}
