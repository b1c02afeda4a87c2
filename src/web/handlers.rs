use super::error::ApiError;
use super::AppState;
use crate::components::booking::Availability;
use crate::components::calendar::{CalendarEvent, NewEvent, TimeRange};
use crate::components::conversation::ChatReply;
use crate::error::Error;
use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

/// Query string of `GET /check_availability`
#[derive(Debug, Deserialize)]
pub struct AvailabilityQuery {
    pub start_time: Option<String>,
    pub end_time: Option<String>,
    pub timezone: Option<String>,
}

/// Body of `POST /book_appointment`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookingRequest {
    pub title: String,
    pub description: String,
    pub start_time: String,
    pub end_time: String,
    #[serde(default)]
    pub timezone: Option<String>,
}

/// Successful booking response
#[derive(Debug, Serialize)]
pub struct BookingResponse {
    pub status: &'static str,
    pub event: CalendarEvent,
}

/// Body of `POST /converse`
#[derive(Debug, Default, Deserialize)]
pub struct ConverseRequest {
    #[serde(default)]
    pub message: String,
}

fn required(value: Option<String>, name: &str) -> Result<String, ApiError> {
    value.ok_or_else(|| ApiError::new(StatusCode::BAD_REQUEST, format!("{} is required", name)))
}

fn unprocessable(rejection: JsonRejection) -> ApiError {
    ApiError::new(StatusCode::UNPROCESSABLE_ENTITY, rejection.body_text())
}

fn bad_query(rejection: QueryRejection) -> ApiError {
    ApiError::new(StatusCode::BAD_REQUEST, rejection.body_text())
}

/// Handler for availability checks
pub async fn check_availability_handler(
    State(state): State<AppState>,
    query: Result<Query<AvailabilityQuery>, QueryRejection>,
) -> Result<Json<Availability>, ApiError> {
    const CONTEXT: &str = "Error checking availability";

    let Query(query) = query.map_err(bad_query)?;

    let start_time = required(query.start_time, "start_time")?;
    let end_time = required(query.end_time, "end_time")?;
    let timezone = query
        .timezone
        .unwrap_or_else(|| state.default_timezone.clone());

    let range = TimeRange::parse(&start_time, &end_time, &timezone)
        .map_err(|e| ApiError::from_error(e, CONTEXT))?;

    let availability = state
        .booking
        .check_availability(&range)
        .await
        .map_err(|e| ApiError::from_error(e, CONTEXT))?;

    Ok(Json(availability))
}

/// Handler for direct bookings
pub async fn book_appointment_handler(
    State(state): State<AppState>,
    payload: Result<Json<BookingRequest>, JsonRejection>,
) -> Result<Json<BookingResponse>, ApiError> {
    const CONTEXT: &str = "Error creating event";

    let Json(request) = payload.map_err(unprocessable)?;
    let timezone = request
        .timezone
        .unwrap_or_else(|| state.default_timezone.clone());

    let event = NewEvent {
        range: TimeRange::parse(&request.start_time, &request.end_time, &timezone)
            .map_err(|e| ApiError::from_error(e, CONTEXT))?,
        title: request.title,
        description: request.description,
    };

    match state.booking.book_appointment(&event).await {
        Ok(created) => Ok(Json(BookingResponse {
            status: "success",
            event: created,
        })),
        Err(Error::Provider(reason)) => {
            warn!("Provider rejected booking '{}': {}", event.title, reason);
            Err(ApiError::new(StatusCode::BAD_REQUEST, "Failed to create event"))
        }
        Err(e) => Err(ApiError::from_error(e, CONTEXT)),
    }
}

/// Handler for the chat endpoint
pub async fn converse_handler(
    State(state): State<AppState>,
    payload: Result<Json<ConverseRequest>, JsonRejection>,
) -> Result<Json<ChatReply>, ApiError> {
    let Json(request) = payload.map_err(unprocessable)?;
    info!("Received chat message ({} chars)", request.message.len());

    state
        .conversation
        .respond(&request.message)
        .await
        .map(Json)
        .map_err(|e| ApiError::from_error(e, "Error processing conversation"))
}

/// Handler for API health check
pub async fn health_handler() -> &'static str {
    "OK"
}
