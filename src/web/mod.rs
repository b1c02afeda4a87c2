pub mod error;
pub mod handlers;

use crate::components::{BookingService, CalendarProvider, Conversation, IntentParser};
use crate::config::Config;
use axum::routing::{get, post};
use axum::Router;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use self::handlers::{
    book_appointment_handler, check_availability_handler, converse_handler, health_handler,
};

/// Shared state handed to every handler
#[derive(Clone)]
pub struct AppState {
    pub booking: BookingService,
    pub conversation: Conversation,
    /// Timezone applied when a request does not name one
    pub default_timezone: String,
}

impl AppState {
    pub fn new(
        config: &Config,
        provider: Arc<dyn CalendarProvider>,
        parser: Arc<dyn IntentParser>,
    ) -> Self {
        let booking = BookingService::new(provider);

        Self {
            conversation: Conversation::new(booking.clone(), parser),
            booking,
            default_timezone: config.default_timezone.clone(),
        }
    }
}

/// Build the HTTP router
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/check_availability", get(check_availability_handler))
        .route("/book_appointment", post(book_appointment_handler))
        .route("/converse", post(converse_handler))
        .route("/health", get(health_handler))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
