pub mod email;
pub mod fulfillment;
pub mod health;
pub mod instagram;
pub mod whatsapp;

use std::sync::Arc;

use axum::routing::{get, post};
use axum::Router;
use tower_http::trace::TraceLayer;

use crate::state::AppState;

pub const PROCESSED: &str = "Message sent to Dialogflow and processed.";
pub const PROCESSING_ERROR: &str = "Error processing request";

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health::health))
        .route("/fulfillment", post(fulfillment::fulfillment))
        .route("/Email", post(email::email_webhook))
        .route(
            "/Instagram",
            get(instagram::instagram_verify).post(instagram::instagram_webhook),
        )
        .route(whatsapp::WHATSAPP_PATH, post(whatsapp::whatsapp_webhook))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
