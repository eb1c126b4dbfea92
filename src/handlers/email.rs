use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::{json, Value};

use crate::errors::AppError;
use crate::handlers::PROCESSING_ERROR;
use crate::models::EmailWebhook;
use crate::services::relay;
use crate::state::AppState;

/// Inbound email from the mail gateway; the agent's reply goes back by mail.
pub async fn email_webhook(
    State(state): State<Arc<AppState>>,
    Json(raw): Json<Value>,
) -> Response {
    let hook: EmailWebhook = match serde_json::from_value(raw.clone()) {
        Ok(h) => h,
        Err(e) => return AppError::MissingField(e.to_string()).into_response(),
    };
    let message = hook.normalize(raw);

    tracing::info!(from = %message.sender_id, "incoming email");

    if message.text.is_empty() {
        return AppError::MissingField("Body".to_string()).into_response();
    }

    let reply = match relay::converse(state.session.as_ref(), &message).await {
        Ok(r) => r,
        Err(_) => return (StatusCode::INTERNAL_SERVER_ERROR, PROCESSING_ERROR).into_response(),
    };

    let to = hook.reply_to();
    if let Err(e) = state
        .mailer
        .send_mail(to, &hook.reply_subject(), &reply)
        .await
    {
        tracing::error!(error = %e, to = %to, "failed to send email reply");
        return (StatusCode::INTERNAL_SERVER_ERROR, PROCESSING_ERROR).into_response();
    }

    tracing::info!(to = %to, "email reply sent");
    Json(json!({ "message": "Email sent successfully!" })).into_response()
}
