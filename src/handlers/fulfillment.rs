use std::sync::Arc;

use axum::extract::State;
use axum::Json;
use serde_json::Value;

use crate::errors::AppError;
use crate::models::{ConversationTurn, FulfillmentReply, WebhookRequest};
use crate::services::dispatcher;
use crate::state::AppState;

/// Dialogflow fulfillment webhook.
pub async fn fulfillment(
    State(state): State<Arc<AppState>>,
    Json(raw): Json<Value>,
) -> Result<Json<FulfillmentReply>, AppError> {
    let req: WebhookRequest =
        serde_json::from_value(raw).map_err(|e| AppError::MissingField(e.to_string()))?;
    let turn = ConversationTurn::from(req);

    tracing::info!(
        intent = %turn.intent_name,
        query = %turn.raw_utterance,
        "incoming fulfillment request"
    );

    let reply = dispatcher::dispatch(&state, &turn).await?;
    Ok(Json(reply))
}
