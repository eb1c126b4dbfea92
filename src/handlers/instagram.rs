use std::sync::Arc;

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Deserialize;
use serde_json::Value;

use crate::errors::AppError;
use crate::handlers::{PROCESSED, PROCESSING_ERROR};
use crate::models::instagram_messages;
use crate::services::relay;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct VerifyParams {
    #[serde(rename = "hub.verify_token")]
    pub verify_token: Option<String>,
    #[serde(rename = "hub.challenge")]
    pub challenge: Option<String>,
}

/// Echoes `hub.challenge` when `hub.verify_token` matches the configured
/// token. An unset token never verifies.
pub fn verify(expected: &str, params: &VerifyParams) -> Result<String, AppError> {
    match params.verify_token.as_deref() {
        Some(token) if !expected.is_empty() && token == expected => {
            Ok(params.challenge.clone().unwrap_or_default())
        }
        _ => Err(AppError::VerificationMismatch),
    }
}

/// Meta webhook subscription handshake.
pub async fn instagram_verify(
    State(state): State<Arc<AppState>>,
    Query(params): Query<VerifyParams>,
) -> Result<String, AppError> {
    let result = verify(&state.config.instagram_verify_token, &params);
    match &result {
        Ok(_) => tracing::info!("instagram webhook verified"),
        Err(_) => tracing::warn!("instagram verification token mismatch"),
    }
    result
}

pub async fn instagram_webhook(
    State(state): State<Arc<AppState>>,
    Json(body): Json<Value>,
) -> Response {
    let messages = instagram_messages(&body);
    if messages.is_empty() {
        tracing::debug!("instagram webhook without text messages, ignoring");
    }

    // Every message is tried; the batch is a 500 only when none got through.
    let mut failed = 0;
    for message in &messages {
        tracing::info!(from = %message.sender_id, "incoming instagram message");

        if let Err(e) =
            relay::relay_reply(state.session.as_ref(), state.instagram.as_ref(), message).await
        {
            tracing::error!(error = %e, from = %message.sender_id, "instagram relay failed");
            failed += 1;
        }
    }

    if batch_failed(messages.len(), failed) {
        return (StatusCode::INTERNAL_SERVER_ERROR, PROCESSING_ERROR).into_response();
    }
    if failed > 0 {
        tracing::warn!(failed, total = messages.len(), "instagram batch partially relayed");
    }

    (StatusCode::OK, PROCESSED).into_response()
}

fn batch_failed(total: usize, failed: usize) -> bool {
    total > 0 && failed == total
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(token: Option<&str>, challenge: Option<&str>) -> VerifyParams {
        VerifyParams {
            verify_token: token.map(str::to_string),
            challenge: challenge.map(str::to_string),
        }
    }

    #[test]
    fn test_verify_echoes_challenge() {
        let out = verify("secret", &params(Some("secret"), Some("12345"))).unwrap();
        assert_eq!(out, "12345");
    }

    #[test]
    fn test_verify_rejects_wrong_or_missing_token() {
        assert!(verify("secret", &params(Some("nope"), Some("1"))).is_err());
        assert!(verify("secret", &params(None, Some("1"))).is_err());
    }

    #[test]
    fn test_verify_rejects_when_unconfigured() {
        assert!(verify("", &params(Some(""), Some("1"))).is_err());
    }

    #[test]
    fn test_batch_fails_only_when_nothing_relayed() {
        assert!(!batch_failed(0, 0));
        assert!(!batch_failed(3, 1));
        assert!(!batch_failed(3, 2));
        assert!(batch_failed(1, 1));
        assert!(batch_failed(3, 3));
    }
}
