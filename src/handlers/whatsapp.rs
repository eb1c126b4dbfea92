use std::collections::HashMap;
use std::sync::Arc;

use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Form;
use base64::Engine;
use hmac::{Hmac, Mac};
use sha1::Sha1;

use crate::errors::AppError;
use crate::handlers::{PROCESSED, PROCESSING_ERROR};
use crate::models::TwilioWebhookForm;
use crate::services::relay;
use crate::state::AppState;

pub const WHATSAPP_PATH: &str = "/whatsApp";

/// Twilio's `X-Twilio-Signature`: base64 HMAC-SHA1 of the full webhook URL
/// followed by every POST param, sorted by name, as `name` + `value`.
pub fn twilio_signature(
    auth_token: &str,
    url: &str,
    params: &HashMap<String, String>,
) -> Option<String> {
    let mut data = url.to_string();
    let mut sorted: Vec<(&String, &String)> = params.iter().collect();
    sorted.sort_by(|a, b| a.0.cmp(b.0));
    for (key, value) in sorted {
        data.push_str(key);
        data.push_str(value);
    }

    let mut mac = Hmac::<Sha1>::new_from_slice(auth_token.as_bytes()).ok()?;
    mac.update(data.as_bytes());
    let result = mac.finalize().into_bytes();
    Some(base64::engine::general_purpose::STANDARD.encode(result))
}

fn webhook_url(headers: &HeaderMap) -> String {
    // Behind a proxy the public scheme/host arrive in X-Forwarded-*.
    let proto = headers
        .get("x-forwarded-proto")
        .and_then(|v| v.to_str().ok())
        .unwrap_or("https");
    let host = headers
        .get("x-forwarded-host")
        .or_else(|| headers.get("host"))
        .and_then(|v| v.to_str().ok())
        .unwrap_or("localhost");
    format!("{proto}://{host}{WHATSAPP_PATH}")
}

pub async fn whatsapp_webhook(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Form(params): Form<HashMap<String, String>>,
) -> Response {
    // Signature checks are skipped when no auth token is configured (dev mode).
    if !state.config.twilio_auth_token.is_empty() {
        let signature = headers
            .get("x-twilio-signature")
            .and_then(|v| v.to_str().ok())
            .unwrap_or("");

        if signature.is_empty() {
            tracing::warn!("missing X-Twilio-Signature header");
            return (StatusCode::FORBIDDEN, "Missing signature").into_response();
        }

        let expected =
            twilio_signature(&state.config.twilio_auth_token, &webhook_url(&headers), &params);
        if expected.as_deref() != Some(signature) {
            tracing::warn!("invalid Twilio signature");
            return (StatusCode::FORBIDDEN, "Invalid signature").into_response();
        }
    }

    let Some(form) = TwilioWebhookForm::from_params(params) else {
        return AppError::MissingField("From".to_string()).into_response();
    };
    let message = form.normalize();

    tracing::info!(from = %message.sender_id, body = %message.text, "incoming WhatsApp message");

    if message.text.is_empty() {
        return AppError::MissingField("Body".to_string()).into_response();
    }

    match relay::relay_reply(state.session.as_ref(), state.whatsapp.as_ref(), &message).await {
        Ok(()) => (StatusCode::OK, PROCESSED).into_response(),
        Err(e) => {
            tracing::error!(error = %e, from = %message.sender_id, "WhatsApp relay failed");
            (StatusCode::INTERNAL_SERVER_ERROR, PROCESSING_ERROR).into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_signature_is_order_independent() {
        let a = params(&[("From", "whatsapp:+1"), ("Body", "hi"), ("To", "whatsapp:+2")]);
        let b = params(&[("To", "whatsapp:+2"), ("From", "whatsapp:+1"), ("Body", "hi")]);
        let url = "https://relay.example/whatsApp";
        assert_eq!(twilio_signature("tok", url, &a), twilio_signature("tok", url, &b));
    }

    #[test]
    fn test_signature_depends_on_token_url_and_params() {
        let p = params(&[("From", "whatsapp:+1"), ("Body", "hi")]);
        let url = "https://relay.example/whatsApp";
        let base = twilio_signature("tok", url, &p);
        assert_ne!(base, twilio_signature("other", url, &p));
        assert_ne!(base, twilio_signature("tok", "https://evil.example/whatsApp", &p));
        let tampered = params(&[("From", "whatsapp:+1"), ("Body", "bye")]);
        assert_ne!(base, twilio_signature("tok", url, &tampered));
    }

    #[test]
    fn test_webhook_url_prefers_forwarded_headers() {
        let mut headers = HeaderMap::new();
        headers.insert("host", "internal:3000".parse().unwrap());
        assert_eq!(webhook_url(&headers), "https://internal:3000/whatsApp");

        headers.insert("x-forwarded-proto", "http".parse().unwrap());
        headers.insert("x-forwarded-host", "relay.example".parse().unwrap());
        assert_eq!(webhook_url(&headers), "http://relay.example/whatsApp");
    }
}
