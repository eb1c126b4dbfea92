use anyhow::Context;
use async_trait::async_trait;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use serde_json::{json, Value};
use sha1::{Digest, Sha1};

use super::SessionClient;
use crate::services::google_auth::{ServiceAccount, DIALOGFLOW_SCOPE};

const DIALOGFLOW_API: &str = "https://dialogflow.googleapis.com/v2";
const MAX_SESSION_ID_LEN: usize = 36;

pub struct DialogflowSessionClient {
    project_id: String,
    language_code: String,
    auth: ServiceAccount,
    client: reqwest::Client,
}

impl DialogflowSessionClient {
    pub fn new(
        project_id: String,
        language_code: String,
        client_email: String,
        private_key: String,
        client: reqwest::Client,
    ) -> Self {
        Self {
            project_id,
            language_code,
            auth: ServiceAccount::new(client_email, private_key, DIALOGFLOW_SCOPE, client.clone()),
            client,
        }
    }
}

#[async_trait]
impl SessionClient for DialogflowSessionClient {
    async fn detect_intent(
        &self,
        text: &str,
        sender_id: &str,
        raw: &Value,
    ) -> anyhow::Result<String> {
        let token = self.auth.access_token().await?;
        let url = format!(
            "{DIALOGFLOW_API}/projects/{}/agent/sessions/{}:detectIntent",
            self.project_id,
            session_id(sender_id)
        );

        let body = json!({
            "queryInput": {
                "text": { "text": text, "languageCode": self.language_code },
            },
            "queryParams": { "payload": raw },
        });

        let resp = self
            .client
            .post(url)
            .bearer_auth(token)
            .json(&body)
            .send()
            .await
            .context("failed to call Dialogflow API")?;

        let status = resp.status();
        let data: Value = resp
            .json()
            .await
            .context("failed to parse Dialogflow response")?;

        if !status.is_success() {
            anyhow::bail!("Dialogflow API error ({}): {}", status, data);
        }

        fulfillment_text(&data).ok_or_else(|| anyhow::anyhow!("empty Dialogflow fulfillment"))
    }
}

/// Session ids are limited to 36 characters of `[A-Za-z0-9_-]`. Channel
/// sender ids (`whatsapp:+1555..`, email addresses) are hashed so distinct
/// senders never share a session.
pub fn session_id(sender_id: &str) -> String {
    let digest = Sha1::digest(sender_id.as_bytes());
    let mut id = URL_SAFE_NO_PAD.encode(digest);
    id.truncate(MAX_SESSION_ID_LEN);
    id
}

/// `queryResult.fulfillmentText`, or the joined text messages when the agent
/// only filled `fulfillmentMessages`.
fn fulfillment_text(data: &Value) -> Option<String> {
    let result = &data["queryResult"];
    if let Some(text) = result["fulfillmentText"].as_str().filter(|t| !t.is_empty()) {
        return Some(text.to_string());
    }

    let lines: Vec<&str> = result["fulfillmentMessages"]
        .as_array()?
        .iter()
        .filter_map(|m| m["text"]["text"].as_array())
        .flatten()
        .filter_map(Value::as_str)
        .collect();

    if lines.is_empty() {
        None
    } else {
        Some(lines.join("\n"))
    }
}
