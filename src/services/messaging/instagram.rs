use anyhow::Context;
use async_trait::async_trait;
use serde_json::json;

use super::MessagingProvider;

const GRAPH_MESSAGES_URL: &str = "https://graph.facebook.com/v11.0/me/messages";

/// Instagram messaging through the Meta Graph send API.
pub struct InstagramProvider {
    access_token: String,
    client: reqwest::Client,
}

impl InstagramProvider {
    pub fn new(access_token: String, client: reqwest::Client) -> Self {
        Self {
            access_token,
            client,
        }
    }
}

#[async_trait]
impl MessagingProvider for InstagramProvider {
    async fn send_message(&self, to: &str, body: &str) -> anyhow::Result<()> {
        let payload = json!({
            "recipient": { "id": to },
            "message": { "text": body },
        });

        let resp = self
            .client
            .post(GRAPH_MESSAGES_URL)
            .query(&[("access_token", &self.access_token)])
            .json(&payload)
            .send()
            .await
            .context("failed to send Instagram message")?;

        let status = resp.status();
        let data: serde_json::Value = resp
            .json()
            .await
            .context("failed to parse Graph API response")?;

        // Graph reports some failures with a 200 and an `error` object.
        if !status.is_success() || data.get("error").is_some() {
            anyhow::bail!("Graph API error ({}): {}", status, data);
        }

        Ok(())
    }
}
