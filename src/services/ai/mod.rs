pub mod dialogflow;
pub mod gemini;

use async_trait::async_trait;
use serde_json::Value;

/// Free-text generation backend for the `general` intent.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    async fn generate(&self, prompt: &str) -> anyhow::Result<String>;
}

/// The conversational-AI session layer channel traffic is sent through.
#[async_trait]
pub trait SessionClient: Send + Sync {
    /// Runs one turn for `sender_id`'s session and returns the reply text.
    async fn detect_intent(&self, text: &str, sender_id: &str, raw: &Value)
        -> anyhow::Result<String>;
}
