use std::collections::HashMap;

use serde::Deserialize;
use serde_json::Value;

/// A channel message normalized for the AI session layer.
#[derive(Debug, Clone, PartialEq)]
pub struct InboundMessage {
    pub text: String,
    pub sender_id: String,
    pub raw: Value,
}

/// Email gateway callback (Zapier-style JSON).
#[derive(Debug, Clone, Deserialize)]
pub struct EmailWebhook {
    #[serde(rename = "Body", default)]
    pub body: String,
    #[serde(rename = "From")]
    pub from: String,
    #[serde(rename = "Subject", default)]
    pub subject: Option<String>,
    /// Reply-to address when it differs from `From`.
    #[serde(rename = "Email", default)]
    pub email: Option<String>,
}

impl EmailWebhook {
    pub fn normalize(&self, raw: Value) -> InboundMessage {
        InboundMessage {
            text: self.body.trim().to_string(),
            sender_id: self.from.trim().to_string(),
            raw,
        }
    }

    pub fn reply_to(&self) -> &str {
        self.email
            .as_deref()
            .map(str::trim)
            .filter(|e| !e.is_empty())
            .unwrap_or(self.from.trim())
    }

    pub fn reply_subject(&self) -> String {
        self.subject
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .unwrap_or_else(|| "Re: your message".to_string())
    }
}

/// Twilio messaging webhook form (WhatsApp sender ids look like
/// `whatsapp:+15551234567`). Twilio posts many more fields; all of them are
/// kept in `params` because the request signature covers every one.
#[derive(Debug, Clone)]
pub struct TwilioWebhookForm {
    pub from: String,
    pub body: String,
    pub params: HashMap<String, String>,
}

impl TwilioWebhookForm {
    pub fn from_params(params: HashMap<String, String>) -> Option<Self> {
        let from = params.get("From")?.trim().to_string();
        let body = params.get("Body").map(|b| b.trim().to_string()).unwrap_or_default();
        Some(Self { from, body, params })
    }

    pub fn normalize(&self) -> InboundMessage {
        InboundMessage {
            text: self.body.clone(),
            sender_id: self.from.clone(),
            raw: serde_json::to_value(&self.params).unwrap_or(Value::Null),
        }
    }
}

/// Pull text messages out of an Instagram webhook body. Accepts Meta's
/// `entry[].messaging[]` envelope as well as a flat `{message, userId}` body.
pub fn instagram_messages(body: &Value) -> Vec<InboundMessage> {
    if let Some(entries) = body.get("entry").and_then(Value::as_array) {
        return entries
            .iter()
            .filter_map(|entry| entry.get("messaging").and_then(Value::as_array))
            .flatten()
            .filter_map(|event| {
                // Echoes of our own sends come back through the same webhook.
                if event["message"]["is_echo"].as_bool() == Some(true) {
                    return None;
                }
                let sender = event["sender"]["id"].as_str()?;
                let text = event["message"]["text"].as_str()?;
                Some(InboundMessage {
                    text: text.trim().to_string(),
                    sender_id: sender.to_string(),
                    raw: event.clone(),
                })
            })
            .collect();
    }

    let text = body.get("message").and_then(|m| match m {
        Value::String(s) => Some(s.as_str()),
        other => other.get("text").and_then(Value::as_str),
    });
    let sender = body.get("userId").and_then(|id| match id {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    });

    match (text, sender) {
        (Some(text), Some(sender)) => vec![InboundMessage {
            text: text.trim().to_string(),
            sender_id: sender,
            raw: body.clone(),
        }],
        _ => vec![],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_email_reply_defaults() {
        let hook: EmailWebhook = serde_json::from_value(json!({
            "Body": "  hello  ",
            "From": "jo@example.com",
        }))
        .unwrap();
        let msg = hook.normalize(json!({}));
        assert_eq!(msg.text, "hello");
        assert_eq!(msg.sender_id, "jo@example.com");
        assert_eq!(hook.reply_to(), "jo@example.com");
        assert_eq!(hook.reply_subject(), "Re: your message");
    }

    #[test]
    fn test_email_reply_to_prefers_email_field() {
        let hook: EmailWebhook = serde_json::from_value(json!({
            "Body": "hi",
            "From": "Jo <jo@example.com>",
            "Email": "jo@example.com",
            "Subject": "Question",
        }))
        .unwrap();
        assert_eq!(hook.reply_to(), "jo@example.com");
        assert_eq!(hook.reply_subject(), "Question");
    }

    #[test]
    fn test_twilio_form() {
        let params: HashMap<String, String> = [
            ("From", "whatsapp:+15551234567"),
            ("To", "whatsapp:+15557654321"),
            ("Body", " book an appointment "),
            ("NumMedia", "0"),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
        let form = TwilioWebhookForm::from_params(params).unwrap();
        let msg = form.normalize();
        assert_eq!(msg.text, "book an appointment");
        assert_eq!(msg.sender_id, "whatsapp:+15551234567");
        assert_eq!(msg.raw["NumMedia"], "0");

        assert!(TwilioWebhookForm::from_params(HashMap::new()).is_none());
    }

    #[test]
    fn test_instagram_meta_envelope() {
        let body = json!({
            "object": "instagram",
            "entry": [{
                "id": "1",
                "messaging": [
                    { "sender": { "id": "42" }, "recipient": { "id": "1" }, "message": { "mid": "m1", "text": "hi there" } },
                    { "sender": { "id": "1" }, "recipient": { "id": "42" }, "message": { "mid": "m2", "text": "echo", "is_echo": true } },
                    { "sender": { "id": "42" }, "read": { "mid": "m1" } }
                ]
            }]
        });
        let msgs = instagram_messages(&body);
        assert_eq!(msgs.len(), 1);
        assert_eq!(msgs[0].text, "hi there");
        assert_eq!(msgs[0].sender_id, "42");
    }

    #[test]
    fn test_instagram_flat_body() {
        let msgs = instagram_messages(&json!({ "message": "book a call", "userId": 77 }));
        assert_eq!(msgs.len(), 1);
        assert_eq!(msgs[0].sender_id, "77");
        assert_eq!(msgs[0].text, "book a call");
    }

    #[test]
    fn test_instagram_unusable_body() {
        assert!(instagram_messages(&json!({ "foo": "bar" })).is_empty());
    }
}
