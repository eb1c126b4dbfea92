use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Inbound webhook body sent by Dialogflow for every fulfillment-enabled turn.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WebhookRequest {
    pub query_result: QueryResult,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryResult {
    #[serde(default)]
    pub query_text: String,
    pub intent: IntentInfo,
    #[serde(default)]
    pub parameters: Map<String, Value>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IntentInfo {
    pub display_name: String,
}

/// One already-classified turn, as handed to the dispatcher.
#[derive(Debug, Clone)]
pub struct ConversationTurn {
    pub intent_name: String,
    pub raw_utterance: String,
    pub parameters: Map<String, Value>,
}

impl From<WebhookRequest> for ConversationTurn {
    fn from(req: WebhookRequest) -> Self {
        Self {
            intent_name: req.query_result.intent.display_name,
            raw_utterance: req.query_result.query_text,
            parameters: req.query_result.parameters,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum FulfillmentReply {
    Text {
        #[serde(rename = "fulfillmentText")]
        fulfillment_text: String,
    },
    Followup {
        #[serde(rename = "followupEventInput")]
        followup_event_input: FollowupEventInput,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FollowupEventInput {
    pub name: String,
    pub language_code: String,
    pub parameters: Map<String, Value>,
}

impl FulfillmentReply {
    pub fn text(text: impl Into<String>) -> Self {
        FulfillmentReply::Text {
            fulfillment_text: text.into(),
        }
    }

    pub fn followup(
        event: impl Into<String>,
        language_code: impl Into<String>,
        parameters: Map<String, Value>,
    ) -> Self {
        FulfillmentReply::Followup {
            followup_event_input: FollowupEventInput {
                name: event.into(),
                language_code: language_code.into(),
                parameters,
            },
        }
    }
}
