use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Slots collected so far for one booking conversation. Rebuilt from the
/// turn's parameters every time; Dialogflow's session carries them between
/// turns.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BookingSlots {
    pub date: Option<String>,
    pub time: Option<String>,
    pub email: Option<String>,
    pub name: Option<String>,
}

impl BookingSlots {
    pub fn from_parameters(params: &Map<String, Value>) -> Self {
        Self {
            date: slot_value(params.get("date")),
            time: slot_value(params.get("time")),
            email: slot_value(params.get("email")),
            name: slot_value(params.get("name")),
        }
    }

    /// Parameters to hand back to Dialogflow with a follow-up event. Only
    /// slots that are present are forwarded.
    pub fn forward(&self, include_email: bool) -> Map<String, Value> {
        let mut out = Map::new();
        let mut put = |key: &str, value: &Option<String>| {
            if let Some(v) = value {
                out.insert(key.to_string(), Value::String(v.clone()));
            }
        };
        put("date", &self.date);
        put("time", &self.time);
        if include_email {
            put("email", &self.email);
        }
        out
    }
}

/// Keys read, in order, from object-valued parameters: `@sys.person` and the
/// `@sys.date-time` point and interval forms.
const OBJECT_SLOT_KEYS: [&str; 5] = ["name", "date_time", "startDateTime", "startDate", "startTime"];

/// Dialogflow sends `""` for unfilled parameters and objects for
/// `@sys.person` / `@sys.date-time`.
fn slot_value(value: Option<&Value>) -> Option<String> {
    let raw = match value? {
        Value::String(s) => s.as_str(),
        Value::Object(obj) => OBJECT_SLOT_KEYS
            .iter()
            .find_map(|key| obj.get(*key).and_then(Value::as_str))?,
        _ => return None,
    };
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

/// Event resource in the shape Google Calendar's `events.insert` expects.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CalendarEvent {
    pub summary: String,
    pub description: String,
    pub start: EventTime,
    pub end: EventTime,
    pub reminders: Reminders,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EventTime {
    pub date_time: chrono::DateTime<chrono::FixedOffset>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Reminders {
    pub use_default: bool,
    pub overrides: Vec<ReminderOverride>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReminderOverride {
    pub method: ReminderMethod,
    pub minutes: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ReminderMethod {
    Email,
    Popup,
}

/// The parts of the calendar's response the confirmation message uses.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatedEvent {
    #[serde(default)]
    pub summary: String,
    #[serde(default)]
    pub html_link: String,
}
