/// Intents this relay knows how to fulfill, keyed by Dialogflow display name.
#[derive(Debug, Clone, PartialEq)]
pub enum Intent {
    /// `book Appointment` and its follow-up event intents
    /// `ask_for_email` / `ask_for_name`.
    Appointment,
    /// `general`: answered by the text generator.
    General,
    Unrecognized(String),
}

pub const BOOK_APPOINTMENT: &str = "book Appointment";
pub const ASK_FOR_EMAIL: &str = "ask_for_email";
pub const ASK_FOR_NAME: &str = "ask_for_name";
pub const GENERAL: &str = "general";

impl Intent {
    pub fn from_display_name(name: &str) -> Self {
        match name {
            BOOK_APPOINTMENT | ASK_FOR_EMAIL | ASK_FOR_NAME => Intent::Appointment,
            GENERAL => Intent::General,
            other => Intent::Unrecognized(other.to_string()),
        }
    }
}
