use crate::config::AppConfig;
use crate::services::ai::{SessionClient, TextGenerator};
use crate::services::calendar::CalendarProvider;
use crate::services::mail::Mailer;
use crate::services::messaging::MessagingProvider;

/// Client handles built once at startup and shared read-only by every
/// request.
pub struct AppState {
    pub config: AppConfig,
    pub calendar: Box<dyn CalendarProvider>,
    pub generator: Box<dyn TextGenerator>,
    pub session: Box<dyn SessionClient>,
    pub mailer: Box<dyn Mailer>,
    pub instagram: Box<dyn MessagingProvider>,
    pub whatsapp: Box<dyn MessagingProvider>,
}
