use std::env;
use std::time::Duration;

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub port: u16,
    pub google_project_id: String,
    pub language_code: String,
    pub google_client_email: String,
    pub google_private_key: String,
    pub google_calendar_id: String,
    pub gemini_api_key: String,
    pub gemini_model: String,
    pub smtp_host: String,
    pub service_email: String,
    pub mail_password: String,
    pub business_email: String,
    pub instagram_access_token: String,
    pub instagram_verify_token: String,
    pub twilio_account_sid: String,
    pub twilio_auth_token: String,
    pub twilio_whatsapp_number: String,
    pub upstream_timeout_secs: u64,
}

impl AppConfig {
    pub fn from_env() -> Self {
        Self {
            port: env::var("PORT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(3000),
            google_project_id: env::var("GOOGLE_PROJECT_ID").unwrap_or_default(),
            language_code: env::var("DIALOGFLOW_LANGUAGE_CODE")
                .unwrap_or_else(|_| "en-US".to_string()),
            google_client_email: env::var("GOOGLE_CLIENT_EMAIL").unwrap_or_default(),
            // Keys pasted into .env files usually carry escaped newlines.
            google_private_key: env::var("GOOGLE_PRIVATE_KEY")
                .unwrap_or_default()
                .replace("\\n", "\n"),
            google_calendar_id: env::var("GOOGLE_CALENDAR_ID")
                .unwrap_or_else(|_| "primary".to_string()),
            gemini_api_key: env::var("GEMINI_API_KEY").unwrap_or_default(),
            gemini_model: env::var("GEMINI_MODEL")
                .unwrap_or_else(|_| "gemini-1.5-flash".to_string()),
            smtp_host: env::var("SMTP_HOST").unwrap_or_else(|_| "smtp.gmail.com".to_string()),
            service_email: env::var("SERVICE_EMAIL").unwrap_or_default(),
            mail_password: env::var("MAIL_PASSWORD").unwrap_or_default(),
            business_email: env::var("BUSINESS_EMAIL").unwrap_or_default(),
            instagram_access_token: env::var("INSTAGRAM_ACCESS_TOKEN").unwrap_or_default(),
            instagram_verify_token: env::var("INSTAGRAM_VERIFY_TOKEN").unwrap_or_default(),
            twilio_account_sid: env::var("TWILIO_SID").unwrap_or_default(),
            twilio_auth_token: env::var("TWILIO_AUTH").unwrap_or_default(),
            twilio_whatsapp_number: env::var("TWILIO_WHATSAPP_NUMBER").unwrap_or_default(),
            upstream_timeout_secs: env::var("UPSTREAM_TIMEOUT_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(30),
        }
    }

    pub fn upstream_timeout(&self) -> Duration {
        Duration::from_secs(self.upstream_timeout_secs)
    }
}
