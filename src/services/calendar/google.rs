use anyhow::Context;
use async_trait::async_trait;

use super::CalendarProvider;
use crate::models::{CalendarEvent, CreatedEvent};
use crate::services::google_auth::{ServiceAccount, CALENDAR_SCOPE};

const CALENDAR_API: &str = "https://www.googleapis.com/calendar/v3";

pub struct GoogleCalendarProvider {
    auth: ServiceAccount,
    calendar_id: String,
    client: reqwest::Client,
}

impl GoogleCalendarProvider {
    pub fn new(
        client_email: String,
        private_key: String,
        calendar_id: String,
        client: reqwest::Client,
    ) -> Self {
        Self {
            auth: ServiceAccount::new(client_email, private_key, CALENDAR_SCOPE, client.clone()),
            calendar_id,
            client,
        }
    }

    fn events_url(&self) -> anyhow::Result<reqwest::Url> {
        let mut url = reqwest::Url::parse(CALENDAR_API)?;
        url.path_segments_mut()
            .map_err(|_| anyhow::anyhow!("calendar API base URL cannot have a path"))?
            .extend(["calendars", self.calendar_id.as_str(), "events"]);
        Ok(url)
    }
}

#[async_trait]
impl CalendarProvider for GoogleCalendarProvider {
    async fn insert_event(&self, event: &CalendarEvent) -> anyhow::Result<CreatedEvent> {
        let token = self.auth.access_token().await?;

        let resp = self
            .client
            .post(self.events_url()?)
            .bearer_auth(token)
            .json(event)
            .send()
            .await
            .context("failed to call Google Calendar API")?;

        let status = resp.status();
        let data: serde_json::Value = resp
            .json()
            .await
            .context("failed to parse Google Calendar response")?;

        if !status.is_success() {
            anyhow::bail!("Google Calendar API error ({}): {}", status, data);
        }

        serde_json::from_value(data).context("unexpected Google Calendar response shape")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_events_url_encodes_calendar_id() {
        let provider = GoogleCalendarProvider::new(
            String::new(),
            String::new(),
            "team@group.calendar.google.com".to_string(),
            reqwest::Client::new(),
        );
        let url = provider.events_url().unwrap();
        assert_eq!(
            url.as_str(),
            "https://www.googleapis.com/calendar/v3/calendars/team@group.calendar.google.com/events"
        );
    }
}
