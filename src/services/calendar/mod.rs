pub mod google;

use async_trait::async_trait;
use chrono::{DateTime, Duration, FixedOffset};

use crate::models::{
    CalendarEvent, CreatedEvent, EventTime, ReminderMethod, ReminderOverride, Reminders,
};

pub const APPOINTMENT_MINUTES: i64 = 60;

#[async_trait]
pub trait CalendarProvider: Send + Sync {
    async fn insert_event(&self, event: &CalendarEvent) -> anyhow::Result<CreatedEvent>;
}

/// Fixed consultation template: one hour long, email reminder a day ahead,
/// popup half an hour ahead.
pub fn build_event(name: &str, email: &str, start: DateTime<FixedOffset>) -> CalendarEvent {
    let end = start + Duration::minutes(APPOINTMENT_MINUTES);

    CalendarEvent {
        summary: format!("Consultation appointment with {name}"),
        description: format!(
            "Appointment booked via ChatBOT\n\nClient Name: {name}\nClient Email: {email}"
        ),
        start: EventTime { date_time: start },
        end: EventTime { date_time: end },
        reminders: Reminders {
            use_default: false,
            overrides: vec![
                ReminderOverride {
                    method: ReminderMethod::Email,
                    minutes: 24 * 60,
                },
                ReminderOverride {
                    method: ReminderMethod::Popup,
                    minutes: 30,
                },
            ],
        },
    }
}
