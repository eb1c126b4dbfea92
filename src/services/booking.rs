use chrono::{DateTime, FixedOffset, NaiveDate, NaiveTime, Offset, Utc};

use crate::errors::AppError;
use crate::models::intent::{ASK_FOR_EMAIL, ASK_FOR_NAME};
use crate::models::{BookingSlots, FulfillmentReply};
use crate::services::calendar::{build_event, CalendarProvider};

/// Where a booking conversation stands, derived from the slots present in
/// the current turn. Nothing about it is stored between turns.
#[derive(Debug, Clone, PartialEq)]
pub enum BookingStep<'a> {
    NeedEmail,
    NeedName,
    Ready { email: &'a str, name: &'a str },
}

pub fn next_step(slots: &BookingSlots) -> BookingStep<'_> {
    match (slots.email.as_deref(), slots.name.as_deref()) {
        (None, _) => BookingStep::NeedEmail,
        (Some(_), None) => BookingStep::NeedName,
        (Some(email), Some(name)) => BookingStep::Ready { email, name },
    }
}

/// One turn of the appointment flow. Asks for the email, then the name, and
/// once everything is present writes the calendar event exactly once.
pub async fn handle_booking(
    calendar: &dyn CalendarProvider,
    language_code: &str,
    slots: &BookingSlots,
) -> Result<FulfillmentReply, AppError> {
    let (email, name) = match next_step(slots) {
        BookingStep::NeedEmail => {
            tracing::info!("booking: requesting email");
            return Ok(FulfillmentReply::followup(
                ASK_FOR_EMAIL,
                language_code,
                slots.forward(false),
            ));
        }
        BookingStep::NeedName => {
            tracing::info!("booking: requesting name");
            return Ok(FulfillmentReply::followup(
                ASK_FOR_NAME,
                language_code,
                slots.forward(true),
            ));
        }
        BookingStep::Ready { email, name } => (email, name),
    };

    let start = parse_start(slots.date.as_deref(), slots.time.as_deref())?;
    let event = build_event(name, email, start);

    tracing::info!(
        start = %event.start.date_time,
        end = %event.end.date_time,
        "booking: inserting calendar event"
    );

    let created = calendar.insert_event(&event).await.map_err(|e| {
        tracing::error!(error = %e, "failed to book appointment");
        AppError::Calendar(e.to_string())
    })?;

    tracing::info!(link = %created.html_link, "appointment booked");

    let summary = if created.summary.is_empty() {
        event.summary.as_str()
    } else {
        created.summary.as_str()
    };

    Ok(FulfillmentReply::text(format!(
        "Appointment booked successfully!\n\n\
         Summary: {summary}\n\
         Start Time: {}\n\
         End Time: {}\n\n\
         Join the meeting via the link.\n\
         Link: {}",
        event.start.date_time.to_rfc3339(),
        event.end.date_time.to_rfc3339(),
        created.html_link,
    )))
}

/// Combines Dialogflow's `date` and `time` parameters into the appointment
/// start. Either may be a plain value (`2024-06-01`, `14:00`) or a full
/// RFC 3339 timestamp; an explicit offset wins over UTC.
pub fn parse_start(
    date: Option<&str>,
    time: Option<&str>,
) -> Result<DateTime<FixedOffset>, AppError> {
    let date = date.ok_or_else(|| AppError::MissingField("date".to_string()))?;
    let (day, date_clock, date_offset) = parse_date(date)?;

    let (clock, offset) = match time {
        Some(time) => {
            let (clock, time_offset) = parse_time(time)?;
            (clock, time_offset.or(date_offset))
        }
        None => (
            date_clock.ok_or_else(|| AppError::MissingField("time".to_string()))?,
            date_offset,
        ),
    };

    let offset = offset.unwrap_or_else(|| Utc.fix());
    day.and_time(clock)
        .and_local_timezone(offset)
        .single()
        .ok_or_else(|| AppError::MissingField(format!("date: {date} is not a valid instant")))
}

type ParsedDate = (NaiveDate, Option<NaiveTime>, Option<FixedOffset>);

fn parse_date(value: &str) -> Result<ParsedDate, AppError> {
    if let Ok(day) = NaiveDate::parse_from_str(value, "%Y-%m-%d") {
        return Ok((day, None, None));
    }
    DateTime::parse_from_rfc3339(value)
        .map(|dt| (dt.date_naive(), Some(dt.time()), Some(*dt.offset())))
        .map_err(|_| AppError::MissingField(format!("date: unparsable value {value:?}")))
}

fn parse_time(value: &str) -> Result<(NaiveTime, Option<FixedOffset>), AppError> {
    for fmt in ["%H:%M:%S", "%H:%M"] {
        if let Ok(clock) = NaiveTime::parse_from_str(value, fmt) {
            return Ok((clock, None));
        }
    }
    DateTime::parse_from_rfc3339(value)
        .map(|dt| (dt.time(), Some(*dt.offset())))
        .map_err(|_| AppError::MissingField(format!("time: unparsable value {value:?}")))
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use async_trait::async_trait;
    use chrono::Duration;
    use serde_json::json;

    use super::*;
    use crate::models::{CalendarEvent, CreatedEvent};

    struct MockCalendar {
        inserted: Arc<Mutex<Vec<CalendarEvent>>>,
        fail: bool,
    }

    impl MockCalendar {
        fn new(fail: bool) -> Self {
            Self {
                inserted: Arc::new(Mutex::new(vec![])),
                fail,
            }
        }
    }

    #[async_trait]
    impl CalendarProvider for MockCalendar {
        async fn insert_event(&self, event: &CalendarEvent) -> anyhow::Result<CreatedEvent> {
            self.inserted.lock().unwrap().push(event.clone());
            if self.fail {
                anyhow::bail!("calendar unavailable");
            }
            Ok(CreatedEvent {
                summary: event.summary.clone(),
                html_link: "https://calendar.example/L".to_string(),
            })
        }
    }

    fn slots(date: &str, time: &str, email: Option<&str>, name: Option<&str>) -> BookingSlots {
        BookingSlots {
            date: Some(date.to_string()),
            time: Some(time.to_string()),
            email: email.map(str::to_string),
            name: name.map(str::to_string),
        }
    }

    #[tokio::test]
    async fn test_missing_email_asks_for_email_even_with_name() {
        let calendar = MockCalendar::new(false);
        for name in [None, Some("Jo")] {
            let reply = handle_booking(&calendar, "en-US", &slots("2024-06-01", "14:00", None, name))
                .await
                .unwrap();
            assert_eq!(
                serde_json::to_value(&reply).unwrap(),
                json!({
                    "followupEventInput": {
                        "name": "ask_for_email",
                        "languageCode": "en-US",
                        "parameters": { "date": "2024-06-01", "time": "14:00" }
                    }
                })
            );
        }
        assert!(calendar.inserted.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_missing_name_asks_for_name() {
        let calendar = MockCalendar::new(false);
        let reply = handle_booking(
            &calendar,
            "en-US",
            &slots("2024-06-01", "14:00", Some("a@b.com"), None),
        )
        .await
        .unwrap();
        match reply {
            FulfillmentReply::Followup { followup_event_input } => {
                assert_eq!(followup_event_input.name, "ask_for_name");
                assert_eq!(
                    serde_json::Value::Object(followup_event_input.parameters),
                    json!({ "date": "2024-06-01", "time": "14:00", "email": "a@b.com" })
                );
            }
            other => panic!("expected follow-up, got {other:?}"),
        }
        assert!(calendar.inserted.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_complete_slots_write_once() {
        let calendar = MockCalendar::new(false);
        let reply = handle_booking(
            &calendar,
            "en-US",
            &slots("2024-06-01", "14:00", Some("a@b.com"), Some("Jo")),
        )
        .await
        .unwrap();

        let inserted = calendar.inserted.lock().unwrap();
        assert_eq!(inserted.len(), 1);
        assert_eq!(
            inserted[0].end.date_time - inserted[0].start.date_time,
            Duration::hours(1)
        );

        match reply {
            FulfillmentReply::Text { fulfillment_text } => {
                assert!(fulfillment_text.contains("Consultation appointment with Jo"));
                assert!(fulfillment_text.contains("https://calendar.example/L"));
                assert!(fulfillment_text.contains("2024-06-01T14:00:00+00:00"));
                assert!(fulfillment_text.contains("2024-06-01T15:00:00+00:00"));
            }
            other => panic!("expected text, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_calendar_failure_is_error() {
        let calendar = MockCalendar::new(true);
        let err = handle_booking(
            &calendar,
            "en-US",
            &slots("2024-06-01", "14:00", Some("a@b.com"), Some("Jo")),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, AppError::Calendar(_)));
        assert_eq!(calendar.inserted.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_unparsable_date_skips_write() {
        let calendar = MockCalendar::new(false);
        let err = handle_booking(
            &calendar,
            "en-US",
            &slots("next tuesday", "14:00", Some("a@b.com"), Some("Jo")),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, AppError::MissingField(_)));
        assert!(calendar.inserted.lock().unwrap().is_empty());
    }

    #[test]
    fn test_next_step() {
        assert_eq!(next_step(&BookingSlots::default()), BookingStep::NeedEmail);
        let s = slots("2024-06-01", "14:00", Some("a@b.com"), Some("Jo"));
        assert_eq!(
            next_step(&s),
            BookingStep::Ready {
                email: "a@b.com",
                name: "Jo"
            }
        );
    }

    #[test]
    fn test_parse_start_plain() {
        let start = parse_start(Some("2024-06-01"), Some("14:00")).unwrap();
        assert_eq!(start.to_rfc3339(), "2024-06-01T14:00:00+00:00");
        let start = parse_start(Some("2024-06-01"), Some("09:15:30")).unwrap();
        assert_eq!(start.to_rfc3339(), "2024-06-01T09:15:30+00:00");
    }

    #[test]
    fn test_parse_start_dialogflow_encoding() {
        let start = parse_start(
            Some("2024-06-01T12:00:00-04:00"),
            Some("2024-05-30T14:00:00-04:00"),
        )
        .unwrap();
        assert_eq!(start.to_rfc3339(), "2024-06-01T14:00:00-04:00");
    }

    #[test]
    fn test_parse_start_date_offset_applies_to_plain_time() {
        let start = parse_start(Some("2024-06-01T00:00:00+02:00"), Some("10:00")).unwrap();
        assert_eq!(start.to_rfc3339(), "2024-06-01T10:00:00+02:00");
    }

    #[test]
    fn test_parse_start_without_time() {
        let start = parse_start(Some("2024-06-01T16:30:00+00:00"), None).unwrap();
        assert_eq!(start.to_rfc3339(), "2024-06-01T16:30:00+00:00");
        assert!(matches!(
            parse_start(Some("2024-06-01"), None),
            Err(AppError::MissingField(_))
        ));
        assert!(matches!(parse_start(None, Some("14:00")), Err(AppError::MissingField(_))));
    }

    #[test]
    fn test_parse_start_rejects_garbage() {
        assert!(parse_start(Some("2024-13-45"), Some("14:00")).is_err());
        assert!(parse_start(Some("2024-06-01"), Some("2pm")).is_err());
    }
}
