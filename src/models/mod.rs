pub mod booking;
pub mod channel;
pub mod fulfillment;
pub mod intent;

pub use booking::{
    BookingSlots, CalendarEvent, CreatedEvent, EventTime, ReminderMethod, ReminderOverride,
    Reminders,
};
pub use channel::{instagram_messages, EmailWebhook, InboundMessage, TwilioWebhookForm};
pub use fulfillment::{ConversationTurn, FollowupEventInput, FulfillmentReply, WebhookRequest};
pub use intent::Intent;
