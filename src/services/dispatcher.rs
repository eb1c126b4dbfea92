use crate::errors::AppError;
use crate::models::{BookingSlots, ConversationTurn, FulfillmentReply, Intent};
use crate::services::{answer, booking};
use crate::state::AppState;

pub fn fallback_text(intent_name: &str) -> String {
    format!("I'm not sure how to handle the intent: {intent_name}")
}

/// Routes one Dialogflow turn to its handler. Unknown intents get a plain
/// text reply, not an error.
pub async fn dispatch(
    state: &AppState,
    turn: &ConversationTurn,
) -> Result<FulfillmentReply, AppError> {
    let intent = Intent::from_display_name(&turn.intent_name);

    tracing::info!(intent = %turn.intent_name, routed = ?intent, "dispatching fulfillment");

    match intent {
        Intent::Appointment => {
            let slots = BookingSlots::from_parameters(&turn.parameters);
            booking::handle_booking(state.calendar.as_ref(), &state.config.language_code, &slots)
                .await
        }
        Intent::General => {
            answer::generate_answer(state.generator.as_ref(), &turn.raw_utterance).await
        }
        Intent::Unrecognized(name) => Ok(FulfillmentReply::text(fallback_text(&name))),
    }
}
