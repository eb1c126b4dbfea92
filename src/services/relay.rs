use crate::errors::AppError;
use crate::models::InboundMessage;
use crate::services::ai::SessionClient;
use crate::services::messaging::MessagingProvider;

/// Runs a channel message through the AI session and returns the reply text.
pub async fn converse(
    session: &dyn SessionClient,
    message: &InboundMessage,
) -> Result<String, AppError> {
    session
        .detect_intent(&message.text, &message.sender_id, &message.raw)
        .await
        .map_err(|e| {
            tracing::error!(error = %e, sender = %message.sender_id, "detect intent failed");
            AppError::Session(e.to_string())
        })
}

/// Converse, then send the reply back to the sender on the same channel.
pub async fn relay_reply(
    session: &dyn SessionClient,
    messenger: &dyn MessagingProvider,
    message: &InboundMessage,
) -> Result<(), AppError> {
    let reply = converse(session, message).await?;

    messenger
        .send_message(&message.sender_id, &reply)
        .await
        .map_err(|e| {
            tracing::error!(error = %e, to = %message.sender_id, "failed to send reply");
            AppError::Messaging(e.to_string())
        })
}
