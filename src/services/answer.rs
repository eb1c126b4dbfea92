use crate::errors::AppError;
use crate::models::FulfillmentReply;
use crate::services::ai::TextGenerator;

/// Passes the user's utterance to the text generator and returns its output
/// untouched.
pub async fn generate_answer(
    generator: &dyn TextGenerator,
    query: &str,
) -> Result<FulfillmentReply, AppError> {
    let text = generator.generate(query).await.map_err(|e| {
        tracing::error!(error = %e, "text generation failed");
        AppError::Ai(e.to_string())
    })?;

    Ok(FulfillmentReply::text(text))
}
