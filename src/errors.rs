use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

pub const INVALID_VERIFY_TOKEN: &str = "Invalid verification token";

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("missing or invalid field: {0}")]
    MissingField(String),

    #[error("failed to book appointment: {0}")]
    Calendar(String),

    #[error("AI provider error: {0}")]
    Ai(String),

    #[error("AI session error: {0}")]
    Session(String),

    #[error("messaging error: {0}")]
    Messaging(String),

    #[error("mail error: {0}")]
    Mail(String),

    #[error("verification token mismatch")]
    VerificationMismatch,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match &self {
            AppError::MissingField(_) => StatusCode::BAD_REQUEST,
            AppError::Calendar(_) => StatusCode::BAD_GATEWAY,
            AppError::Ai(_) => StatusCode::BAD_GATEWAY,
            AppError::Session(_) => StatusCode::BAD_GATEWAY,
            AppError::Messaging(_) => StatusCode::BAD_GATEWAY,
            AppError::Mail(_) => StatusCode::BAD_GATEWAY,
            AppError::VerificationMismatch => {
                return (StatusCode::FORBIDDEN, INVALID_VERIFY_TOKEN).into_response();
            }
        };

        let body = serde_json::json!({ "error": self.to_string() });
        (status, axum::Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_upstream_failures_are_bad_gateway() {
        for err in [
            AppError::Calendar("boom".into()),
            AppError::Ai("boom".into()),
            AppError::Session("boom".into()),
            AppError::Messaging("boom".into()),
            AppError::Mail("boom".into()),
        ] {
            assert_eq!(err.into_response().status(), StatusCode::BAD_GATEWAY);
        }
    }

    #[test]
    fn test_missing_field_is_bad_request() {
        let res = AppError::MissingField("date".into()).into_response();
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_verification_mismatch_is_forbidden() {
        let res = AppError::VerificationMismatch.into_response();
        assert_eq!(res.status(), StatusCode::FORBIDDEN);
    }
}
