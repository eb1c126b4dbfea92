use std::sync::Arc;

use anyhow::Context;
use tracing_subscriber::EnvFilter;

use relaybot::config::AppConfig;
use relaybot::handlers;
use relaybot::services::ai::dialogflow::DialogflowSessionClient;
use relaybot::services::ai::gemini::GeminiProvider;
use relaybot::services::calendar::google::GoogleCalendarProvider;
use relaybot::services::mail::SmtpMailer;
use relaybot::services::messaging::instagram::InstagramProvider;
use relaybot::services::messaging::twilio::TwilioWhatsAppProvider;
use relaybot::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let config = AppConfig::from_env();

    if config.google_project_id.is_empty() {
        tracing::warn!("GOOGLE_PROJECT_ID not set, channel routes will fail to reach Dialogflow");
    }
    if config.gemini_api_key.is_empty() {
        tracing::warn!("GEMINI_API_KEY not set, the general intent will fail");
    }

    let http = reqwest::Client::builder()
        .timeout(config.upstream_timeout())
        .build()
        .context("failed to build HTTP client")?;

    let calendar = GoogleCalendarProvider::new(
        config.google_client_email.clone(),
        config.google_private_key.clone(),
        config.google_calendar_id.clone(),
        http.clone(),
    );
    let session = DialogflowSessionClient::new(
        config.google_project_id.clone(),
        config.language_code.clone(),
        config.google_client_email.clone(),
        config.google_private_key.clone(),
        http.clone(),
    );
    tracing::info!(model = %config.gemini_model, "using Gemini text generator");
    let generator =
        GeminiProvider::new(config.gemini_api_key.clone(), config.gemini_model.clone(), http.clone());

    let sender = if config.business_email.is_empty() {
        config.service_email.clone()
    } else {
        config.business_email.clone()
    };
    let mailer = SmtpMailer::new(
        &config.smtp_host,
        config.service_email.clone(),
        config.mail_password.clone(),
        sender,
        config.upstream_timeout(),
    )?;

    let instagram = InstagramProvider::new(config.instagram_access_token.clone(), http.clone());
    let whatsapp = TwilioWhatsAppProvider::new(
        config.twilio_account_sid.clone(),
        config.twilio_auth_token.clone(),
        config.twilio_whatsapp_number.clone(),
        http,
    );

    let state = Arc::new(AppState {
        config: config.clone(),
        calendar: Box::new(calendar),
        generator: Box::new(generator),
        session: Box::new(session),
        mailer: Box::new(mailer),
        instagram: Box::new(instagram),
        whatsapp: Box::new(whatsapp),
    });

    let app = handlers::router(state);

    let addr = format!("0.0.0.0:{}", config.port);
    tracing::info!("starting server on {addr}");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("HTTP server error")?;

    tracing::info!("server stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to listen for Ctrl-C");
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("shutdown signal received, closing http server");
}
