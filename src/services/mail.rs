use std::time::Duration;

use anyhow::Context;
use async_trait::async_trait;
use lettre::message::header::ContentType;
use lettre::message::Mailbox;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};

#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send_mail(&self, to: &str, subject: &str, body: &str) -> anyhow::Result<()>;
}

/// Authenticated SMTP relay over implicit TLS.
pub struct SmtpMailer {
    from: String,
    transport: AsyncSmtpTransport<Tokio1Executor>,
}

impl SmtpMailer {
    pub fn new(
        host: &str,
        username: String,
        password: String,
        from: String,
        timeout: Duration,
    ) -> anyhow::Result<Self> {
        let transport = AsyncSmtpTransport::<Tokio1Executor>::relay(host)
            .with_context(|| format!("failed to configure SMTP relay {host}"))?
            .credentials(Credentials::new(username, password))
            .timeout(Some(timeout))
            .build();

        Ok(Self { from, transport })
    }
}

fn build_message(from: &str, to: &str, subject: &str, body: &str) -> anyhow::Result<Message> {
    let from: Mailbox = from
        .parse()
        .with_context(|| format!("invalid sender address {from:?}"))?;
    let to: Mailbox = to
        .parse()
        .with_context(|| format!("invalid recipient address {to:?}"))?;

    Message::builder()
        .from(from)
        .to(to)
        .subject(subject)
        .header(ContentType::TEXT_PLAIN)
        .body(body.to_string())
        .context("failed to build email")
}

#[async_trait]
impl Mailer for SmtpMailer {
    async fn send_mail(&self, to: &str, subject: &str, body: &str) -> anyhow::Result<()> {
        let message = build_message(&self.from, to, subject, body)?;

        let response = self
            .transport
            .send(message)
            .await
            .context("failed to send email over SMTP")?;

        tracing::debug!(code = %response.code(), "SMTP accepted message");
        Ok(())
    }
}
