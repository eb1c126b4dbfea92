//! OAuth2 access tokens for a Google service account (JWT bearer grant).

use anyhow::Context;
use chrono::Utc;
use jsonwebtoken::{Algorithm, EncodingKey, Header};
use serde::{Deserialize, Serialize};

const TOKEN_URL: &str = "https://oauth2.googleapis.com/token";
const JWT_BEARER_GRANT: &str = "urn:ietf:params:oauth:grant-type:jwt-bearer";
const ASSERTION_LIFETIME_SECS: i64 = 3600;

pub const CALENDAR_SCOPE: &str = "https://www.googleapis.com/auth/calendar";
pub const DIALOGFLOW_SCOPE: &str = "https://www.googleapis.com/auth/dialogflow";

#[derive(Debug, Serialize, PartialEq)]
struct Claims<'a> {
    iss: &'a str,
    scope: &'a str,
    aud: &'a str,
    iat: i64,
    exp: i64,
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
}

pub struct ServiceAccount {
    client_email: String,
    private_key: String,
    scope: &'static str,
    client: reqwest::Client,
}

impl ServiceAccount {
    pub fn new(
        client_email: String,
        private_key: String,
        scope: &'static str,
        client: reqwest::Client,
    ) -> Self {
        Self {
            client_email,
            private_key,
            scope,
            client,
        }
    }

    fn claims(&self, now: i64) -> Claims<'_> {
        Claims {
            iss: &self.client_email,
            scope: self.scope,
            aud: TOKEN_URL,
            iat: now,
            exp: now + ASSERTION_LIFETIME_SECS,
        }
    }

    fn assertion(&self, now: i64) -> anyhow::Result<String> {
        let key = EncodingKey::from_rsa_pem(self.private_key.as_bytes())
            .context("invalid service account private key")?;
        jsonwebtoken::encode(&Header::new(Algorithm::RS256), &self.claims(now), &key)
            .context("failed to sign service account assertion")
    }

    /// Exchanges a freshly signed assertion for an access token. Tokens are
    /// not cached; every call mints a new one.
    pub async fn access_token(&self) -> anyhow::Result<String> {
        let assertion = self.assertion(Utc::now().timestamp())?;

        let resp = self
            .client
            .post(TOKEN_URL)
            .form(&[("grant_type", JWT_BEARER_GRANT), ("assertion", assertion.as_str())])
            .send()
            .await
            .context("failed to call Google token endpoint")?
            .error_for_status()
            .context("Google token endpoint returned error")?;

        let token: TokenResponse = resp
            .json()
            .await
            .context("failed to parse Google token response")?;

        Ok(token.access_token)
    }
}
