//! Outbound SMS delivery.
//!
//! [`SmsGateway`] is the seam the dispatcher sends through. [`TwilioGateway`] is the production
//! implementation; it posts to the Twilio Messages endpoint with the credentials and sender
//! number from [`SmsConfig`].

use crate::config::SmsConfig;
use crate::{CoreError, CoreResult};
use async_trait::async_trait;
use serde::Deserialize;

/// Identifier returned by the gateway for an accepted message.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SmsReceipt {
    pub sid: String,
}

#[derive(Debug, thiserror::Error)]
pub enum SmsError {
    #[error("invalid destination number: {0:?}")]
    InvalidDestination(String),
    #[error("SMS transport error: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("SMS gateway rejected message (status {status}): {message}")]
    Rejected { status: u16, message: String },
}

/// Sends a single text message.
#[async_trait]
pub trait SmsGateway: Send + Sync {
    async fn send(&self, to: &str, body: &str) -> Result<SmsReceipt, SmsError>;
}

#[derive(Deserialize)]
struct TwilioMessage {
    sid: String,
}

#[derive(Deserialize)]
struct TwilioErrorBody {
    message: String,
    #[serde(default)]
    code: Option<i64>,
}

/// Twilio Programmable Messaging client.
pub struct TwilioGateway {
    client: reqwest::Client,
    cfg: SmsConfig,
}

impl TwilioGateway {
    /// Builds the HTTP client with the configured per-call timeout.
    pub fn new(cfg: SmsConfig) -> CoreResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(cfg.timeout())
            .build()
            .map_err(CoreError::SmsClient)?;

        Ok(Self { client, cfg })
    }

    fn messages_url(&self) -> String {
        format!(
            "{}/2010-04-01/Accounts/{}/Messages.json",
            self.cfg.api_base(),
            self.cfg.account_sid()
        )
    }
}

#[async_trait]
impl SmsGateway for TwilioGateway {
    async fn send(&self, to: &str, body: &str) -> Result<SmsReceipt, SmsError> {
        let to = to.trim();
        if to.is_empty() {
            return Err(SmsError::InvalidDestination(to.to_string()));
        }

        let params = [("To", to), ("From", self.cfg.from_number()), ("Body", body)];
        let response = self
            .client
            .post(self.messages_url())
            .basic_auth(self.cfg.account_sid(), Some(self.cfg.auth_token()))
            .form(&params)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = match response.json::<TwilioErrorBody>().await {
                Ok(err) => match err.code {
                    Some(code) => format!("{} (code {})", err.message, code),
                    None => err.message,
                },
                Err(_) => status
                    .canonical_reason()
                    .unwrap_or("unknown error")
                    .to_string(),
            };
            return Err(SmsError::Rejected {
                status: status.as_u16(),
                message,
            });
        }

        let message: TwilioMessage = response.json().await?;
        tracing::debug!("SMS accepted by gateway: {}", message.sid);
        Ok(SmsReceipt { sid: message.sid })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn gateway() -> TwilioGateway {
        let cfg = SmsConfig::new(
            "AC0001",
            "token",
            "+15005550006",
            Some("http://127.0.0.1:9".into()),
            Duration::from_secs(1),
        )
        .unwrap();
        TwilioGateway::new(cfg).unwrap()
    }

    #[test]
    fn test_messages_url() {
        assert_eq!(
            gateway().messages_url(),
            "http://127.0.0.1:9/2010-04-01/Accounts/AC0001/Messages.json"
        );
    }

    #[tokio::test]
    async fn test_blank_destination_is_rejected_without_network() {
        let err = gateway().send("  ", "hello").await.unwrap_err();
        assert!(matches!(err, SmsError::InvalidDestination(_)));
    }

    #[test]
    fn test_error_body_parses() {
        let body: TwilioErrorBody = serde_json::from_str(
            r#"{"code": 21211, "message": "The 'To' number is not valid.", "status": 400}"#,
        )
        .unwrap();
        assert_eq!(body.code, Some(21211));
    }
}
