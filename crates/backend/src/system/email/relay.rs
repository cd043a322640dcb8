use async_trait::async_trait;
use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RelayError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("Relay rejected the message ({status}): {body}")]
    Rejected { status: u16, body: String },
}

/// Outgoing message as posted to the relay
#[derive(Debug, Clone, Serialize)]
pub struct OutgoingEmail<'a> {
    pub from: &'a str,
    pub to: &'a [String],
    pub subject: &'a str,
    pub body: &'a str,
    pub is_html: bool,
}

/// Anything that can hand a message over for delivery
#[async_trait]
pub trait EmailRelay: Send + Sync {
    async fn send(&self, email: &OutgoingEmail<'_>) -> Result<(), RelayError>;
}

/// Posts messages as JSON to an HTTP mail relay
pub struct HttpRelay {
    client: reqwest::Client,
    url: String,
}

impl HttpRelay {
    pub fn new(url: &str, timeout_secs: u64) -> Result<Self, RelayError> {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(timeout_secs))
            .build()
            .map_err(|e| RelayError::Network(e.to_string()))?;
        Ok(Self {
            client,
            url: url.to_string(),
        })
    }
}

#[async_trait]
impl EmailRelay for HttpRelay {
    async fn send(&self, email: &OutgoingEmail<'_>) -> Result<(), RelayError> {
        let response = self
            .client
            .post(&self.url)
            .json(email)
            .send()
            .await
            .map_err(|e| RelayError::Network(e.to_string()))?;

        let status = response.status();
        if status.is_success() {
            return Ok(());
        }
        let body = response.text().await.unwrap_or_default();
        Err(RelayError::Rejected {
            status: status.as_u16(),
            body: body.chars().take(500).collect(),
        })
    }
}
