use anyhow::Result;
use contracts::system::email::{EmailStatus, SendEmailRequest, SendEmailResponse};

use super::relay::{EmailRelay, HttpRelay, OutgoingEmail};
use super::repository;
use crate::shared::api_error::bad_request;
use crate::shared::config::get_config;

/// Hands the message to the relay, if any, and reports the outcome
pub async fn deliver(
    relay: Option<&dyn EmailRelay>,
    from: &str,
    request: &SendEmailRequest,
) -> (EmailStatus, Option<String>) {
    let Some(relay) = relay else {
        return (EmailStatus::Queued, None);
    };
    let email = OutgoingEmail {
        from,
        to: &request.to,
        subject: &request.subject,
        body: &request.body,
        is_html: request.is_html,
    };
    match relay.send(&email).await {
        Ok(()) => (EmailStatus::Sent, None),
        Err(e) => (EmailStatus::Failed, Some(e.to_string())),
    }
}

pub async fn send(request: SendEmailRequest, sent_by: &str) -> Result<SendEmailResponse> {
    request.validate().map_err(bad_request)?;

    let config = &get_config().email;
    let relay = match config.relay_url() {
        Some(url) => Some(HttpRelay::new(url, config.timeout_secs)?),
        None => None,
    };

    let (status, error) = deliver(
        relay.as_ref().map(|r| r as &dyn EmailRelay),
        &config.from,
        &request,
    )
    .await;

    let id = uuid::Uuid::new_v4().to_string();
    repository::insert(&id, &request, status, error.as_deref(), sent_by).await?;

    match status {
        EmailStatus::Failed => tracing::warn!(
            "Email '{}' to {} failed: {}",
            request.subject,
            request.to.join(", "),
            error.as_deref().unwrap_or_default()
        ),
        _ => tracing::info!(
            "Email '{}' to {} {}",
            request.subject,
            request.to.join(", "),
            status.as_str()
        ),
    }

    Ok(SendEmailResponse { id, status, error })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::system::email::relay::RelayError;
    use async_trait::async_trait;
    use std::sync::Mutex;

    struct RecordingRelay {
        fail: bool,
        seen: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl EmailRelay for RecordingRelay {
        async fn send(&self, email: &OutgoingEmail<'_>) -> Result<(), RelayError> {
            self.seen.lock().unwrap().push(format!("{} -> {}", email.from, email.subject));
            if self.fail {
                Err(RelayError::Rejected {
                    status: 502,
                    body: "bad gateway".into(),
                })
            } else {
                Ok(())
            }
        }
    }

    fn request() -> SendEmailRequest {
        SendEmailRequest {
            to: vec!["owner@hub.in".into()],
            subject: "Low stock".into(),
            body: "Refill".into(),
            is_html: false,
        }
    }

    #[tokio::test]
    async fn test_without_relay_message_is_queued() {
        let (status, error) = deliver(None, "no-reply@aquaflow.in", &request()).await;
        assert_eq!(status, EmailStatus::Queued);
        assert!(error.is_none());
    }

    #[tokio::test]
    async fn test_relay_outcomes() {
        let ok = RecordingRelay {
            fail: false,
            seen: Mutex::new(Vec::new()),
        };
        let (status, _) = deliver(Some(&ok), "no-reply@aquaflow.in", &request()).await;
        assert_eq!(status, EmailStatus::Sent);
        assert_eq!(
            ok.seen.lock().unwrap().as_slice(),
            ["no-reply@aquaflow.in -> Low stock"]
        );

        let broken = RecordingRelay {
            fail: true,
            seen: Mutex::new(Vec::new()),
        };
        let (status, error) = deliver(Some(&broken), "x@y.in", &request()).await;
        assert_eq!(status, EmailStatus::Failed);
        assert!(error.unwrap().contains("502"));
    }
}
