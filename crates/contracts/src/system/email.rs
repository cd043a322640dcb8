use serde::{Deserialize, Serialize};

use crate::shared::validation::{is_valid_email, require_non_empty};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SendEmailRequest {
    pub to: Vec<String>,
    pub subject: String,
    pub body: String,
    #[serde(default)]
    pub is_html: bool,
}

impl SendEmailRequest {
    pub fn validate(&self) -> Result<(), String> {
        if self.to.is_empty() {
            return Err("At least one recipient is required".into());
        }
        if let Some(bad) = self.to.iter().find(|addr| !is_valid_email(addr)) {
            return Err(format!("Invalid recipient: {}", bad));
        }
        require_non_empty(&self.subject, "Subject")?;
        require_non_empty(&self.body, "Body")?;
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EmailStatus {
    /// No relay configured; stored only
    Queued,
    Sent,
    Failed,
}

impl EmailStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            EmailStatus::Queued => "queued",
            EmailStatus::Sent => "sent",
            EmailStatus::Failed => "failed",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SendEmailResponse {
    pub id: String,
    pub status: EmailStatus,
    pub error: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate() {
        let mut req = SendEmailRequest {
            to: vec!["owner@hub.in".into()],
            subject: "Stock low".into(),
            body: "Refill 20L jars".into(),
            is_html: false,
        };
        assert!(req.validate().is_ok());
        req.to.push("broken".into());
        assert_eq!(req.validate(), Err("Invalid recipient: broken".to_string()));
    }
}
