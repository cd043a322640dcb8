use serde::{Deserialize, Serialize};

use crate::domain::common::{AggregateRoot, BaseAggregate, EntityMetadata};
use crate::shared::validation::{is_valid_email, is_valid_phone, require_non_empty};

crate::uuid_aggregate_id!(
    /// Contact submission identifier
    ContactSubmissionId
);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContactStatus {
    New,
    Read,
    Resolved,
}

impl ContactStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ContactStatus::New => "new",
            ContactStatus::Read => "read",
            ContactStatus::Resolved => "resolved",
        }
    }

    pub fn parse(s: &str) -> Result<Self, String> {
        match s {
            "new" => Ok(ContactStatus::New),
            "read" => Ok(ContactStatus::Read),
            "resolved" => Ok(ContactStatus::Resolved),
            other => Err(format!("Unknown contact status: {}", other)),
        }
    }
}

/// Message from the public contact form. `base.description` is the subject.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContactSubmission {
    #[serde(flatten)]
    pub base: BaseAggregate<ContactSubmissionId>,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub message: String,
    pub status: ContactStatus,
}

impl ContactSubmission {
    pub fn new_for_insert(dto: &ContactSubmissionDto) -> Self {
        let id = ContactSubmissionId::new_v4();
        let code = format!("CNT-{}", &id.value().simple().to_string()[..8]);
        Self {
            base: BaseAggregate::new(id, code, dto.subject.clone()),
            name: dto.name.trim().to_string(),
            email: dto.email.trim().to_string(),
            phone: dto.phone.clone().filter(|p| !p.trim().is_empty()),
            message: dto.message.clone(),
            status: ContactStatus::New,
        }
    }

    pub fn validate(&self) -> Result<(), String> {
        require_non_empty(&self.name, "Name")?;
        require_non_empty(&self.base.description, "Subject")?;
        require_non_empty(&self.message, "Message")?;
        if !is_valid_email(&self.email) {
            return Err("Please enter a valid email address".into());
        }
        if let Some(phone) = &self.phone {
            if !is_valid_phone(phone) {
                return Err("Phone number must be 10 digits".into());
            }
        }
        Ok(())
    }

    pub fn before_write(&mut self) {
        self.base.touch();
    }
}

impl AggregateRoot for ContactSubmission {
    type Id = ContactSubmissionId;

    fn id(&self) -> Self::Id {
        self.base.id
    }

    fn code(&self) -> &str {
        &self.base.code
    }

    fn description(&self) -> &str {
        &self.base.description
    }

    fn metadata(&self) -> &EntityMetadata {
        &self.base.metadata
    }

    fn metadata_mut(&mut self) -> &mut EntityMetadata {
        &mut self.base.metadata
    }

    fn aggregate_index() -> &'static str {
        "a008"
    }

    fn collection_name() -> &'static str {
        "contact_submission"
    }

    fn element_name() -> &'static str {
        "Contact submission"
    }

    fn list_name() -> &'static str {
        "Contact submissions"
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContactSubmissionDto {
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub subject: String,
    pub message: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateContactStatusRequest {
    pub status: ContactStatus,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dto() -> ContactSubmissionDto {
        ContactSubmissionDto {
            name: "Asha".into(),
            email: "asha@example.com".into(),
            phone: Some("".into()),
            subject: "Late delivery".into(),
            message: "My order arrived two hours late".into(),
        }
    }

    #[test]
    fn test_new_submission() {
        let c = ContactSubmission::new_for_insert(&dto());
        assert_eq!(c.status, ContactStatus::New);
        assert_eq!(c.phone, None);
        assert!(c.validate().is_ok());
    }

    #[test]
    fn test_rejects_bad_contact_details() {
        let mut d = dto();
        d.email = "asha.example.com".into();
        assert!(ContactSubmission::new_for_insert(&d).validate().is_err());

        let mut d = dto();
        d.phone = Some("12345".into());
        assert!(ContactSubmission::new_for_insert(&d).validate().is_err());
    }
}
