use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::common::{AggregateRoot, BaseAggregate, EntityMetadata};
use crate::shared::validation::require_non_empty;
use crate::system::users::UserRole;

crate::uuid_aggregate_id!(
    /// Popup identifier
    PopupId
);

/// Promotional popup shown on app open. `base.description` is the title.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Popup {
    #[serde(flatten)]
    pub base: BaseAggregate<PopupId>,
    pub content: String,
    pub image_url: Option<String>,
    pub cta_label: Option<String>,
    pub cta_url: Option<String>,
    /// `None` shows the popup to everyone
    pub target_role: Option<UserRole>,
    pub starts_at: Option<DateTime<Utc>>,
    pub ends_at: Option<DateTime<Utc>>,
    pub is_active: bool,
}

impl Popup {
    pub fn new_for_insert(dto: &PopupDto) -> Self {
        let id = PopupId::new_v4();
        let code = format!("POP-{}", &id.value().simple().to_string()[..8]);
        let mut item = Self {
            base: BaseAggregate::new(id, code, dto.title.clone()),
            content: String::new(),
            image_url: None,
            cta_label: None,
            cta_url: None,
            target_role: None,
            starts_at: None,
            ends_at: None,
            is_active: true,
        };
        item.update(dto);
        item
    }

    pub fn update(&mut self, dto: &PopupDto) {
        self.base.description = dto.title.clone();
        self.content = dto.content.clone();
        self.image_url = dto.image_url.clone();
        self.cta_label = dto.cta_label.clone();
        self.cta_url = dto.cta_url.clone();
        self.target_role = dto.target_role;
        self.starts_at = dto.starts_at;
        self.ends_at = dto.ends_at;
        self.is_active = dto.is_active;
    }

    pub fn validate(&self) -> Result<(), String> {
        require_non_empty(&self.base.description, "Title")?;
        if self.content.trim().is_empty() && self.image_url.is_none() {
            return Err("Popup needs content or an image".into());
        }
        if self.cta_label.is_some() != self.cta_url.is_some() {
            return Err("Call-to-action needs both a label and a URL".into());
        }
        if let (Some(start), Some(end)) = (self.starts_at, self.ends_at) {
            if end <= start {
                return Err("End date must be after start date".into());
            }
        }
        Ok(())
    }

    pub fn before_write(&mut self) {
        self.base.touch();
    }

    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        matches!(self.ends_at, Some(end) if end < now)
    }

    pub fn is_visible(&self, role: Option<UserRole>, now: DateTime<Utc>) -> bool {
        if !self.is_active || self.base.metadata.is_deleted || self.is_expired(now) {
            return false;
        }
        if matches!(self.starts_at, Some(start) if now < start) {
            return false;
        }
        match self.target_role {
            None => true,
            Some(target) => role == Some(target),
        }
    }
}

impl AggregateRoot for Popup {
    type Id = PopupId;

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
        "a007"
    }

    fn collection_name() -> &'static str {
        "popup"
    }

    fn element_name() -> &'static str {
        "Popup"
    }

    fn list_name() -> &'static str {
        "Popups"
    }
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PopupDto {
    pub id: Option<String>,
    pub title: String,
    #[serde(default)]
    pub content: String,
    pub image_url: Option<String>,
    pub cta_label: Option<String>,
    pub cta_url: Option<String>,
    pub target_role: Option<UserRole>,
    pub starts_at: Option<DateTime<Utc>>,
    pub ends_at: Option<DateTime<Utc>>,
    #[serde(default = "default_true")]
    pub is_active: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn dto() -> PopupDto {
        PopupDto {
            id: None,
            title: "Monsoon offer".into(),
            content: "Flat ₹50 off on 20L jars".into(),
            image_url: None,
            cta_label: None,
            cta_url: None,
            target_role: None,
            starts_at: None,
            ends_at: None,
            is_active: true,
        }
    }

    #[test]
    fn test_window() {
        let now = Utc::now();
        let mut d = dto();
        d.starts_at = Some(now + Duration::hours(1));
        d.ends_at = Some(now + Duration::days(2));
        let p = Popup::new_for_insert(&d);
        assert!(p.validate().is_ok());
        assert!(!p.is_visible(None, now));
        assert!(p.is_visible(None, now + Duration::hours(2)));
        assert!(!p.is_visible(None, now + Duration::days(3)));
    }

    #[test]
    fn test_role_targeting_and_validation() {
        let now = Utc::now();
        let mut d = dto();
        d.target_role = Some(UserRole::Customer);
        let p = Popup::new_for_insert(&d);
        assert!(p.is_visible(Some(UserRole::Customer), now));
        assert!(!p.is_visible(Some(UserRole::DeliveryPartner), now));
        assert!(!p.is_visible(None, now));

        let mut d = dto();
        d.cta_label = Some("Order now".into());
        assert!(Popup::new_for_insert(&d).validate().is_err());
    }
}
