use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::common::{AggregateRoot, BaseAggregate, EntityMetadata};
use crate::shared::validation::require_non_empty;
use crate::system::users::UserRole;

crate::uuid_aggregate_id!(
    /// Notification identifier
    NotificationId
);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationTarget {
    All,
    Role,
    User,
}

impl NotificationTarget {
    pub fn as_str(&self) -> &'static str {
        match self {
            NotificationTarget::All => "all",
            NotificationTarget::Role => "role",
            NotificationTarget::User => "user",
        }
    }

    pub fn parse(s: &str) -> Result<Self, String> {
        match s {
            "all" => Ok(NotificationTarget::All),
            "role" => Ok(NotificationTarget::Role),
            "user" => Ok(NotificationTarget::User),
            other => Err(format!("Unknown notification target: {}", other)),
        }
    }
}

/// In-app notification. `base.description` is the title.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Notification {
    #[serde(flatten)]
    pub base: BaseAggregate<NotificationId>,
    pub message: String,
    pub target: NotificationTarget,
    pub target_role: Option<UserRole>,
    pub target_user_id: Option<String>,
    /// Users who have read the notification
    pub read_by: Vec<String>,
    pub is_active: bool,
    pub expires_at: Option<DateTime<Utc>>,
}

impl Notification {
    pub fn new_for_insert(dto: &NotificationDto) -> Self {
        let id = NotificationId::new_v4();
        let code = format!("NTF-{}", &id.value().simple().to_string()[..8]);
        let mut item = Self {
            base: BaseAggregate::new(id, code, dto.title.clone()),
            message: String::new(),
            target: dto.target,
            target_role: None,
            target_user_id: None,
            read_by: Vec::new(),
            is_active: true,
            expires_at: None,
        };
        item.update(dto);
        item
    }

    pub fn update(&mut self, dto: &NotificationDto) {
        self.base.description = dto.title.clone();
        self.message = dto.message.clone();
        self.target = dto.target;
        self.target_role = dto.target_role;
        self.target_user_id = dto.target_user_id.clone().filter(|s| !s.trim().is_empty());
        self.is_active = dto.is_active;
        self.expires_at = dto.expires_at;
    }

    pub fn validate(&self) -> Result<(), String> {
        require_non_empty(&self.base.description, "Title")?;
        require_non_empty(&self.message, "Message")?;
        match self.target {
            NotificationTarget::Role if self.target_role.is_none() => {
                Err("Target role is required".into())
            }
            NotificationTarget::User if self.target_user_id.is_none() => {
                Err("Target user is required".into())
            }
            _ => Ok(()),
        }
    }

    pub fn before_write(&mut self) {
        self.base.touch();
    }

    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        matches!(self.expires_at, Some(at) if at < now)
    }

    pub fn is_visible_to(&self, user_id: &str, role: UserRole, now: DateTime<Utc>) -> bool {
        if !self.is_active || self.base.metadata.is_deleted || self.is_expired(now) {
            return false;
        }
        match self.target {
            NotificationTarget::All => true,
            NotificationTarget::Role => self.target_role == Some(role),
            NotificationTarget::User => self.target_user_id.as_deref() == Some(user_id),
        }
    }

    pub fn is_read_by(&self, user_id: &str) -> bool {
        self.read_by.iter().any(|u| u == user_id)
    }

    /// Returns false when the user had already read it.
    pub fn mark_read(&mut self, user_id: &str) -> bool {
        if self.is_read_by(user_id) {
            return false;
        }
        self.read_by.push(user_id.to_string());
        true
    }
}

impl AggregateRoot for Notification {
    type Id = NotificationId;

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
        "a006"
    }

    fn collection_name() -> &'static str {
        "notification"
    }

    fn element_name() -> &'static str {
        "Notification"
    }

    fn list_name() -> &'static str {
        "Notifications"
    }
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationDto {
    pub id: Option<String>,
    pub title: String,
    pub message: String,
    pub target: NotificationTarget,
    pub target_role: Option<UserRole>,
    pub target_user_id: Option<String>,
    #[serde(default = "default_true")]
    pub is_active: bool,
    pub expires_at: Option<DateTime<Utc>>,
}

/// Notification as seen by one user
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserNotification {
    pub id: String,
    pub title: String,
    pub message: String,
    pub created_at: DateTime<Utc>,
    pub expires_at: Option<DateTime<Utc>>,
    pub is_read: bool,
}

impl UserNotification {
    pub fn from_notification(n: &Notification, user_id: &str) -> Self {
        Self {
            id: n.base.id.value().to_string(),
            title: n.base.description.clone(),
            message: n.message.clone(),
            created_at: n.base.metadata.created_at,
            expires_at: n.expires_at,
            is_read: n.is_read_by(user_id),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn dto(target: NotificationTarget) -> NotificationDto {
        NotificationDto {
            id: None,
            title: "Water supply update".into(),
            message: "Deliveries resume at 8am".into(),
            target,
            target_role: None,
            target_user_id: None,
            is_active: true,
            expires_at: None,
        }
    }

    #[test]
    fn test_targeting() {
        let now = Utc::now();
        let all = Notification::new_for_insert(&dto(NotificationTarget::All));
        assert!(all.is_visible_to("u1", UserRole::Customer, now));

        let mut d = dto(NotificationTarget::Role);
        assert!(Notification::new_for_insert(&d).validate().is_err());
        d.target_role = Some(UserRole::DeliveryPartner);
        let role = Notification::new_for_insert(&d);
        assert!(role.validate().is_ok());
        assert!(role.is_visible_to("u1", UserRole::DeliveryPartner, now));
        assert!(!role.is_visible_to("u1", UserRole::Customer, now));

        let mut d = dto(NotificationTarget::User);
        d.target_user_id = Some("u2".into());
        let user = Notification::new_for_insert(&d);
        assert!(user.is_visible_to("u2", UserRole::Customer, now));
        assert!(!user.is_visible_to("u1", UserRole::Customer, now));
    }

    #[test]
    fn test_expiry_and_read_state() {
        let now = Utc::now();
        let mut d = dto(NotificationTarget::All);
        d.expires_at = Some(now - Duration::minutes(1));
        let mut n = Notification::new_for_insert(&d);
        assert!(n.is_expired(now));
        assert!(!n.is_visible_to("u1", UserRole::Customer, now));

        assert!(n.mark_read("u1"));
        assert!(!n.mark_read("u1"));
        assert!(UserNotification::from_notification(&n, "u1").is_read);
        assert!(!UserNotification::from_notification(&n, "u2").is_read);
    }
}
