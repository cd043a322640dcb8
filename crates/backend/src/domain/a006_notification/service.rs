use super::repository;
use chrono::{DateTime, Utc};
use contracts::domain::a006_notification::aggregate::{
    Notification, NotificationDto, UserNotification,
};
use contracts::system::auth::TokenClaims;
use uuid::Uuid;

use crate::shared::api_error::{bad_request, not_found};

pub async fn create(dto: NotificationDto) -> anyhow::Result<Uuid> {
    let mut aggregate = Notification::new_for_insert(&dto);
    aggregate.validate().map_err(bad_request)?;
    aggregate.before_write();

    let id = repository::insert(&aggregate).await?;
    tracing::info!(
        "Notification \"{}\" published to {}",
        aggregate.base.description,
        aggregate.target.as_str()
    );
    Ok(id)
}

pub async fn update(dto: NotificationDto) -> anyhow::Result<()> {
    let id = dto
        .id
        .as_ref()
        .and_then(|s| Uuid::parse_str(s).ok())
        .ok_or_else(|| bad_request("Invalid ID"))?;

    let mut aggregate = repository::get_by_id(id)
        .await?
        .ok_or_else(|| not_found("Notification"))?;

    aggregate.update(&dto);
    aggregate.validate().map_err(bad_request)?;
    aggregate.before_write();

    repository::update(&aggregate).await
}

pub async fn delete(id: Uuid) -> anyhow::Result<bool> {
    repository::soft_delete(id).await
}

pub async fn get_by_id(id: Uuid) -> anyhow::Result<Option<Notification>> {
    repository::get_by_id(id).await
}

pub async fn list_all() -> anyhow::Result<Vec<Notification>> {
    repository::list_all().await
}

pub fn visible_for(
    notifications: &[Notification],
    claims: &TokenClaims,
    now: DateTime<Utc>,
) -> Vec<UserNotification> {
    notifications
        .iter()
        .filter(|n| n.is_visible_to(&claims.sub, claims.role, now))
        .map(|n| UserNotification::from_notification(n, &claims.sub))
        .collect()
}

pub async fn list_for_user(claims: &TokenClaims) -> anyhow::Result<Vec<UserNotification>> {
    let active = repository::list_active().await?;
    Ok(visible_for(&active, claims, Utc::now()))
}

pub async fn mark_read(id: Uuid, claims: &TokenClaims) -> anyhow::Result<()> {
    let mut aggregate = repository::get_by_id(id)
        .await?
        .filter(|n| n.is_visible_to(&claims.sub, claims.role, Utc::now()))
        .ok_or_else(|| not_found("Notification"))?;

    if aggregate.mark_read(&claims.sub) {
        repository::update(&aggregate).await?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use contracts::domain::a006_notification::aggregate::NotificationTarget;
    use contracts::system::users::UserRole;

    fn claims(sub: &str, role: UserRole) -> TokenClaims {
        TokenClaims {
            sub: sub.into(),
            username: sub.into(),
            role,
            exp: 0,
            iat: 0,
        }
    }

    fn notification(target: NotificationTarget, role: Option<UserRole>, user: Option<&str>) -> Notification {
        Notification::new_for_insert(&NotificationDto {
            id: None,
            title: "Heads up".into(),
            message: "Holiday schedule".into(),
            target,
            target_role: role,
            target_user_id: user.map(String::from),
            is_active: true,
            expires_at: None,
        })
    }

    #[test]
    fn test_visible_for_filters_targets_and_expiry() {
        let now = Utc::now();
        let mut expired = notification(NotificationTarget::All, None, None);
        expired.expires_at = Some(now - Duration::minutes(1));
        let mut read = notification(NotificationTarget::User, None, Some("u1"));
        read.mark_read("u1");

        let all = vec![
            notification(NotificationTarget::All, None, None),
            notification(NotificationTarget::Role, Some(UserRole::DeliveryPartner), None),
            read,
            expired,
        ];

        let customer = visible_for(&all, &claims("u1", UserRole::Customer), now);
        assert_eq!(customer.len(), 2);
        assert!(!customer[0].is_read);
        assert!(customer[1].is_read);

        let partner = visible_for(&all, &claims("u2", UserRole::DeliveryPartner), now);
        assert_eq!(partner.len(), 2);
    }
}
