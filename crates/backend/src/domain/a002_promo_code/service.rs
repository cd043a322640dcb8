use super::repository;
use chrono::{DateTime, Utc};
use contracts::domain::a002_promo_code::aggregate::{
    normalize_code, PromoCode, PromoCodeDto, PromoError, ValidatePromoRequest,
    ValidatePromoResponse,
};
use contracts::shared::money::Paise;
use uuid::Uuid;

use crate::domain::a005_order;
use crate::shared::api_error::{bad_request, conflict, not_found};

async fn ensure_code_free(code: &str, own_id: Option<Uuid>) -> anyhow::Result<()> {
    if let Some(existing) = repository::get_by_code(code).await? {
        if Some(existing.base.id.value()) != own_id {
            return Err(conflict(format!("Promo code {} already exists", code)));
        }
    }
    Ok(())
}

pub async fn create(dto: PromoCodeDto) -> anyhow::Result<Uuid> {
    let mut aggregate = PromoCode::new_for_insert(&dto);
    aggregate.validate().map_err(bad_request)?;
    ensure_code_free(&aggregate.base.code, None).await?;
    aggregate.before_write();

    let id = repository::insert(&aggregate).await?;
    tracing::info!("Promo code {} created", aggregate.base.code);
    Ok(id)
}

pub async fn update(dto: PromoCodeDto) -> anyhow::Result<()> {
    let id = dto
        .id
        .as_ref()
        .and_then(|s| Uuid::parse_str(s).ok())
        .ok_or_else(|| bad_request("Invalid ID"))?;

    let mut aggregate = repository::get_by_id(id)
        .await?
        .ok_or_else(|| not_found("Promo code"))?;

    aggregate.update(&dto);
    aggregate.validate().map_err(bad_request)?;
    ensure_code_free(&aggregate.base.code, Some(id)).await?;
    aggregate.before_write();

    repository::update(&aggregate).await
}

pub async fn delete(id: Uuid) -> anyhow::Result<bool> {
    repository::soft_delete(id).await
}

pub async fn get_by_id(id: Uuid) -> anyhow::Result<Option<PromoCode>> {
    repository::get_by_id(id).await
}

pub async fn list_all() -> anyhow::Result<Vec<PromoCode>> {
    repository::list_all().await
}

/// Looks the code up and applies it to `subtotal` for `customer_id`.
/// Returns the promo (for the later usage increment) and the discount.
pub async fn resolve(
    code: &str,
    subtotal: Paise,
    customer_id: Option<&str>,
    now: DateTime<Utc>,
) -> anyhow::Result<Result<(PromoCode, Paise), PromoError>> {
    let code = normalize_code(code);
    let Some(promo) = repository::get_by_code(&code).await? else {
        return Ok(Err(PromoError::NotFound));
    };
    let uses = match customer_id {
        Some(customer) => a005_order::repository::count_promo_uses(customer, &code).await?,
        None => 0,
    };
    Ok(promo.apply(subtotal, uses, now).map(|discount| (promo, discount)))
}

/// Dry run used by the cart before checkout; never changes usage counters.
pub async fn validate(
    req: ValidatePromoRequest,
    customer_id: Option<&str>,
) -> anyhow::Result<ValidatePromoResponse> {
    let code = normalize_code(&req.code);
    let customer = customer_id.or(req.user_id.as_deref());

    let response = match resolve(&code, req.subtotal, customer, Utc::now()).await? {
        Ok((_, discount)) => ValidatePromoResponse {
            valid: true,
            code,
            discount_amount: discount,
            message: "Promo code applied".to_string(),
        },
        Err(e) => ValidatePromoResponse {
            valid: false,
            code,
            discount_amount: 0,
            message: e.to_string(),
        },
    };
    Ok(response)
}

pub async fn record_use(id: Uuid) -> anyhow::Result<()> {
    repository::increment_used_count(id).await
}
