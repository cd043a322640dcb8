use axum::{extract::Query, Json};
use contracts::dashboards::d400_admin_overview::dto::AdminOverviewResponse;
use contracts::dashboards::d401_analytics::dto::{AnalyticsRequest, AnalyticsResponse};
use contracts::dashboards::d402_dark_store_earnings::dto::{
    DarkStoreEarningsRequest, DarkStoreEarningsResponse,
};
use contracts::dashboards::d403_partner_earnings::dto::PartnerEarningsResponse;

use crate::dashboards::{
    d400_admin_overview, d401_analytics, d402_dark_store_earnings, d403_partner_earnings,
};
use crate::shared::api_error::ApiResult;
use crate::system::auth::extractor::CurrentUser;

/// GET /api/dashboard/admin
pub async fn admin_overview() -> ApiResult<Json<AdminOverviewResponse>> {
    Ok(Json(d400_admin_overview::service::get_overview().await?))
}

/// GET /api/analytics?date_from=&date_to=
pub async fn analytics(Query(request): Query<AnalyticsRequest>) -> ApiResult<Json<AnalyticsResponse>> {
    Ok(Json(d401_analytics::service::get_analytics(request).await?))
}

/// GET /api/dashboard/dark-store?year=&month=&store_id=
pub async fn dark_store_earnings(
    CurrentUser(claims): CurrentUser,
    Query(request): Query<DarkStoreEarningsRequest>,
) -> ApiResult<Json<DarkStoreEarningsResponse>> {
    Ok(Json(
        d402_dark_store_earnings::service::get_earnings(request, &claims).await?,
    ))
}

/// GET /api/dashboard/partner
pub async fn partner_earnings(
    CurrentUser(claims): CurrentUser,
) -> ApiResult<Json<PartnerEarningsResponse>> {
    Ok(Json(d403_partner_earnings::service::get_earnings(&claims.sub).await?))
}
