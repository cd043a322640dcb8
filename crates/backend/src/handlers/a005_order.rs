use axum::{
    extract::{Path, Query},
    http::header,
    response::IntoResponse,
    Json,
};
use contracts::domain::a005_order::aggregate::{
    AssignOrderRequest, CancelOrderRequest, CheckoutRequest, CheckoutResponse, Order,
    OrderListQuery, OrderListResponse, UpdatePaymentStatusRequest,
};

use crate::domain::a005_order;
use crate::shared::api_error::{parse_uuid, ApiResult};
use crate::system::auth::extractor::CurrentUser;
use crate::usecases::u501_checkout::executor::CheckoutExecutor;

/// POST /api/orders/checkout
pub async fn checkout(
    CurrentUser(claims): CurrentUser,
    Json(request): Json<CheckoutRequest>,
) -> ApiResult<Json<CheckoutResponse>> {
    let response = CheckoutExecutor::new().execute(&claims.sub, request).await?;
    Ok(Json(response))
}

/// GET /api/orders?status=&customer_id=&delivery_partner_id=&limit=&offset=
pub async fn list(Query(query): Query<OrderListQuery>) -> ApiResult<Json<OrderListResponse>> {
    Ok(Json(a005_order::service::list(query).await?))
}

/// GET /api/orders/mine
pub async fn mine(CurrentUser(claims): CurrentUser) -> ApiResult<Json<Vec<Order>>> {
    Ok(Json(a005_order::service::list_for_customer(&claims.sub).await?))
}

/// GET /api/orders/assigned
pub async fn assigned(CurrentUser(claims): CurrentUser) -> ApiResult<Json<Vec<Order>>> {
    Ok(Json(a005_order::service::list_for_partner(&claims.sub).await?))
}

/// GET /api/orders/:id
pub async fn get_by_id(
    CurrentUser(claims): CurrentUser,
    Path(id): Path<String>,
) -> ApiResult<Json<Order>> {
    Ok(Json(a005_order::service::get_for(parse_uuid(&id)?, &claims).await?))
}

/// POST /api/orders/:id/assign
pub async fn assign(
    Path(id): Path<String>,
    Json(request): Json<AssignOrderRequest>,
) -> ApiResult<Json<Order>> {
    let order = a005_order::service::assign(parse_uuid(&id)?, &request.delivery_partner_id).await?;
    Ok(Json(order))
}

/// POST /api/orders/:id/deliver
pub async fn deliver(
    CurrentUser(claims): CurrentUser,
    Path(id): Path<String>,
) -> ApiResult<Json<Order>> {
    Ok(Json(a005_order::service::deliver(parse_uuid(&id)?, &claims).await?))
}

/// POST /api/orders/:id/cancel
pub async fn cancel(
    CurrentUser(claims): CurrentUser,
    Path(id): Path<String>,
    request: Option<Json<CancelOrderRequest>>,
) -> ApiResult<Json<Order>> {
    let reason = request.and_then(|Json(r)| r.reason);
    Ok(Json(a005_order::service::cancel(parse_uuid(&id)?, reason, &claims).await?))
}

/// POST /api/orders/:id/waive-floor-charge
pub async fn waive_floor_charge(Path(id): Path<String>) -> ApiResult<Json<Order>> {
    Ok(Json(a005_order::service::waive_floor_charge(parse_uuid(&id)?).await?))
}

/// POST /api/orders/:id/payment-status
pub async fn update_payment_status(
    Path(id): Path<String>,
    Json(request): Json<UpdatePaymentStatusRequest>,
) -> ApiResult<Json<Order>> {
    let order =
        a005_order::service::update_payment_status(parse_uuid(&id)?, request.payment_status).await?;
    Ok(Json(order))
}

/// GET /api/orders/export.csv
pub async fn export_csv(Query(query): Query<OrderListQuery>) -> ApiResult<impl IntoResponse> {
    let body = a005_order::service::export_csv(query).await?;
    Ok((
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8"),
            (header::CONTENT_DISPOSITION, "attachment; filename=\"orders.csv\""),
        ],
        body,
    ))
}
