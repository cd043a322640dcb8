use axum::{
    handler::Handler,
    middleware,
    routing::{get, post, put},
    Router,
};

use crate::system::auth::middleware::{
    optional_auth, require_admin, require_auth, require_customer, require_dark_store_owner,
    require_delivery_partner,
};
use crate::{handlers, system};

/// All application routes
pub fn configure_routes() -> Router {
    Router::new()
        .route("/health", get(|| async { "ok" }))
        // ========================================
        // SYSTEM AUTH ROUTES (PUBLIC)
        // ========================================
        .route("/api/system/auth/login", post(system::handlers::auth::login))
        .route(
            "/api/system/auth/register",
            post(system::handlers::auth::register),
        )
        .route(
            "/api/system/auth/refresh",
            post(system::handlers::auth::refresh),
        )
        .route(
            "/api/system/auth/logout",
            post(system::handlers::auth::logout),
        )
        .route(
            "/api/system/auth/me",
            get(system::handlers::auth::current_user).layer(middleware::from_fn(require_auth)),
        )
        // ========================================
        // USERS (admin)
        // ========================================
        .route(
            "/api/system/users",
            get(system::handlers::users::list)
                .post(system::handlers::users::create)
                .layer(middleware::from_fn(require_admin)),
        )
        .route(
            "/api/users",
            get(system::handlers::users::list).layer(middleware::from_fn(require_admin)),
        )
        .route(
            "/api/system/users/:id",
            get(system::handlers::users::get_by_id)
                .put(system::handlers::users::update)
                .delete(system::handlers::users::delete)
                .layer(middleware::from_fn(require_admin)),
        )
        .route(
            "/api/system/users/:id/suspend",
            post(system::handlers::users::suspend).layer(middleware::from_fn(require_admin)),
        )
        .route(
            "/api/system/users/:id/unsuspend",
            post(system::handlers::users::unsuspend).layer(middleware::from_fn(require_admin)),
        )
        .route(
            "/api/system/users/:id/unlock",
            post(system::handlers::users::unlock).layer(middleware::from_fn(require_admin)),
        )
        .route(
            "/api/system/users/:id/change-password",
            post(system::handlers::users::change_password)
                .layer(middleware::from_fn(require_auth)),
        )
        // ========================================
        // SITE SETTINGS / EMAIL
        // ========================================
        .route(
            "/api/site-settings",
            get(system::handlers::site_settings::get).put(
                system::handlers::site_settings::update.layer(middleware::from_fn(require_admin)),
            ),
        )
        .route(
            "/api/email/send",
            post(system::handlers::email::send).layer(middleware::from_fn(require_admin)),
        )
        // ========================================
        // A001 PRODUCTS
        // ========================================
        .route(
            "/api/products",
            get(handlers::a001_product::list_all.layer(middleware::from_fn(optional_auth))).post(
                handlers::a001_product::upsert.layer(middleware::from_fn(require_admin)),
            ),
        )
        .route(
            "/api/products/:id",
            get(handlers::a001_product::get_by_id.layer(middleware::from_fn(optional_auth)))
                .delete(handlers::a001_product::delete.layer(middleware::from_fn(require_admin))),
        )
        // ========================================
        // A002 PROMO CODES
        // ========================================
        .route(
            "/api/promo-codes",
            get(handlers::a002_promo_code::list_all)
                .post(handlers::a002_promo_code::upsert)
                .layer(middleware::from_fn(require_admin)),
        )
        .route(
            "/api/promo-codes/validate",
            post(handlers::a002_promo_code::validate).layer(middleware::from_fn(require_auth)),
        )
        .route(
            "/api/promo-codes/:id",
            get(handlers::a002_promo_code::get_by_id)
                .delete(handlers::a002_promo_code::delete)
                .layer(middleware::from_fn(require_admin)),
        )
        // ========================================
        // A003 DARK STORES
        // ========================================
        .route(
            "/api/dark-stores",
            get(handlers::a003_dark_store::list_all)
                .post(handlers::a003_dark_store::upsert)
                .layer(middleware::from_fn(require_admin)),
        )
        .route(
            "/api/dark-stores/mine",
            get(handlers::a003_dark_store::mine)
                .layer(middleware::from_fn(require_dark_store_owner)),
        )
        .route(
            "/api/dark-stores/low-stock",
            get(handlers::a003_dark_store::low_stock).layer(middleware::from_fn(require_admin)),
        )
        .route(
            "/api/dark-stores/:id",
            get(handlers::a003_dark_store::get_by_id)
                .delete(handlers::a003_dark_store::delete)
                .layer(middleware::from_fn(require_admin)),
        )
        .route(
            "/api/dark-stores/:id/stock",
            put(handlers::a003_dark_store::set_stock)
                .layer(middleware::from_fn(require_dark_store_owner)),
        )
        // ========================================
        // A004 DELIVERABLE PINCODES
        // ========================================
        .route(
            "/api/deliverable-pincodes",
            get(handlers::a004_deliverable_pincode::list_all)
                .post(handlers::a004_deliverable_pincode::upsert)
                .layer(middleware::from_fn(require_admin)),
        )
        .route(
            "/api/deliverable-pincodes/check/:pincode",
            get(handlers::a004_deliverable_pincode::check),
        )
        .route(
            "/api/deliverable-pincodes/:id",
            get(handlers::a004_deliverable_pincode::get_by_id)
                .delete(handlers::a004_deliverable_pincode::delete)
                .layer(middleware::from_fn(require_admin)),
        )
        // ========================================
        // A005 ORDERS
        // ========================================
        .route(
            "/api/orders",
            get(handlers::a005_order::list).layer(middleware::from_fn(require_admin)),
        )
        .route(
            "/api/orders/checkout",
            post(handlers::a005_order::checkout).layer(middleware::from_fn(require_customer)),
        )
        .route(
            "/api/orders/mine",
            get(handlers::a005_order::mine).layer(middleware::from_fn(require_customer)),
        )
        .route(
            "/api/orders/assigned",
            get(handlers::a005_order::assigned)
                .layer(middleware::from_fn(require_delivery_partner)),
        )
        .route(
            "/api/orders/export.csv",
            get(handlers::a005_order::export_csv).layer(middleware::from_fn(require_admin)),
        )
        .route(
            "/api/orders/:id",
            get(handlers::a005_order::get_by_id).layer(middleware::from_fn(require_auth)),
        )
        .route(
            "/api/orders/:id/assign",
            post(handlers::a005_order::assign).layer(middleware::from_fn(require_admin)),
        )
        .route(
            "/api/orders/:id/deliver",
            post(handlers::a005_order::deliver)
                .layer(middleware::from_fn(require_delivery_partner)),
        )
        .route(
            "/api/orders/:id/cancel",
            post(handlers::a005_order::cancel).layer(middleware::from_fn(require_auth)),
        )
        .route(
            "/api/orders/:id/waive-floor-charge",
            post(handlers::a005_order::waive_floor_charge)
                .layer(middleware::from_fn(require_admin)),
        )
        .route(
            "/api/orders/:id/payment-status",
            post(handlers::a005_order::update_payment_status)
                .layer(middleware::from_fn(require_admin)),
        )
        // ========================================
        // A006 NOTIFICATIONS
        // ========================================
        .route(
            "/api/notifications",
            get(handlers::a006_notification::list_all)
                .post(handlers::a006_notification::upsert)
                .layer(middleware::from_fn(require_admin)),
        )
        .route(
            "/api/notifications/mine",
            get(handlers::a006_notification::mine).layer(middleware::from_fn(require_auth)),
        )
        .route(
            "/api/notifications/:id",
            get(handlers::a006_notification::get_by_id)
                .delete(handlers::a006_notification::delete)
                .layer(middleware::from_fn(require_admin)),
        )
        .route(
            "/api/notifications/:id/read",
            post(handlers::a006_notification::mark_read).layer(middleware::from_fn(require_auth)),
        )
        // ========================================
        // A007 POPUPS
        // ========================================
        .route(
            "/api/popups",
            get(handlers::a007_popup::list_all)
                .post(handlers::a007_popup::upsert)
                .layer(middleware::from_fn(require_admin)),
        )
        .route(
            "/api/popups/active",
            get(handlers::a007_popup::active).layer(middleware::from_fn(optional_auth)),
        )
        .route(
            "/api/popups/:id",
            get(handlers::a007_popup::get_by_id)
                .delete(handlers::a007_popup::delete)
                .layer(middleware::from_fn(require_admin)),
        )
        // ========================================
        // A008 CONTACT
        // ========================================
        .route(
            "/api/contact",
            post(handlers::a008_contact_submission::create).get(
                handlers::a008_contact_submission::list_all
                    .layer(middleware::from_fn(require_admin)),
            ),
        )
        .route(
            "/api/contact/:id",
            get(handlers::a008_contact_submission::get_by_id)
                .delete(handlers::a008_contact_submission::delete)
                .layer(middleware::from_fn(require_admin)),
        )
        .route(
            "/api/contact/:id/status",
            post(handlers::a008_contact_submission::set_status)
                .layer(middleware::from_fn(require_admin)),
        )
        // ========================================
        // A009 WALLET
        // ========================================
        .route(
            "/api/wallet/mine",
            get(handlers::a009_wallet::mine).layer(middleware::from_fn(require_auth)),
        )
        .route(
            "/api/wallet/:user_id",
            get(handlers::a009_wallet::get_for_user).layer(middleware::from_fn(require_admin)),
        )
        .route(
            "/api/wallet/:user_id/credit",
            post(handlers::a009_wallet::credit).layer(middleware::from_fn(require_admin)),
        )
        .route(
            "/api/wallet/:user_id/debit",
            post(handlers::a009_wallet::debit).layer(middleware::from_fn(require_admin)),
        )
        // ========================================
        // DASHBOARDS
        // ========================================
        .route(
            "/api/dashboard/admin",
            get(handlers::dashboards::admin_overview).layer(middleware::from_fn(require_admin)),
        )
        .route(
            "/api/analytics",
            get(handlers::dashboards::analytics).layer(middleware::from_fn(require_admin)),
        )
        .route(
            "/api/dashboard/dark-store",
            get(handlers::dashboards::dark_store_earnings)
                .layer(middleware::from_fn(require_dark_store_owner)),
        )
        .route(
            "/api/dashboard/partner",
            get(handlers::dashboards::partner_earnings)
                .layer(middleware::from_fn(require_delivery_partner)),
        )
}
