pub mod auth;
pub mod email;
pub mod handlers;
pub mod initialization;
pub mod middleware;
pub mod site_settings;
pub mod tracing;
pub mod users;
