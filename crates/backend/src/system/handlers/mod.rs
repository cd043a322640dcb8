pub mod auth;
pub mod email;
pub mod site_settings;
pub mod users;
