pub mod a001_product;
pub mod a002_promo_code;
pub mod a003_dark_store;
pub mod a004_deliverable_pincode;
pub mod a005_order;
pub mod a006_notification;
pub mod a007_popup;
pub mod a008_contact_submission;
pub mod a009_wallet;
pub mod common;
