pub mod d400_admin_overview;
pub mod d401_analytics;
pub mod d402_dark_store_earnings;
pub mod d403_partner_earnings;
