//! Wire types and business rules shared by the backend and any client.

pub mod dashboards;
pub mod domain;
pub mod shared;
pub mod system;
