use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UserRole {
    Customer,
    DeliveryPartner,
    DarkStoreOwner,
    Admin,
    SuperAdmin,
}

impl UserRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            UserRole::Customer => "customer",
            UserRole::DeliveryPartner => "delivery_partner",
            UserRole::DarkStoreOwner => "dark_store_owner",
            UserRole::Admin => "admin",
            UserRole::SuperAdmin => "super_admin",
        }
    }

    pub fn parse(s: &str) -> Result<Self, String> {
        match s {
            "customer" => Ok(UserRole::Customer),
            "delivery_partner" => Ok(UserRole::DeliveryPartner),
            "dark_store_owner" => Ok(UserRole::DarkStoreOwner),
            "admin" => Ok(UserRole::Admin),
            "super_admin" => Ok(UserRole::SuperAdmin),
            other => Err(format!("Unknown role: {}", other)),
        }
    }

    pub fn is_admin(&self) -> bool {
        matches!(self, UserRole::Admin | UserRole::SuperAdmin)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub username: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub full_name: Option<String>,
    pub role: UserRole,
    pub is_active: bool,
    pub is_suspended: bool,
    pub is_locked: bool,
    pub failed_login_attempts: i32,
    pub created_at: String,
    pub updated_at: String,
    pub last_login_at: Option<String>,
    pub created_by: Option<String>,
}

impl User {
    /// Why the user may not sign in, if anything
    pub fn login_block_reason(&self) -> Option<&'static str> {
        if !self.is_active {
            Some("Account is inactive")
        } else if self.is_suspended {
            Some("Account is suspended")
        } else if self.is_locked {
            Some("Account is locked after too many failed attempts")
        } else {
            None
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateUserDto {
    pub username: String,
    pub password: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub full_name: Option<String>,
    pub role: UserRole,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateUserDto {
    pub id: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub full_name: Option<String>,
    pub role: UserRole,
    pub is_active: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChangePasswordDto {
    pub user_id: String,
    pub old_password: Option<String>, // None if admin changing someone else's password
    pub new_password: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UserListQuery {
    pub role: Option<UserRole>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_wire_names() {
        let json = serde_json::to_string(&UserRole::DeliveryPartner).unwrap();
        assert_eq!(json, "\"delivery_partner\"");
        assert_eq!(UserRole::parse("super_admin"), Ok(UserRole::SuperAdmin));
        assert!(UserRole::SuperAdmin.is_admin());
        assert!(!UserRole::DarkStoreOwner.is_admin());
    }
}
