use chrono::{DateTime, Utc};
use derive_more::Display;
use serde::{Deserialize, Serialize};

use crate::server::database::impl_document;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Display, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub(crate) enum Role {
    #[display("admin")]
    Admin,
    #[display("manager")]
    Manager,
    #[display("receptionist")]
    Receptionist,
    #[display("staff")]
    Staff,
    #[default]
    #[display("customer")]
    Customer,
}

impl Role {
    pub fn is_admin(self) -> bool {
        self == Role::Admin
    }

    /// Anyone allowed into the admin dashboard.
    pub fn is_staff(self) -> bool {
        self.has_role(&[Role::Admin, Role::Manager, Role::Receptionist, Role::Staff])
    }

    pub fn is_manager(self) -> bool {
        self.has_role(&[Role::Admin, Role::Manager])
    }

    pub fn has_role(self, any_of: &[Role]) -> bool {
        any_of.contains(&self)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Display, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub(crate) enum Provider {
    #[default]
    #[display("password")]
    Password,
    #[display("federated")]
    Federated,
}

/// Stored account, credentials included.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct User {
    #[serde(default)]
    pub id: String,
    pub email: String,
    pub display_name: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub photo_url: String,
    pub role: Role,
    #[serde(default)]
    pub provider: Provider,
    /// argon2 PHC string, absent for federated accounts
    #[serde(default)]
    pub password_hash: Option<String>,
    #[serde(default = "active")]
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl_document!(User, "users", "uid");

fn active() -> bool {
    true
}

/// What the API exposes about an account.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct UserProfile {
    pub uid: String,
    pub email: String,
    pub display_name: String,
    pub phone: String,
    pub photo_url: String,
    pub role: Role,
    pub is_active: bool,
}

impl From<&User> for UserProfile {
    fn from(user: &User) -> Self {
        Self {
            uid: user.id.clone(),
            email: user.email.clone(),
            display_name: user.display_name.clone(),
            phone: user.phone.clone(),
            photo_url: user.photo_url.clone(),
            role: user.role,
            is_active: user.is_active,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct RegisterRequest {
    pub email: String,
    pub password: String,
    pub display_name: String,
    #[serde(default)]
    pub phone: String,
    pub role: Option<Role>,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct SignInRequest {
    pub email: String,
    pub password: String,
}

/// Identity vouched for by a trusted sign-in provider.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct FederatedSignInRequest {
    pub email: String,
    #[serde(default)]
    pub display_name: String,
    #[serde(default)]
    pub photo_url: String,
    pub assertion: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ChangePasswordRequest {
    pub current_password: String,
    pub new_password: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ProfileUpdate {
    pub display_name: Option<String>,
    pub phone: Option<String>,
    pub photo_url: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct ResetPasswordRequest {
    pub email: String,
}

/// Account changes only managers may make.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct UserAdminUpdate {
    pub role: Option<Role>,
    pub is_active: Option<bool>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct SessionView {
    pub token: String,
    pub expires_at: DateTime<Utc>,
    pub user: UserProfile,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_predicates() {
        assert!(Role::Admin.is_admin());
        assert!(Role::Admin.is_manager());
        assert!(Role::Receptionist.is_staff());
        assert!(!Role::Receptionist.is_manager());
        assert!(!Role::Customer.is_staff());
        assert!(Role::Staff.has_role(&[Role::Manager, Role::Staff]));
        assert!(!Role::Customer.has_role(&[]));
    }
}
