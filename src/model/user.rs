use std::str::FromStr;

use serde::Serialize;
use utoipa::ToSchema;

use crate::model::role::Role;

#[derive(Debug, Clone, PartialEq)]
pub struct User {
    pub id: u64,
    pub email: String,
    pub encrypted_password: String,
    pub name: String,
    pub role: Role,
    pub manager_user_id: Option<u64>,
    pub active: bool,
    /// Current revocation generation. Tokens carrying any other value are stale.
    pub revocation_id: String,
}

impl User {
    pub fn is_manager(&self) -> bool {
        self.role.is_manager()
    }

    /// True when `self` is the manager of `other`.
    pub fn manages(&self, other: &User) -> bool {
        self.is_manager() && other.manager_user_id == Some(self.id)
    }
}

/// Row shape as stored; `role` is kept as text in the table.
#[derive(Debug, sqlx::FromRow)]
pub struct UserSql {
    pub id: u64, // 👈 matches BIGINT UNSIGNED
    pub email: String,
    pub encrypted_password: String,
    pub name: String,
    pub role: String,
    pub manager_user_id: Option<u64>,
    pub active: bool,
    pub revocation_id: String,
}

impl TryFrom<UserSql> for User {
    type Error = String;

    fn try_from(row: UserSql) -> Result<Self, Self::Error> {
        let role = Role::from_str(&row.role)
            .map_err(|_| format!("user {} has unknown role {:?}", row.id, row.role))?;

        Ok(User {
            id: row.id,
            email: row.email,
            encrypted_password: row.encrypted_password,
            name: row.name,
            role,
            manager_user_id: row.manager_user_id,
            active: row.active,
            revocation_id: row.revocation_id,
        })
    }
}

/// Values for a user that has not been persisted yet.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub email: String,
    pub encrypted_password: String,
    pub name: String,
    pub role: Role,
    pub manager_user_id: Option<u64>,
    pub active: bool,
    pub revocation_id: String,
}

/// Public view of a user; never carries the password hash or revocation marker.
#[derive(Debug, Serialize, ToSchema)]
pub struct UserResponse {
    #[schema(example = 1)]
    pub id: u64,
    #[schema(example = "manager@email.com")]
    pub email: String,
    #[schema(example = "Manager Name")]
    pub name: String,
    pub role: Role,
    #[schema(example = json!(null), nullable = true)]
    pub manager_user_id: Option<u64>,
    #[schema(example = true)]
    pub active: bool,
}

impl From<&User> for UserResponse {
    fn from(user: &User) -> Self {
        UserResponse {
            id: user.id,
            email: user.email.clone(),
            name: user.name.clone(),
            role: user.role,
            manager_user_id: user.manager_user_id,
            active: user.active,
        }
    }
}
