use sqlx::FromRow;
use uuid::Uuid;

use treino_shared::{AuthUser, UserRole};

/// Login identity joined with the coach or athlete row that carries the display name.
#[derive(Debug, Clone, FromRow)]
pub struct UserAccount {
    pub id: Uuid,
    pub email: String,
    pub password_hash: Option<String>,
    pub role: String,
    pub is_active: bool,
    pub name: Option<String>,
}

/// Column list matching [`UserAccount`]; callers append their own `WHERE`.
pub const USER_ACCOUNT_SELECT: &str = "SELECT up.id, up.email, up.password_hash, up.role, up.is_active, \
     COALESCE(c.name, a.name) AS name \
     FROM user_profiles up \
     LEFT JOIN coaches c ON c.user_profile_id = up.id \
     LEFT JOIN athletes a ON a.user_profile_id = up.id";

impl UserAccount {
    pub fn role(&self) -> Option<UserRole> {
        UserRole::parse(&self.role)
    }

    pub fn to_auth_user(&self, role: UserRole) -> AuthUser {
        AuthUser {
            id: self.id,
            email: self.email.clone(),
            role,
            name: self.name.clone().unwrap_or_default(),
        }
    }
}
