use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(
    Debug, Copy, Clone, Eq, PartialEq, Serialize, Deserialize, ToSchema, strum::Display, strum::EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Role {
    Admin,
    Hr,
    Employee,
}

impl Role {
    pub fn from_id(id: u8) -> Option<Self> {
        match id {
            1 => Some(Role::Admin),
            2 => Some(Role::Hr),
            3 => Some(Role::Employee),
            _ => None,
        }
    }

    /// Numeric id carried in tokens and the `users.role_id` column.
    #[cfg(test)]
    pub fn id(self) -> u8 {
        match self {
            Role::Admin => 1,
            Role::Hr => 2,
            Role::Employee => 3,
        }
    }

    /// HR managers and admins see every request and decide on them.
    pub fn is_hr_or_admin(self) -> bool {
        matches!(self, Role::Admin | Role::Hr)
    }

    pub fn is_admin(self) -> bool {
        self == Role::Admin
    }
}
