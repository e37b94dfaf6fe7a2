use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::model::role::Role;

/// Display-friendly view of an identity, joined into every returned leave request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[schema(example = json!({
    "id": 7,
    "name": "Jane Doe",
    "role": "employee",
    "email": "jane.doe@company.com",
    "profile_photo": null
}))]
pub struct IdentitySummary {
    pub id: u64,
    pub name: String,
    pub role: Role,
    pub email: String,
    #[schema(nullable = true)]
    pub profile_photo: Option<String>,
}

/// Row shape of the `users` table columns the directory reads.
#[derive(Debug, sqlx::FromRow)]
pub struct UserSummarySql {
    pub id: u64,
    pub name: String,
    pub email: String,
    pub role_id: u8,
    pub profile_photo: Option<String>,
}

impl UserSummarySql {
    /// Rows carrying an unknown role id are skipped by the caller.
    pub fn into_summary(self) -> Option<IdentitySummary> {
        let role = Role::from_id(self.role_id)?;
        Some(IdentitySummary {
            id: self.id,
            name: self.name,
            role,
            email: self.email,
            profile_photo: self.profile_photo,
        })
    }
}
