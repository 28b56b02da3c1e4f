use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};
use utoipa::ToSchema;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
pub struct Role {
    #[schema(example = 2)]
    pub id: u64,
    #[schema(example = "Employee")]
    pub name: String,
}

/// The seed roles created by the initial migration. They can be referenced
/// by name from route guards and cannot be deleted or renamed.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Display, EnumString, AsRefStr)]
#[strum(ascii_case_insensitive)]
pub enum BaseRole {
    Admin,
    Employee,
}

impl BaseRole {
    pub fn is_base(name: &str) -> bool {
        name.trim().parse::<BaseRole>().is_ok()
    }
}
