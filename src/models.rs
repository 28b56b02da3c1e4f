use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Deserialize, ToSchema)]
pub struct RegisterInput {
    #[schema(example = "jdoe")]
    pub username: String,
    #[schema(example = "secret123", format = "password")]
    pub password: String,
    #[schema(example = "jdoe@company.com", format = "email")]
    pub email: String,
    #[serde(default)]
    #[schema(example = "John")]
    pub first_name: String,
    #[serde(default)]
    #[schema(example = "Doe")]
    pub last_name: String,
    /// Defaults to the Employee role when omitted
    #[schema(example = 2)]
    pub role_id: Option<u64>,
}

#[derive(Deserialize, ToSchema)]
pub struct LoginInput {
    #[schema(example = "jdoe")]
    pub username: String,
    #[schema(example = "secret123", format = "password")]
    pub password: String,
}

#[derive(Serialize, Deserialize, ToSchema)]
pub struct LoginResponse {
    pub token: String,
}

#[derive(Serialize, Deserialize, ToSchema)]
pub struct CreatedId {
    #[schema(example = 7)]
    pub id: u64,
}

#[derive(Deserialize, ToSchema)]
pub struct ShiftInput {
    #[schema(example = "Morning")]
    pub name: String,
    #[schema(example = "08:00:00")]
    pub start_time: String,
    #[schema(example = "16:00:00")]
    pub end_time: String,
}

#[derive(Deserialize, ToSchema)]
pub struct ScheduleInput {
    #[schema(example = 7)]
    pub user_id: u64,
    #[schema(example = 1)]
    pub shift_id: u64,
    #[schema(example = "2026-01-05", format = "date")]
    pub date: String,
}

#[derive(Deserialize, Default, ToSchema)]
pub struct AttendanceNotesInput {
    #[schema(example = "working from the branch office")]
    pub notes: Option<String>,
}

#[derive(Deserialize, ToSchema)]
pub struct AdminUpdateUserInput {
    #[schema(example = "jdoe")]
    pub username: String,
    #[schema(example = "jdoe@company.com", format = "email")]
    pub email: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[schema(example = 2)]
    pub role_id: u64,
}

#[derive(Deserialize, ToSchema)]
pub struct UpdateProfileInput {
    #[schema(example = "jdoe")]
    pub username: String,
    #[schema(example = "jdoe@company.com", format = "email")]
    pub email: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
}

#[derive(Deserialize, ToSchema)]
pub struct UpdatePasswordInput {
    #[schema(format = "password")]
    pub old_password: String,
    #[schema(format = "password")]
    pub new_password: String,
}

#[derive(Deserialize, ToSchema)]
pub struct RoleInput {
    #[schema(example = "Supervisor")]
    pub name: String,
}

/// Token payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Claims {
    pub user_id: u64,
    pub username: String,
    /// Role name, e.g. "Admin"
    pub role: String,
    pub iss: String,
    pub iat: u64,
    pub nbf: u64,
    pub exp: u64,
    pub jti: String,
}
