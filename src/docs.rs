use crate::model::{
    attendance::{Attendance, CheckInReceipt, CheckOutReceipt},
    role::Role,
    schedule::Schedule,
    shift::{Shift, ShiftSummary},
    user::{User, UserSummary},
};
use crate::models::{
    AdminUpdateUserInput, AttendanceNotesInput, CreatedId, LoginInput, LoginResponse, RegisterInput, RoleInput,
    ScheduleInput, ShiftInput, UpdatePasswordInput, UpdateProfileInput,
};
use crate::utils::pagination::PaginationMeta;
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi, openapi};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Attendance API",
        version = "1.0.0",
        description = r#"
## Employee Attendance Tracking

Backend for recording when employees start and finish their work day against
an assigned shift.

### Key Features
- **Shifts**: named time windows such as "Morning 08:00-16:00"
- **Schedules**: one shift per employee per calendar day
- **Attendance**: daily check-in and check-out with optional notes, plus reports
- **Users and roles**: registration, login, profile self-service and role administration

### Security
All endpoints except `/auth/*` and `/health` require a **JWT Bearer** token.
Routes under `/admin` are restricted to the **Admin** role; routes under `/user`
accept **Employee** and **Admin**.

### Response Format
Every response is wrapped as `{success, message, data?, meta?}`. List
endpoints accept `page` and `limit` and report pagination in `meta`.
"#,
    ),
    paths(
        crate::api::health::health,

        crate::auth::handlers::register,
        crate::auth::handlers::login,

        crate::api::shift::create_shift,
        crate::api::shift::list_shifts,
        crate::api::shift::shift_catalog,
        crate::api::shift::get_shift,
        crate::api::shift::update_shift,
        crate::api::shift::delete_shift,

        crate::api::schedule::create_schedule,
        crate::api::schedule::list_schedules,
        crate::api::schedule::update_schedule,
        crate::api::schedule::delete_schedule,
        crate::api::schedule::user_schedules,
        crate::api::schedule::my_schedules,

        crate::api::attendance::check_in,
        crate::api::attendance::check_out,
        crate::api::attendance::my_attendance,
        crate::api::attendance::user_attendance,
        crate::api::attendance::attendance_report,

        crate::api::user::list_users,
        crate::api::user::get_user,
        crate::api::user::update_user,
        crate::api::user::delete_user,

        crate::api::role::create_role,
        crate::api::role::list_roles,
        crate::api::role::get_role,
        crate::api::role::update_role,
        crate::api::role::delete_role,

        crate::api::profile::get_profile,
        crate::api::profile::update_profile,
        crate::api::profile::update_password
    ),
    components(
        schemas(
            RegisterInput,
            LoginInput,
            LoginResponse,
            CreatedId,
            ShiftInput,
            ScheduleInput,
            AttendanceNotesInput,
            AdminUpdateUserInput,
            UpdateProfileInput,
            UpdatePasswordInput,
            RoleInput,
            Shift,
            ShiftSummary,
            Schedule,
            Attendance,
            CheckInReceipt,
            CheckOutReceipt,
            User,
            UserSummary,
            Role,
            PaginationMeta
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Auth", description = "Registration and login"),
        (name = "Shift", description = "Shift management APIs"),
        (name = "Schedule", description = "Shift assignment APIs"),
        (name = "Attendance", description = "Check-in, check-out and attendance reports"),
        (name = "User", description = "User administration APIs"),
        (name = "Role", description = "Role administration APIs"),
        (name = "Profile", description = "Self-service account APIs"),
        (name = "Health", description = "Liveness check"),
    )
)]
pub struct ApiDoc;

/// Registers the `bearer_auth` scheme referenced by protected paths.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
    }
}
