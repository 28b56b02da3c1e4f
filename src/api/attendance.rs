use crate::{
    auth::auth::AuthUser,
    error::AppError,
    models::AttendanceNotesInput,
    state::AppState,
    utils::{
        date_range::{DateRange, DateRangeQuery, RangeEnd, today},
        pagination::{Pagination, PaginationQuery},
        response::ApiResponse,
    },
};
use actix_web::{HttpResponse, web};

/// Check-in endpoint
#[utoipa::path(
    post,
    path = "/api/v1/user/attendance/checkin",
    request_body(content = AttendanceNotesInput, description = "Optional notes", content_type = "application/json"),
    responses(
        (status = 200, description = "Check-in successful", body = Object, example = json!({
            "success": true,
            "message": "Check-in successful",
            "data": {"attendance_id": 31, "check_in_at": "2026-01-05T08:01:12Z"}
        })),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "No schedule found for today"),
        (status = 409, description = "User already checked in"),
        (status = 500, description = "Internal server error")
    ),
    security(("bearer_auth" = [])),
    tag = "Attendance"
)]
pub async fn check_in(
    auth: AuthUser,
    state: web::Data<AppState>,
    payload: Option<web::Json<AttendanceNotesInput>>,
) -> Result<HttpResponse, AppError> {
    let notes = payload.and_then(|p| p.into_inner().notes);
    let receipt = state.attendance.check_in(auth.user_id, notes.as_deref()).await?;

    Ok(HttpResponse::Ok().json(ApiResponse::ok("Check-in successful", receipt)))
}

/// Check-out endpoint
#[utoipa::path(
    post,
    path = "/api/v1/user/attendance/checkout",
    request_body(content = AttendanceNotesInput, description = "Optional notes", content_type = "application/json"),
    responses(
        (status = 200, description = "Check-out successful", body = Object, example = json!({
            "success": true,
            "message": "Check-out successful",
            "data": {"attendance_id": 31, "check_out_at": "2026-01-05T16:03:40Z"}
        })),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "No active check-in found to check out from"),
        (status = 409, description = "User has already checked out for the last session"),
        (status = 500, description = "Internal server error")
    ),
    security(("bearer_auth" = [])),
    tag = "Attendance"
)]
pub async fn check_out(
    auth: AuthUser,
    state: web::Data<AppState>,
    payload: Option<web::Json<AttendanceNotesInput>>,
) -> Result<HttpResponse, AppError> {
    let notes = payload.and_then(|p| p.into_inner().notes);
    let receipt = state.attendance.check_out(auth.user_id, notes.as_deref()).await?;

    Ok(HttpResponse::Ok().json(ApiResponse::ok("Check-out successful", receipt)))
}

/// The caller's own attendance history (defaults to month to date)
#[utoipa::path(
    get,
    path = "/api/v1/user/attendance/my",
    params(PaginationQuery, DateRangeQuery),
    responses(
        (status = 200, description = "Attendance records retrieved successfully", body = [crate::model::attendance::Attendance]),
        (status = 400, description = "end_date cannot be before start_date")
    ),
    security(("bearer_auth" = [])),
    tag = "Attendance"
)]
pub async fn my_attendance(
    auth: AuthUser,
    state: web::Data<AppState>,
    page: web::Query<PaginationQuery>,
    range: web::Query<DateRangeQuery>,
) -> Result<HttpResponse, AppError> {
    let pagination = Pagination::from(&*page);
    let range = DateRange::from_query(&range, RangeEnd::Today, today())?;

    let (records, total) = state.attendance.list_for_user(auth.user_id, range, pagination).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::paginated(
        "Attendance records retrieved successfully",
        records,
        pagination.meta(total),
    )))
}

/// Attendance of one user (admin view)
#[utoipa::path(
    get,
    path = "/api/v1/admin/users/{id}/attendance",
    params(("id" = u64, Path, description = "User ID"), PaginationQuery, DateRangeQuery),
    responses(
        (status = 200, description = "User attendance records retrieved successfully", body = [crate::model::attendance::Attendance]),
        (status = 404, description = "User not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Attendance"
)]
pub async fn user_attendance(
    state: web::Data<AppState>,
    path: web::Path<u64>,
    page: web::Query<PaginationQuery>,
    range: web::Query<DateRangeQuery>,
) -> Result<HttpResponse, AppError> {
    let user = state.directory.get_user(path.into_inner()).await?;
    let pagination = Pagination::from(&*page);
    let range = DateRange::from_query(&range, RangeEnd::Today, today())?;

    let (records, total) = state.attendance.list_for_user(user.id, range, pagination).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::paginated(
        "User attendance records retrieved successfully",
        records,
        pagination.meta(total),
    )))
}

/// Attendance of every user
#[utoipa::path(
    get,
    path = "/api/v1/admin/attendance/report",
    params(PaginationQuery, DateRangeQuery),
    responses(
        (status = 200, description = "Attendance report retrieved successfully", body = [crate::model::attendance::Attendance]),
        (status = 400, description = "end_date cannot be before start_date")
    ),
    security(("bearer_auth" = [])),
    tag = "Attendance"
)]
pub async fn attendance_report(
    state: web::Data<AppState>,
    page: web::Query<PaginationQuery>,
    range: web::Query<DateRangeQuery>,
) -> Result<HttpResponse, AppError> {
    let pagination = Pagination::from(&*page);
    let range = DateRange::from_query(&range, RangeEnd::Today, today())?;

    let (records, total) = state.attendance.list_all(range, pagination).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::paginated(
        "Attendance report retrieved successfully",
        records,
        pagination.meta(total),
    )))
}
