use crate::{
    auth::auth::AuthUser,
    error::AppError,
    models::{CreatedId, ScheduleInput},
    state::AppState,
    utils::{
        date_range::{DateRange, DateRangeQuery, RangeEnd, today},
        pagination::{Pagination, PaginationQuery},
        response::ApiResponse,
    },
};
use actix_web::{HttpResponse, web};

/// Assign a shift to a user for one day
#[utoipa::path(
    post,
    path = "/api/v1/admin/schedules",
    request_body = ScheduleInput,
    responses(
        (status = 201, description = "Schedule created successfully", body = Object, example = json!({
            "success": true, "message": "Schedule created successfully", "data": {"id": 12}
        })),
        (status = 400, description = "Invalid date or unknown user/shift"),
        (status = 409, description = "User already has a schedule on this date")
    ),
    security(("bearer_auth" = [])),
    tag = "Schedule"
)]
pub async fn create_schedule(
    state: web::Data<AppState>,
    payload: web::Json<ScheduleInput>,
) -> Result<HttpResponse, AppError> {
    let id = state.schedules.create(&payload).await?;
    Ok(HttpResponse::Created().json(ApiResponse::ok("Schedule created successfully", CreatedId { id })))
}

/// All schedules in a date range (defaults to the current month)
#[utoipa::path(
    get,
    path = "/api/v1/admin/schedules",
    params(PaginationQuery, DateRangeQuery),
    responses(
        (status = 200, description = "Schedules retrieved successfully", body = [crate::model::schedule::Schedule]),
        (status = 400, description = "end_date cannot be before start_date")
    ),
    security(("bearer_auth" = [])),
    tag = "Schedule"
)]
pub async fn list_schedules(
    state: web::Data<AppState>,
    page: web::Query<PaginationQuery>,
    range: web::Query<DateRangeQuery>,
) -> Result<HttpResponse, AppError> {
    let pagination = Pagination::from(&*page);
    let range = DateRange::from_query(&range, RangeEnd::EndOfMonth, today())?;

    let (schedules, total) = state.schedules.list_all(range, pagination).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::paginated(
        "Schedules retrieved successfully",
        schedules,
        pagination.meta(total),
    )))
}

/// Replace a schedule
#[utoipa::path(
    put,
    path = "/api/v1/admin/schedules/{id}",
    params(("id" = u64, Path, description = "Schedule ID")),
    request_body = ScheduleInput,
    responses(
        (status = 200, description = "Schedule updated successfully"),
        (status = 404, description = "Schedule not found"),
        (status = 409, description = "User already has a schedule on this date")
    ),
    security(("bearer_auth" = [])),
    tag = "Schedule"
)]
pub async fn update_schedule(
    state: web::Data<AppState>,
    path: web::Path<u64>,
    payload: web::Json<ScheduleInput>,
) -> Result<HttpResponse, AppError> {
    state.schedules.update(path.into_inner(), &payload).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::message("Schedule updated successfully")))
}

#[utoipa::path(
    delete,
    path = "/api/v1/admin/schedules/{id}",
    params(("id" = u64, Path, description = "Schedule ID")),
    responses(
        (status = 200, description = "Schedule deleted successfully"),
        (status = 404, description = "Schedule not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Schedule"
)]
pub async fn delete_schedule(state: web::Data<AppState>, path: web::Path<u64>) -> Result<HttpResponse, AppError> {
    state.schedules.delete(path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::message("Schedule deleted successfully")))
}

/// Schedules of one user (admin view)
#[utoipa::path(
    get,
    path = "/api/v1/admin/users/{id}/schedules",
    params(("id" = u64, Path, description = "User ID"), PaginationQuery, DateRangeQuery),
    responses(
        (status = 200, description = "User schedules retrieved successfully", body = [crate::model::schedule::Schedule]),
        (status = 404, description = "User not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Schedule"
)]
pub async fn user_schedules(
    state: web::Data<AppState>,
    path: web::Path<u64>,
    page: web::Query<PaginationQuery>,
    range: web::Query<DateRangeQuery>,
) -> Result<HttpResponse, AppError> {
    let user = state.directory.get_user(path.into_inner()).await?;
    let pagination = Pagination::from(&*page);
    let range = DateRange::from_query(&range, RangeEnd::EndOfMonth, today())?;

    let (schedules, total) = state.schedules.list_for_user(user.id, range, pagination).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::paginated(
        "User schedules retrieved successfully",
        schedules,
        pagination.meta(total),
    )))
}

/// The caller's own schedules
#[utoipa::path(
    get,
    path = "/api/v1/user/schedules/my",
    params(PaginationQuery, DateRangeQuery),
    responses(
        (status = 200, description = "Schedules retrieved successfully", body = [crate::model::schedule::Schedule]),
        (status = 400, description = "end_date cannot be before start_date")
    ),
    security(("bearer_auth" = [])),
    tag = "Schedule"
)]
pub async fn my_schedules(
    auth: AuthUser,
    state: web::Data<AppState>,
    page: web::Query<PaginationQuery>,
    range: web::Query<DateRangeQuery>,
) -> Result<HttpResponse, AppError> {
    let pagination = Pagination::from(&*page);
    let range = DateRange::from_query(&range, RangeEnd::EndOfMonth, today())?;

    let (schedules, total) = state.schedules.list_for_user(auth.user_id, range, pagination).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::paginated(
        "Schedules retrieved successfully",
        schedules,
        pagination.meta(total),
    )))
}
