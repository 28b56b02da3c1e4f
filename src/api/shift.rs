use crate::{
    error::AppError,
    models::{CreatedId, ShiftInput},
    state::AppState,
    utils::response::ApiResponse,
};
use actix_web::{HttpResponse, web};

/// Create a shift
#[utoipa::path(
    post,
    path = "/api/v1/admin/shifts",
    request_body = ShiftInput,
    responses(
        (status = 201, description = "Shift created successfully", body = Object, example = json!({
            "success": true, "message": "Shift created successfully", "data": {"id": 1}
        })),
        (status = 400, description = "Invalid time format, use HH:MM:SS"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 500, description = "Internal server error")
    ),
    security(("bearer_auth" = [])),
    tag = "Shift"
)]
pub async fn create_shift(
    state: web::Data<AppState>,
    payload: web::Json<ShiftInput>,
) -> Result<HttpResponse, AppError> {
    let id = state.shifts.create(&payload).await?;
    Ok(HttpResponse::Created().json(ApiResponse::ok("Shift created successfully", CreatedId { id })))
}

/// List all shifts (admin)
#[utoipa::path(
    get,
    path = "/api/v1/admin/shifts",
    responses(
        (status = 200, description = "Shifts retrieved successfully", body = [crate::model::shift::Shift]),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    ),
    security(("bearer_auth" = [])),
    tag = "Shift"
)]
pub async fn list_shifts(state: web::Data<AppState>) -> Result<HttpResponse, AppError> {
    let shifts = state.shifts.list().await?;
    Ok(HttpResponse::Ok().json(ApiResponse::ok("Shifts retrieved successfully", shifts)))
}

/// Read-only shift catalog for any signed-in user
#[utoipa::path(
    get,
    path = "/api/v1/shifts",
    responses(
        (status = 200, description = "Shifts retrieved successfully", body = [crate::model::shift::Shift]),
        (status = 401, description = "Unauthorized")
    ),
    security(("bearer_auth" = [])),
    tag = "Shift"
)]
pub async fn shift_catalog(state: web::Data<AppState>) -> Result<HttpResponse, AppError> {
    list_shifts(state).await
}

/// Get a shift by id
#[utoipa::path(
    get,
    path = "/api/v1/admin/shifts/{id}",
    params(("id" = u64, Path, description = "Shift ID")),
    responses(
        (status = 200, description = "Shift retrieved successfully", body = crate::model::shift::Shift),
        (status = 404, description = "Shift not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Shift"
)]
pub async fn get_shift(state: web::Data<AppState>, path: web::Path<u64>) -> Result<HttpResponse, AppError> {
    let shift = state.shifts.get(path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::ok("Shift retrieved successfully", shift)))
}

/// Replace a shift
#[utoipa::path(
    put,
    path = "/api/v1/admin/shifts/{id}",
    params(("id" = u64, Path, description = "Shift ID")),
    request_body = ShiftInput,
    responses(
        (status = 200, description = "Shift updated successfully"),
        (status = 400, description = "Invalid time format, use HH:MM:SS"),
        (status = 404, description = "Shift not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Shift"
)]
pub async fn update_shift(
    state: web::Data<AppState>,
    path: web::Path<u64>,
    payload: web::Json<ShiftInput>,
) -> Result<HttpResponse, AppError> {
    state.shifts.update(path.into_inner(), &payload).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::message("Shift updated successfully")))
}

/// Delete a shift that no schedule uses
#[utoipa::path(
    delete,
    path = "/api/v1/admin/shifts/{id}",
    params(("id" = u64, Path, description = "Shift ID")),
    responses(
        (status = 200, description = "Shift deleted successfully"),
        (status = 404, description = "Shift not found"),
        (status = 409, description = "Shift is still referenced by user schedules")
    ),
    security(("bearer_auth" = [])),
    tag = "Shift"
)]
pub async fn delete_shift(state: web::Data<AppState>, path: web::Path<u64>) -> Result<HttpResponse, AppError> {
    state.shifts.delete(path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::message("Shift deleted successfully")))
}
