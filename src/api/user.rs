use crate::{
    auth::auth::AuthUser,
    error::AppError,
    models::AdminUpdateUserInput,
    state::AppState,
    utils::{
        pagination::{Pagination, PaginationQuery},
        response::ApiResponse,
    },
};
use actix_web::{HttpResponse, web};
use tracing::instrument;

/// List users
#[utoipa::path(
    get,
    path = "/api/v1/admin/users",
    params(PaginationQuery),
    responses(
        (status = 200, description = "Users retrieved successfully", body = [crate::model::user::User]),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    ),
    security(("bearer_auth" = [])),
    tag = "User"
)]
pub async fn list_users(
    state: web::Data<AppState>,
    page: web::Query<PaginationQuery>,
) -> Result<HttpResponse, AppError> {
    let pagination = Pagination::from(&*page);
    let (users, total) = state.directory.list_users(pagination).await?;

    Ok(HttpResponse::Ok().json(ApiResponse::paginated(
        "Users retrieved successfully",
        users,
        pagination.meta(total),
    )))
}

/// Get a user by id
#[utoipa::path(
    get,
    path = "/api/v1/admin/users/{id}",
    params(("id" = u64, Path, description = "User ID")),
    responses(
        (status = 200, description = "User retrieved successfully", body = crate::model::user::User),
        (status = 404, description = "User not found")
    ),
    security(("bearer_auth" = [])),
    tag = "User"
)]
pub async fn get_user(state: web::Data<AppState>, path: web::Path<u64>) -> Result<HttpResponse, AppError> {
    let user = state.directory.get_user(path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::ok("User retrieved successfully", user)))
}

/// Update a user's account details and role
#[utoipa::path(
    put,
    path = "/api/v1/admin/users/{id}",
    params(("id" = u64, Path, description = "User ID")),
    request_body = AdminUpdateUserInput,
    responses(
        (status = 200, description = "User updated successfully"),
        (status = 400, description = "Validation failed or unknown role"),
        (status = 404, description = "User not found"),
        (status = 409, description = "Username or Email already exists")
    ),
    security(("bearer_auth" = [])),
    tag = "User"
)]
pub async fn update_user(
    state: web::Data<AppState>,
    path: web::Path<u64>,
    payload: web::Json<AdminUpdateUserInput>,
) -> Result<HttpResponse, AppError> {
    state.directory.update_by_admin(path.into_inner(), &payload).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::message("User updated successfully")))
}

/// Delete a user
#[utoipa::path(
    delete,
    path = "/api/v1/admin/users/{id}",
    params(("id" = u64, Path, description = "User ID")),
    responses(
        (status = 200, description = "User deleted successfully"),
        (status = 403, description = "Admins cannot delete their own account"),
        (status = 404, description = "User not found"),
        (status = 409, description = "User still has schedules or attendance records")
    ),
    security(("bearer_auth" = [])),
    tag = "User"
)]
#[instrument(name = "delete_user", skip(auth, state, path), fields(requester = auth.user_id))]
pub async fn delete_user(
    auth: AuthUser,
    state: web::Data<AppState>,
    path: web::Path<u64>,
) -> Result<HttpResponse, AppError> {
    state.directory.delete_user(auth.user_id, path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::message("User deleted successfully")))
}
