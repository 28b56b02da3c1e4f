use crate::{
    error::AppError,
    models::{CreatedId, RoleInput},
    state::AppState,
    utils::response::ApiResponse,
};
use actix_web::{HttpResponse, web};

/// Create a role
#[utoipa::path(
    post,
    path = "/api/v1/admin/roles",
    request_body = RoleInput,
    responses(
        (status = 201, description = "Role created successfully", body = Object, example = json!({
            "success": true, "message": "Role created successfully", "data": {"id": 3}
        })),
        (status = 400, description = "Role name must be between 3 and 50 characters"),
        (status = 409, description = "Role already exists")
    ),
    security(("bearer_auth" = [])),
    tag = "Role"
)]
pub async fn create_role(
    state: web::Data<AppState>,
    payload: web::Json<RoleInput>,
) -> Result<HttpResponse, AppError> {
    let id = state.directory.create_role(&payload.name).await?;
    Ok(HttpResponse::Created().json(ApiResponse::ok("Role created successfully", CreatedId { id })))
}

/// List roles
#[utoipa::path(
    get,
    path = "/api/v1/admin/roles",
    responses((status = 200, description = "Roles retrieved successfully", body = [crate::model::role::Role])),
    security(("bearer_auth" = [])),
    tag = "Role"
)]
pub async fn list_roles(state: web::Data<AppState>) -> Result<HttpResponse, AppError> {
    let roles = state.directory.list_roles().await?;
    Ok(HttpResponse::Ok().json(ApiResponse::ok("Roles retrieved successfully", roles)))
}

/// Get a role by id
#[utoipa::path(
    get,
    path = "/api/v1/admin/roles/{id}",
    params(("id" = u64, Path, description = "Role ID")),
    responses(
        (status = 200, description = "Role retrieved successfully", body = crate::model::role::Role),
        (status = 404, description = "Role not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Role"
)]
pub async fn get_role(state: web::Data<AppState>, path: web::Path<u64>) -> Result<HttpResponse, AppError> {
    let role = state.directory.get_role(path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::ok("Role retrieved successfully", role)))
}

/// Rename a role
#[utoipa::path(
    put,
    path = "/api/v1/admin/roles/{id}",
    params(("id" = u64, Path, description = "Role ID")),
    request_body = RoleInput,
    responses(
        (status = 200, description = "Role updated successfully"),
        (status = 403, description = "Base roles cannot be modified"),
        (status = 404, description = "Role not found"),
        (status = 409, description = "Role already exists")
    ),
    security(("bearer_auth" = [])),
    tag = "Role"
)]
pub async fn update_role(
    state: web::Data<AppState>,
    path: web::Path<u64>,
    payload: web::Json<RoleInput>,
) -> Result<HttpResponse, AppError> {
    state.directory.update_role(path.into_inner(), &payload.name).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::message("Role updated successfully")))
}

/// Delete a role
#[utoipa::path(
    delete,
    path = "/api/v1/admin/roles/{id}",
    params(("id" = u64, Path, description = "Role ID")),
    responses(
        (status = 200, description = "Role deleted successfully"),
        (status = 403, description = "Base roles cannot be deleted"),
        (status = 404, description = "Role not found"),
        (status = 409, description = "Role is still assigned to users")
    ),
    security(("bearer_auth" = [])),
    tag = "Role"
)]
pub async fn delete_role(state: web::Data<AppState>, path: web::Path<u64>) -> Result<HttpResponse, AppError> {
    state.directory.delete_role(path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::message("Role deleted successfully")))
}
