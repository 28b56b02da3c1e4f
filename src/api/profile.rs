use crate::{
    auth::auth::AuthUser,
    error::AppError,
    models::{UpdatePasswordInput, UpdateProfileInput},
    state::AppState,
    utils::response::ApiResponse,
};
use actix_web::{HttpResponse, web};
use tracing::instrument;

/// The caller's own account
#[utoipa::path(
    get,
    path = "/api/v1/user/profile",
    responses(
        (status = 200, description = "Profile retrieved successfully", body = crate::model::user::User),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "User not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Profile"
)]
pub async fn get_profile(auth: AuthUser, state: web::Data<AppState>) -> Result<HttpResponse, AppError> {
    let user = state.directory.get_user(auth.user_id).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::ok("Profile retrieved successfully", user)))
}

/// Update the caller's own account details
#[utoipa::path(
    put,
    path = "/api/v1/user/profile",
    request_body = UpdateProfileInput,
    responses(
        (status = 200, description = "Profile updated successfully"),
        (status = 400, description = "Validation failed"),
        (status = 409, description = "Username or Email already exists")
    ),
    security(("bearer_auth" = [])),
    tag = "Profile"
)]
pub async fn update_profile(
    auth: AuthUser,
    state: web::Data<AppState>,
    payload: web::Json<UpdateProfileInput>,
) -> Result<HttpResponse, AppError> {
    state.directory.update_profile(auth.user_id, &payload).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::message("Profile updated successfully")))
}

/// Change the caller's password
#[utoipa::path(
    put,
    path = "/api/v1/user/password",
    request_body = UpdatePasswordInput,
    responses(
        (status = 200, description = "Password updated successfully"),
        (status = 400, description = "New password must be at least 6 characters long"),
        (status = 401, description = "Incorrect old password")
    ),
    security(("bearer_auth" = [])),
    tag = "Profile"
)]
#[instrument(name = "update_password", skip_all, fields(user_id = auth.user_id))]
pub async fn update_password(
    auth: AuthUser,
    state: web::Data<AppState>,
    payload: web::Json<UpdatePasswordInput>,
) -> Result<HttpResponse, AppError> {
    state.directory.change_password(auth.user_id, &payload).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::message("Password updated successfully")))
}
