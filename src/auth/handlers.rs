use crate::{
    error::AppError,
    models::{CreatedId, LoginInput, LoginResponse, RegisterInput},
    state::AppState,
    utils::response::ApiResponse,
};
use actix_web::{HttpResponse, web};
use tracing::{info, instrument};

/// Register a new account
///
/// A `role_id` other than Employee is only honored while `REGISTER_ROLE_CHOICE`
/// is enabled, which is the default.
#[utoipa::path(
    post,
    path = "/api/v1/auth/register",
    request_body = RegisterInput,
    responses(
        (status = 201, description = "User registered successfully", body = Object, example = json!({
            "success": true, "message": "User registered successfully", "data": {"id": 7}
        })),
        (status = 400, description = "Validation failed or unknown role"),
        (status = 403, description = "Role choice at registration is disabled"),
        (status = 409, description = "Username or Email already exists"),
        (status = 429, description = "Too many requests"),
        (status = 500, description = "Internal server error")
    ),
    tag = "Auth"
)]
#[instrument(name = "auth_register", skip(state, input), fields(username = %input.username))]
pub async fn register(
    input: web::Json<RegisterInput>,
    state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let id = state.directory.register(&input).await?;

    Ok(HttpResponse::Created().json(ApiResponse::ok("User registered successfully", CreatedId { id })))
}

/// Log in and receive a bearer token
#[utoipa::path(
    post,
    path = "/api/v1/auth/login",
    request_body = LoginInput,
    responses(
        (status = 200, description = "Login successful", body = Object, example = json!({
            "success": true, "message": "Login successful", "data": {"token": "eyJhbGciOiJIUzI1NiJ9..."}
        })),
        (status = 400, description = "Username or password missing"),
        (status = 401, description = "Invalid username or password"),
        (status = 429, description = "Too many requests"),
        (status = 500, description = "Internal server error")
    ),
    tag = "Auth"
)]
#[instrument(name = "auth_login", skip(state, input), fields(username = %input.username))]
pub async fn login(
    input: web::Json<LoginInput>,
    state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    info!("Login request received");

    let token = state.directory.login(&input).await?;

    Ok(HttpResponse::Ok().json(ApiResponse::ok("Login successful", LoginResponse { token })))
}
