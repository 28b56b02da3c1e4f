use crate::{
    auth::{auth::AuthUser, jwt::TokenError},
    error::AppError,
    model::role::BaseRole,
    state::AppState,
};
use actix_web::{
    Error, HttpMessage, ResponseError,
    body::BoxBody,
    dev::{ServiceRequest, ServiceResponse},
    http::header::AUTHORIZATION,
    middleware::Next,
    web::Data,
};
use tracing::{debug, warn};

/// Validates the bearer token and stores the caller as an [`AuthUser`].
pub async fn auth_middleware(
    req: ServiceRequest,
    next: Next<BoxBody>,
) -> Result<ServiceResponse<BoxBody>, Error> {
    let state = req
        .app_data::<Data<AppState>>()
        .ok_or_else(|| actix_web::error::ErrorInternalServerError("App state missing"))?;

    let header_value = match req.headers().get(AUTHORIZATION) {
        Some(h) => match h.to_str() {
            Ok(v) => v,
            Err(_) => return reject(req, AppError::Unauthorized("Invalid Authorization header encoding".into())),
        },
        None => return reject(req, AppError::Unauthorized("Missing Authorization header".into())),
    };

    let Some(token) = header_value.strip_prefix("Bearer ") else {
        return reject(
            req,
            AppError::Unauthorized("Authorization header must start with Bearer".into()),
        );
    };

    let claims = match state.tokens.validate(token.trim()) {
        Ok(c) => c,
        Err(e) => {
            debug!(error = %e, path = req.path(), "Token rejected");
            let message = match e {
                TokenError::Expired => "Token has expired",
                _ => "Invalid or expired token",
            };
            return reject(req, AppError::Unauthorized(message.into()));
        }
    };

    req.extensions_mut().insert(AuthUser::from(claims));

    next.call(req).await
}

/// Admin only.
pub async fn require_admin(req: ServiceRequest, next: Next<BoxBody>) -> Result<ServiceResponse<BoxBody>, Error> {
    gate(req, next, &[BaseRole::Admin]).await
}

/// Employees and admins.
pub async fn require_member(req: ServiceRequest, next: Next<BoxBody>) -> Result<ServiceResponse<BoxBody>, Error> {
    gate(req, next, &[BaseRole::Employee, BaseRole::Admin]).await
}

/// Allows the caller iff their role matches one of `allowed`, ignoring case.
/// A request that was never authenticated is refused.
pub fn authorize<R: AsRef<str>>(user: Option<&AuthUser>, allowed: &[R]) -> Result<(), AppError> {
    match user {
        Some(user) if user.has_any_role(allowed) => Ok(()),
        Some(user) => {
            warn!(
                user_id = user.user_id,
                username = %user.username,
                role = %user.role,
                "Access denied: role not permitted"
            );
            Err(AppError::Forbidden(
                "You do not have permission to access this resource".into(),
            ))
        }
        None => Err(AppError::Forbidden("Access denied".into())),
    }
}

async fn gate(req: ServiceRequest, next: Next<BoxBody>, allowed: &[BaseRole]) -> Result<ServiceResponse<BoxBody>, Error> {
    let verdict = {
        let extensions = req.extensions();
        authorize(extensions.get::<AuthUser>(), allowed)
    };

    match verdict {
        Ok(()) => next.call(req).await,
        Err(e) => reject(req, e),
    }
}

fn reject(req: ServiceRequest, err: AppError) -> Result<ServiceResponse<BoxBody>, Error> {
    Ok(req.into_response(err.error_response()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(role: &str) -> AuthUser {
        AuthUser {
            user_id: 1,
            username: "someone".into(),
            role: role.into(),
        }
    }

    #[test]
    fn role_match_ignores_case() {
        assert!(authorize(Some(&user("admin")), &[BaseRole::Admin]).is_ok());
        assert!(authorize(Some(&user("EMPLOYEE")), &[BaseRole::Employee, BaseRole::Admin]).is_ok());
    }

    #[test]
    fn other_roles_are_forbidden() {
        let err = authorize(Some(&user("Employee")), &[BaseRole::Admin]).unwrap_err();
        assert!(matches!(err, AppError::Forbidden(_)));

        let err = authorize(Some(&user("Supervisor")), &["Employee", "Admin"]).unwrap_err();
        assert!(matches!(err, AppError::Forbidden(_)));
    }

    #[test]
    fn missing_identity_fails_closed() {
        let err = authorize(None, &[BaseRole::Admin, BaseRole::Employee]).unwrap_err();
        assert!(matches!(err, AppError::Forbidden(_)));
    }
}
