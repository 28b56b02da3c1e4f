use crate::{
    api::{attendance, health, profile, role, schedule, shift, user},
    auth::{
        handlers,
        middleware::{auth_middleware, require_admin, require_member},
    },
    config::Config,
    error::AppError,
    utils::response::ApiResponse,
};
use actix_governor::{
    Governor, GovernorConfigBuilder, KeyExtractor,
    governor::{
        NotUntil,
        clock::{Clock, DefaultClock, QuantaInstant},
        middleware::NoOpMiddleware,
    },
};
use actix_web::{
    HttpResponse, HttpResponseBuilder,
    dev::{ServiceRequest, ServiceResponse},
    http::StatusCode,
    middleware::{ErrorHandlerResponse, ErrorHandlers, from_fn},
    web,
};
use anyhow::{Context, Result};
use std::{net::IpAddr, sync::Arc};

type Limiter = Arc<Governor<PeerIp, NoOpMiddleware>>;

/// Keys rate limits by the peer IP and renders rejections in the envelope.
#[derive(Debug, Clone, Copy)]
pub struct PeerIp;

impl KeyExtractor for PeerIp {
    type Key = IpAddr;
    type KeyExtractionError = AppError;

    fn extract(&self, req: &ServiceRequest) -> Result<Self::Key, Self::KeyExtractionError> {
        req.peer_addr()
            .map(|addr| addr.ip())
            .ok_or_else(|| AppError::internal("Could not identify client", "peer address unavailable"))
    }

    fn exceed_rate_limit_response(
        &self,
        negative: &NotUntil<QuantaInstant>,
        mut response: HttpResponseBuilder,
    ) -> HttpResponse {
        let wait_time = negative.wait_time_from(DefaultClock::default().now()).as_secs();
        response.json(ApiResponse::failure(
            "Too many requests",
            Some(format!("retry in {wait_time}s")),
        ))
    }
}

/// Per-IP rate limiters, built once and shared by every worker.
#[derive(Clone)]
pub struct Limiters {
    login: Limiter,
    register: Limiter,
    protected: Limiter,
}

impl Limiters {
    pub fn from_config(config: &Config) -> Result<Self> {
        Ok(Self {
            login: Arc::new(build_limiter(config.rate_login_per_min).context("login limiter")?),
            register: Arc::new(build_limiter(config.rate_register_per_min).context("register limiter")?),
            protected: Arc::new(build_limiter(config.rate_protected_per_min).context("protected limiter")?),
        })
    }
}

/// `requests_per_min` requests may burst, then one is replenished every
/// `60s / requests_per_min`.
fn build_limiter(requests_per_min: u32) -> Result<Governor<PeerIp, NoOpMiddleware>> {
    let requests_per_min = requests_per_min.max(1);
    let per_ms = (60_000 / u64::from(requests_per_min)).max(1);

    let cfg = GovernorConfigBuilder::default()
        .per_millisecond(per_ms)
        .burst_size(requests_per_min)
        .key_extractor(PeerIp)
        .finish()
        .with_context(|| format!("invalid rate limit of {requests_per_min} requests per minute"))?;

    Ok(Governor::new(&cfg))
}

fn json_config() -> web::JsonConfig {
    web::JsonConfig::default()
        .error_handler(|err, _req| AppError::validation_with("Invalid request body", err).into())
}

fn query_config() -> web::QueryConfig {
    web::QueryConfig::default()
        .error_handler(|err, _req| AppError::validation_with("Invalid query parameters", err).into())
}

fn path_config() -> web::PathConfig {
    web::PathConfig::default()
        .error_handler(|err, _req| AppError::validation_with("Invalid ID parameter", err).into())
}

async fn resource_not_found() -> Result<HttpResponse, AppError> {
    Err(AppError::NotFound("Resource not found".into()))
}

/// Replaces the framework's empty 405 body with the envelope.
fn method_not_allowed<B>(res: ServiceResponse<B>) -> actix_web::Result<ErrorHandlerResponse<B>> {
    let (req, _) = res.into_parts();
    let body = ApiResponse::failure("Method not allowed", None);
    let res = ServiceResponse::new(req, HttpResponse::MethodNotAllowed().json(body)).map_into_right_body();
    Ok(ErrorHandlerResponse::Response(res))
}

pub fn configure(cfg: &mut web::ServiceConfig, prefix: &str, limiters: &Limiters) {
    cfg.app_data(json_config())
        .app_data(query_config())
        .app_data(path_config())
        .default_service(web::to(resource_not_found));

    cfg.service(
        web::scope(prefix)
            .wrap(ErrorHandlers::new().handler(StatusCode::METHOD_NOT_ALLOWED, method_not_allowed))
            .service(web::resource("/health").route(web::get().to(health::health)))
            // Public routes
            .service(
                web::scope("/auth")
                    .service(
                        web::resource("/login")
                            .wrap(limiters.login.clone())
                            .route(web::post().to(handlers::login)),
                    )
                    .service(
                        web::resource("/register")
                            .wrap(limiters.register.clone())
                            .route(web::post().to(handlers::register)),
                    ),
            )
            // Admin routes
            .service(
                web::scope("/admin")
                    .wrap(from_fn(require_admin))
                    .wrap(from_fn(auth_middleware))
                    .wrap(limiters.protected.clone())
                    .service(
                        web::resource("/shifts")
                            .route(web::post().to(shift::create_shift))
                            .route(web::get().to(shift::list_shifts)),
                    )
                    .service(
                        web::resource("/shifts/{id}")
                            .route(web::get().to(shift::get_shift))
                            .route(web::put().to(shift::update_shift))
                            .route(web::delete().to(shift::delete_shift)),
                    )
                    .service(
                        web::resource("/schedules")
                            .route(web::post().to(schedule::create_schedule))
                            .route(web::get().to(schedule::list_schedules)),
                    )
                    .service(
                        web::resource("/schedules/{id}")
                            .route(web::put().to(schedule::update_schedule))
                            .route(web::delete().to(schedule::delete_schedule)),
                    )
                    .service(
                        web::resource("/attendance/report").route(web::get().to(attendance::attendance_report)),
                    )
                    .service(web::resource("/users").route(web::get().to(user::list_users)))
                    .service(
                        web::resource("/users/{id}")
                            .route(web::get().to(user::get_user))
                            .route(web::put().to(user::update_user))
                            .route(web::delete().to(user::delete_user)),
                    )
                    .service(web::resource("/users/{id}/schedules").route(web::get().to(schedule::user_schedules)))
                    .service(
                        web::resource("/users/{id}/attendance").route(web::get().to(attendance::user_attendance)),
                    )
                    .service(
                        web::resource("/roles")
                            .route(web::post().to(role::create_role))
                            .route(web::get().to(role::list_roles)),
                    )
                    .service(
                        web::resource("/roles/{id}")
                            .route(web::get().to(role::get_role))
                            .route(web::put().to(role::update_role))
                            .route(web::delete().to(role::delete_role)),
                    ),
            )
            // Self-service routes
            .service(
                web::scope("/user")
                    .wrap(from_fn(require_member))
                    .wrap(from_fn(auth_middleware))
                    .wrap(limiters.protected.clone())
                    .service(web::resource("/attendance/checkin").route(web::post().to(attendance::check_in)))
                    .service(web::resource("/attendance/checkout").route(web::post().to(attendance::check_out)))
                    .service(web::resource("/attendance/my").route(web::get().to(attendance::my_attendance)))
                    .service(web::resource("/schedules/my").route(web::get().to(schedule::my_schedules)))
                    .service(
                        web::resource("/profile")
                            .route(web::get().to(profile::get_profile))
                            .route(web::put().to(profile::update_profile)),
                    )
                    .service(web::resource("/password").route(web::put().to(profile::update_password))),
            )
            // Any signed-in user
            .service(
                web::resource("/shifts")
                    .wrap(from_fn(auth_middleware))
                    .wrap(limiters.protected.clone())
                    .route(web::get().to(shift::shift_catalog)),
            ),
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        repository::{Repositories, memory::MemoryStore},
        state::AppState,
        utils::{date_range::today, username_index::UsernameIndex},
    };
    use actix_web::{
        App,
        body::MessageBody,
        dev::ServiceResponse,
        http::{StatusCode, header::AUTHORIZATION},
        test::{self, TestRequest},
    };
    use serde_json::{Value, json};
    use std::net::SocketAddr;

    macro_rules! test_app {
        () => {
            test_app!(Config::for_tests())
        };
        ($config:expr) => {{
            let config: Config = $config;
            let state = web::Data::new(AppState::new(
                &config,
                Repositories::memory(Arc::new(MemoryStore::new())),
                Arc::new(UsernameIndex::default()),
            ));
            let limiters = Limiters::from_config(&config).unwrap();
            test::init_service(
                App::new()
                    .app_data(state)
                    .configure(|cfg| configure(cfg, &config.api_prefix, &limiters)),
            )
            .await
        }};
    }

    macro_rules! call {
        ($app:expr, $req:expr) => {{
            let req = $req.peer_addr(peer()).to_request();
            split(test::call_service(&$app, req).await).await
        }};
        ($app:expr, $req:expr, $token:expr) => {{
            call!($app, $req.insert_header((AUTHORIZATION, format!("Bearer {}", $token))))
        }};
    }

    /// Registers `username` with the given role (None = default) and logs in.
    macro_rules! sign_up {
        ($app:expr, $username:expr, $role_id:expr) => {{
            let (status, body) = call!(
                $app,
                TestRequest::post().uri("/api/v1/auth/register").set_json(json!({
                    "username": $username,
                    "password": "secret123",
                    "email": format!("{}@example.com", $username),
                    "role_id": $role_id,
                }))
            );
            assert_eq!(status, StatusCode::CREATED, "{body}");
            let id = body["data"]["id"].as_u64().unwrap();

            let (status, body) = call!(
                $app,
                TestRequest::post()
                    .uri("/api/v1/auth/login")
                    .set_json(json!({"username": $username, "password": "secret123"}))
            );
            assert_eq!(status, StatusCode::OK, "{body}");
            (id, body["data"]["token"].as_str().unwrap().to_string())
        }};
    }

    macro_rules! create_shift {
        ($app:expr, $token:expr) => {{
            let (status, body) = call!(
                $app,
                TestRequest::post().uri("/api/v1/admin/shifts").set_json(json!({
                    "name": "Morning", "start_time": "08:00:00", "end_time": "16:00:00"
                })),
                $token
            );
            assert_eq!(status, StatusCode::CREATED, "{body}");
            body["data"]["id"].as_u64().unwrap()
        }};
    }

    macro_rules! assign_today {
        ($app:expr, $token:expr, $user_id:expr, $shift_id:expr) => {{
            let (status, body) = call!(
                $app,
                TestRequest::post().uri("/api/v1/admin/schedules").set_json(json!({
                    "user_id": $user_id,
                    "shift_id": $shift_id,
                    "date": today().to_string(),
                })),
                $token
            );
            assert_eq!(status, StatusCode::CREATED, "{body}");
            body["data"]["id"].as_u64().unwrap()
        }};
    }

    fn peer() -> SocketAddr {
        SocketAddr::from(([127, 0, 0, 1], 40000))
    }

    async fn split<B: MessageBody>(resp: ServiceResponse<B>) -> (StatusCode, Value) {
        let status = resp.status();
        let bytes = test::read_body(resp).await;
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, body)
    }

    #[actix_web::test]
    async fn attendance_lifecycle() {
        let app = test_app!();
        let (employee_id, employee) = sign_up!(app, "jdoe", Value::Null);
        let (_, admin) = sign_up!(app, "boss", 1);

        let (status, body) = call!(app, TestRequest::post().uri("/api/v1/user/attendance/checkin"), employee);
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(body["message"], "No schedule found for today");

        let shift_id = create_shift!(app, admin);
        assign_today!(app, admin, employee_id, shift_id);

        let (status, body) = call!(
            app,
            TestRequest::post()
                .uri("/api/v1/user/attendance/checkin")
                .set_json(json!({"notes": "on site"})),
            employee
        );
        assert_eq!(status, StatusCode::OK, "{body}");
        assert_eq!(body["message"], "Check-in successful");
        let attendance_id = body["data"]["attendance_id"].as_u64().unwrap();

        let (status, _) = call!(app, TestRequest::post().uri("/api/v1/user/attendance/checkin"), employee);
        assert_eq!(status, StatusCode::CONFLICT);

        let (status, body) = call!(app, TestRequest::post().uri("/api/v1/user/attendance/checkout"), employee);
        assert_eq!(status, StatusCode::OK, "{body}");
        assert_eq!(body["data"]["attendance_id"].as_u64(), Some(attendance_id));

        let (status, body) = call!(app, TestRequest::post().uri("/api/v1/user/attendance/checkout"), employee);
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body["message"], "User has already checked out for the last session");

        let (status, body) = call!(app, TestRequest::get().uri("/api/v1/user/attendance/my"), employee);
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["meta"]["total_items"], 1);
        assert_eq!(body["data"][0]["notes"], "on site");
    }

    #[actix_web::test]
    async fn checkout_without_checkin_is_not_found() {
        let app = test_app!();
        let (_, employee) = sign_up!(app, "jdoe", Value::Null);

        let (status, body) = call!(app, TestRequest::post().uri("/api/v1/user/attendance/checkout"), employee);
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["success"], false);
    }

    #[actix_web::test]
    async fn scheduled_shift_cannot_be_deleted_until_unscheduled() {
        let app = test_app!();
        let (employee_id, _) = sign_up!(app, "jdoe", Value::Null);
        let (_, admin) = sign_up!(app, "boss", 1);
        let shift_id = create_shift!(app, admin);
        let schedule_id = assign_today!(app, admin, employee_id, shift_id);

        let shift_uri = format!("/api/v1/admin/shifts/{shift_id}");
        let (status, _) = call!(app, TestRequest::delete().uri(&shift_uri), admin);
        assert_eq!(status, StatusCode::CONFLICT);

        let (status, _) = call!(
            app,
            TestRequest::delete().uri(&format!("/api/v1/admin/schedules/{schedule_id}")),
            admin
        );
        assert_eq!(status, StatusCode::OK);

        let (status, _) = call!(app, TestRequest::delete().uri(&shift_uri), admin);
        assert_eq!(status, StatusCode::OK);

        let (status, _) = call!(app, TestRequest::get().uri(&shift_uri), admin);
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[actix_web::test]
    async fn second_schedule_on_the_same_day_conflicts() {
        let app = test_app!();
        let (employee_id, _) = sign_up!(app, "jdoe", Value::Null);
        let (_, admin) = sign_up!(app, "boss", 1);
        let shift_id = create_shift!(app, admin);
        assign_today!(app, admin, employee_id, shift_id);

        let (status, body) = call!(
            app,
            TestRequest::post().uri("/api/v1/admin/schedules").set_json(json!({
                "user_id": employee_id,
                "shift_id": shift_id,
                "date": today().to_string(),
            })),
            admin
        );
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body["message"], "User already has a schedule on this date");
    }

    #[actix_web::test]
    async fn admin_cannot_delete_self() {
        let app = test_app!();
        let (admin_id, admin) = sign_up!(app, "boss", 1);

        let (status, body) = call!(
            app,
            TestRequest::delete().uri(&format!("/api/v1/admin/users/{admin_id}")),
            admin
        );
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(body["message"], "You cannot delete your own account");
    }

    #[actix_web::test]
    async fn route_groups_enforce_identity_and_role() {
        let app = test_app!();
        let (_, employee) = sign_up!(app, "jdoe", Value::Null);

        let (status, body) = call!(app, TestRequest::get().uri("/api/v1/admin/users"));
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["message"], "Missing Authorization header");

        let (status, _) = call!(app, TestRequest::get().uri("/api/v1/admin/users"), "not-a-token");
        assert_eq!(status, StatusCode::UNAUTHORIZED);

        let (status, _) = call!(app, TestRequest::get().uri("/api/v1/admin/users"), employee);
        assert_eq!(status, StatusCode::FORBIDDEN);

        let (status, body) = call!(app, TestRequest::get().uri("/api/v1/shifts"), employee);
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"], json!([]));

        let (status, body) = call!(app, TestRequest::get().uri("/api/v1/user/profile"), employee);
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["username"], "jdoe");
        assert!(body["data"].get("password_hash").is_none());
    }

    #[actix_web::test]
    async fn malformed_input_renders_the_envelope() {
        let app = test_app!();
        let (_, admin) = sign_up!(app, "boss", 1);

        let (status, body) = call!(
            app,
            TestRequest::post()
                .uri("/api/v1/auth/login")
                .insert_header(("content-type", "application/json"))
                .set_payload("{not json")
        );
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["success"], false);
        assert_eq!(body["message"], "Invalid request body");

        let (status, body) = call!(app, TestRequest::get().uri("/api/v1/admin/shifts/abc"), admin);
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["message"], "Invalid ID parameter");

        let (status, body) = call!(
            app,
            TestRequest::get().uri("/api/v1/admin/attendance/report?start_date=2026-02-10&end_date=2026-02-01"),
            admin
        );
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["message"], "end_date cannot be before start_date");
    }

    #[actix_web::test]
    async fn health_is_public() {
        let app = test_app!();
        let (status, body) = call!(app, TestRequest::get().uri("/api/v1/health"));
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["status"], "UP");
    }

    #[actix_web::test]
    async fn unknown_routes_and_methods_render_the_envelope() {
        let app = test_app!();

        let (status, body) = call!(app, TestRequest::get().uri("/api/v1/nope"));
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body, json!({"success": false, "message": "Resource not found"}));

        let (status, body) = call!(app, TestRequest::get().uri("/elsewhere"));
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["success"], false);

        let (status, body) = call!(app, TestRequest::patch().uri("/api/v1/health"));
        assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(body, json!({"success": false, "message": "Method not allowed"}));

        let (status, body) = call!(app, TestRequest::get().uri("/api/v1/auth/login"));
        assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(body["message"], "Method not allowed");
    }

    #[actix_web::test]
    async fn rate_limited_requests_render_the_envelope() {
        let mut config = Config::for_tests();
        config.rate_login_per_min = 2;
        let app = test_app!(config);

        let login = || {
            TestRequest::post()
                .uri("/api/v1/auth/login")
                .set_json(json!({"username": "ghost", "password": "whatever"}))
        };

        for _ in 0..2 {
            let (status, _) = call!(app, login());
            assert_eq!(status, StatusCode::UNAUTHORIZED);
        }

        let (status, body) = call!(app, login());
        assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(body["success"], false);
        assert_eq!(body["message"], "Too many requests");
        assert!(body["data"].as_str().unwrap().starts_with("retry in "));
    }

    #[actix_web::test]
    async fn registration_can_be_limited_to_employees() {
        let mut config = Config::for_tests();
        config.register_role_choice = false;
        let app = test_app!(config);

        let (status, body) = call!(
            app,
            TestRequest::post().uri("/api/v1/auth/register").set_json(json!({
                "username": "boss",
                "password": "secret123",
                "email": "boss@example.com",
                "role_id": 1,
            }))
        );
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(body["message"], "Choosing a role at registration is disabled");

        let (_, token) = sign_up!(app, "jdoe", 2);
        let (status, _) = call!(app, TestRequest::get().uri("/api/v1/admin/users"), token);
        assert_eq!(status, StatusCode::FORBIDDEN);
    }

    #[actix_web::test]
    async fn page_past_the_end_is_empty_but_keeps_the_total() {
        let app = test_app!();
        let (_, admin) = sign_up!(app, "boss", 1);
        sign_up!(app, "jdoe", Value::Null);
        sign_up!(app, "erin", Value::Null);

        let (status, body) = call!(app, TestRequest::get().uri("/api/v1/admin/users?page=2&limit=2"), admin);
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"].as_array().unwrap().len(), 1);
        assert_eq!(
            body["meta"],
            json!({"current_page": 2, "per_page": 2, "total_items": 3, "total_pages": 2})
        );

        let (status, body) = call!(app, TestRequest::get().uri("/api/v1/admin/users?page=3&limit=2"), admin);
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"], json!([]));
        assert_eq!(body["meta"]["total_items"], 3);
        assert_eq!(body["meta"]["current_page"], 3);
    }

    #[test]
    fn zero_rate_is_clamped_instead_of_failing() {
        assert!(build_limiter(0).is_ok());
        assert!(build_limiter(120_000).is_ok());
    }
}
