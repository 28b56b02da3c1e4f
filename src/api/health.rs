use crate::utils::response::ApiResponse;
use actix_web::HttpResponse;
use serde_json::json;

/// Liveness check
#[utoipa::path(
    get,
    path = "/api/v1/health",
    responses((status = 200, description = "Service is up", body = Object, example = json!({
        "success": true, "message": "Service is healthy", "data": {"status": "UP"}
    }))),
    tag = "Health"
)]
pub async fn health() -> HttpResponse {
    HttpResponse::Ok().json(ApiResponse::ok("Service is healthy", json!({"status": "UP"})))
}
