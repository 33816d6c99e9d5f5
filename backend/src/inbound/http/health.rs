//! Liveness and readiness probes. Unauthenticated, outside `/api/v1`.

use actix_web::{HttpResponse, get};
use serde_json::json;

/// Process is up.
#[utoipa::path(
    get,
    path = "/healthz/live",
    responses((status = 200, description = "Process is live")),
    tags = ["health"],
    operation_id = "liveness"
)]
#[get("/healthz/live")]
pub async fn live() -> HttpResponse {
    HttpResponse::Ok().json(json!({ "status": "live" }))
}

/// Process is serving traffic.
#[utoipa::path(
    get,
    path = "/healthz/ready",
    responses((status = 200, description = "Process is ready")),
    tags = ["health"],
    operation_id = "readiness"
)]
#[get("/healthz/ready")]
pub async fn ready() -> HttpResponse {
    HttpResponse::Ok().json(json!({ "status": "ready" }))
}
