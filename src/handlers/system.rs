// src/handlers/system.rs

use axum::{Json, response::IntoResponse};
use utoipa::OpenApi;

use crate::docs::ApiDoc;

#[utoipa::path(
    get,
    path = "/health",
    responses((status = 200, description = "Service is up", body = String)),
    tag = "System"
)]
pub async fn health_check() -> &'static str {
    "OK"
}

/// Serves the OpenAPI document.
pub async fn openapi_json() -> impl IntoResponse {
    Json(ApiDoc::openapi())
}
