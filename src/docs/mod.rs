use utoipa::OpenApi;
use crate::models::*;

/// Health check endpoint
#[utoipa::path(
    get,
    path = "/api/health",
    responses(
        (status = 200, description = "Service is healthy", body = HealthResponse)
    )
)]
#[allow(dead_code)]
pub async fn health_check_doc() {}

/// Version information
#[utoipa::path(
    get,
    path = "/api/version-info",
    responses(
        (status = 200, description = "Versions of API and backend", body = VersionInfo)
    )
)]
#[allow(dead_code)]
pub async fn version_info_doc() {}

/// Issue an auth token
#[utoipa::path(
    post,
    path = "/api/auth/token",
    responses(
        (status = 201, description = "Token issued", body = String, content_type = "text/plain"),
        (status = 403, description = "Caller is already authorized", body = ErrorResponse)
    )
)]
#[allow(dead_code)]
pub async fn create_auth_token_doc() {}

/// Fetch a battle map
#[utoipa::path(
    get,
    path = "/api/battlemaps/{id}",
    params(("id" = String, Path, description = "Battle map id")),
    responses(
        (status = 200, description = "Current battle map", body = BattleMap),
        (status = 304, description = "Not modified since If-Modified-Since"),
        (status = 404, description = "Unknown battle map", body = ErrorResponse)
    )
)]
#[allow(dead_code)]
pub async fn get_battlemap_doc() {}

/// Create or replace a battle map
#[utoipa::path(
    put,
    path = "/api/battlemaps/{id}",
    params(("id" = String, Path, description = "Battle map id")),
    request_body = BattleMap,
    responses(
        (status = 204, description = "Battle map stored"),
        (status = 400, description = "Id in body does not match path", body = ErrorResponse),
        (status = 401, description = "Missing or invalid token"),
        (status = 403, description = "Battle map belongs to another user", body = ErrorResponse)
    )
)]
#[allow(dead_code)]
pub async fn update_battlemap_doc() {}

/// Live sessions and process resources
#[utoipa::path(
    get,
    path = "/api/diagnostics",
    responses(
        (status = 200, description = "Diagnostics", body = DiagnosticsResponse)
    )
)]
#[allow(dead_code)]
pub async fn diagnostics_doc() {}

#[derive(OpenApi)]
#[openapi(
    paths(
        health_check_doc,
        version_info_doc,
        create_auth_token_doc,
        get_battlemap_doc,
        update_battlemap_doc,
        diagnostics_doc,
    ),
    components(
        schemas(HealthResponse, VersionInfo, ErrorResponse, BattleMap, Shape, ShapeType, DiagnosticsResponse)
    ),
    tags(
        (name = "api", description = "API endpoints")
    )
)]
pub struct ApiDoc;
