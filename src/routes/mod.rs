pub mod api;
pub mod auth_middleware;
pub mod ws;

pub use api::create_api_routes;
pub use ws::create_ws_routes;

use crate::{docs::ApiDoc, AppState};
use axum::{http::HeaderValue, Router};
use std::{path::Path, sync::Arc};
use tower_http::{
    cors::{AllowOrigin, Any, CorsLayer},
    services::{ServeDir, ServeFile},
    trace::TraceLayer,
};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

/// Assemble the complete application router
pub fn create_router(state: Arc<AppState>) -> Router {
    let public_dir = state.config.public_dir.clone();
    let index = Path::new(&public_dir).join("index.html");

    let origins = state.config.cors_origin_list();
    let allow_origin = if origins.iter().any(|o| o == "*") {
        AllowOrigin::any()
    } else {
        AllowOrigin::list(origins.iter().filter_map(|o| o.parse::<HeaderValue>().ok()))
    };
    let cors = CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        // Mount API routes
        .nest("/api", create_api_routes(state.clone()))
        .merge(create_ws_routes())
        // Mount Swagger UI
        .merge(SwaggerUi::new("/swagger").url("/api-docs/openapi.json", ApiDoc::openapi()))
        // The web app routes editor and viewer paths itself
        .nest_service("/edit", ServeFile::new(&index))
        .nest_service("/view", ServeFile::new(&index))
        .fallback_service(ServeDir::new(&public_dir))
        .layer(cors)
        // Add tracing layer
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
