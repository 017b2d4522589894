use crate::{
    handlers::{create_auth_token, diagnostics, get_battlemap, health_check, ready_check, update_battlemap, version_info},
    routes::auth_middleware::auth_middleware,
    AppState,
};
use axum::{routing::{get, post, put}, Router, middleware};
use std::sync::Arc;

/// Create API routes
pub fn create_api_routes(state: Arc<AppState>) -> Router<Arc<AppState>> {
    let protected = Router::<Arc<AppState>>::new()
        .route("/battlemaps/:id", put(update_battlemap))
        .route_layer(middleware::from_fn_with_state(state, auth_middleware)); // Applies to all routes added above

    Router::<Arc<AppState>>::new()
        .route("/health", get(health_check))
        .route("/ready", get(ready_check))
        .route("/version-info", get(version_info))
        .route("/diagnostics", get(diagnostics))
        .route("/auth/token", post(create_auth_token))
        .route("/battlemaps/:id", get(get_battlemap))
        .merge(protected)
}
