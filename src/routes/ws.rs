use crate::{websocket::{edit_handler, view_handler}, AppState};
use axum::{routing::get, Router};
use std::sync::Arc;

/// Create the WebSocket routes for editors and viewers
pub fn create_ws_routes() -> Router<Arc<AppState>> {
    Router::<Arc<AppState>>::new()
        .route("/ws/edit/:id", get(edit_handler))
        .route("/ws/view/:id", get(view_handler))
}
