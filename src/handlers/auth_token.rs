use crate::{models::{ApiError, ErrorResponse}, services::auth_service, AppState};
use axum::{
    extract::{Request, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
};
use std::sync::Arc;
use tracing::{error, warn};

/// Issue an auth token to an anonymous caller
pub async fn create_auth_token(
    State(state): State<Arc<AppState>>,
    req: Request,
) -> Result<Response, ApiError> {

    // Callers that already hold a valid token keep their identity
    if auth_service::get_user_id(&req, &state.jwt_secret).is_ok() {
        warn!("Token requested by an already authorized caller");
        return Err(ErrorResponse::reply(StatusCode::FORBIDDEN, "Already authorized"));
    }

    let (_user_id, token) = auth_service::create_token(&state.jwt_secret, state.config.token_ttl_secs)
        .map_err(|e| {
            error!("Failed to create auth token: {}", e);
            ErrorResponse::reply(StatusCode::INTERNAL_SERVER_ERROR, "Failed to create auth token")
        })?;

    Ok((StatusCode::CREATED, [(header::CONTENT_TYPE, "text/plain")], token).into_response())
}
