use axum::{
    extract::{Request, State},
    http::StatusCode,
    middleware::Next,
    response::Response,
};
use std::sync::Arc;
use tracing::{debug, warn};
use crate::AppState;
use crate::services::auth_service::{validate_jwt, get_auth_token};

/// Identity of the caller, taken from the `sub` claim of its token
#[derive(Clone, Debug)]
pub struct UserId(pub String);

pub async fn auth_middleware(
    State(state): State<Arc<AppState>>,
    mut req: Request,
    next: Next,
) -> Result<Response, StatusCode> {

    // 1. Get the auth token from the request
    let token = match get_auth_token(&req) {
        Ok(token) => token,
        Err(e) => {
            debug!("No auth token: {}", e);
            return Err(StatusCode::UNAUTHORIZED);
        }
    };

    // 2. Validate Token
    let token_data = match validate_jwt(&token, &state.jwt_secret) {
        Ok(token_data) => token_data,
        Err(e) => {
            warn!("JWT validation failed: {}", e);
            return Err(StatusCode::UNAUTHORIZED);
        }
    };

    // 3. Expose the user id to downstream handlers
    req.extensions_mut().insert(UserId(token_data.claims.sub));

    Ok(next.run(req).await)
}
