use crate::{
    models::{ApiError, BattleMap, ErrorResponse},
    routes::auth_middleware::UserId,
    services::battlemap_service::StoreError,
    AppState,
};
use axum::{
    extract::{Extension, Path, State},
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use chrono::{DateTime, Utc};
use std::sync::Arc;
use tracing::{debug, error};

const HTTP_DATE_FORMAT: &str = "%a, %d %b %Y %H:%M:%S GMT";

fn store_error(id: &str, e: StoreError) -> ApiError {
    let status = match e {
        StoreError::Forbidden => StatusCode::FORBIDDEN,
        StoreError::NotExists => StatusCode::NOT_FOUND,
    };
    ErrorResponse::reply(status, format!("Battle map '{}': {}", id, e))
}

/// True when a cached copy from `if_modified_since` is still current
fn is_fresh(if_modified_since: &str, last_modified: DateTime<Utc>) -> bool {
    match DateTime::parse_from_rfc2822(if_modified_since) {
        // HTTP dates have second precision
        Ok(cached) => cached.timestamp() >= last_modified.timestamp(),
        Err(e) => {
            debug!("Ignoring unparsable If-Modified-Since '{}': {}", if_modified_since, e);
            false
        }
    }
}

/// Fetch a stored battle map
pub async fn get_battlemap(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    headers: HeaderMap,
) -> Result<Response, ApiError> {

    let (map, last_modified) = state.store.load(&id).await.map_err(|e| store_error(&id, e))?;

    if let Some(since) = headers.get(header::IF_MODIFIED_SINCE).and_then(|v| v.to_str().ok()) {
        if is_fresh(since, last_modified) {
            return Ok(StatusCode::NOT_MODIFIED.into_response());
        }
    }

    Ok((
        [
            (header::LAST_MODIFIED, last_modified.format(HTTP_DATE_FORMAT).to_string()),
            (header::CACHE_CONTROL, "private; must-revalidate".to_string()),
        ],
        Json(map),
    )
        .into_response())
}

/// Replace a stored battle map, creating it for the caller when absent
pub async fn update_battlemap(
    State(state): State<Arc<AppState>>,
    Extension(UserId(user_id)): Extension<UserId>,
    Path(id): Path<String>,
    Json(mut map): Json<BattleMap>,
) -> Result<StatusCode, ApiError> {

    if map.id.is_empty() {
        map.id = id.clone();
    } else if map.id != id {
        error!("Battle map id '{}' in body does not match path '{}'", map.id, id);
        return Err(ErrorResponse::reply(
            StatusCode::BAD_REQUEST,
            format!("Battle map id '{}' does not match '{}'", map.id, id),
        ));
    }

    state.store.update(&user_id, map).await.map_err(|e| store_error(&id, e))?;
    Ok(StatusCode::NO_CONTENT)
}
