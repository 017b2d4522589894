use axum::Json;
use crate::models::VersionInfo;

pub const API_VERSION: &str = "1.0.0";

/// Version information endpoint
pub async fn version_info() -> Json<VersionInfo> {
    Json(VersionInfo {
        api_version: API_VERSION.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        commit: option_env!("GIT_COMMIT").unwrap_or("unknown").to_string(),
    })
}
