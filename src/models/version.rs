use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Version information of the running backend
#[derive(Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct VersionInfo {
    /// The version string of the API.
    pub api_version: String,
    /// The version string of the backend component.
    pub version: String,
    /// Git commit hash of the backend code.
    pub commit: String,
}
