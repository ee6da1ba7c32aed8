use serde::Serialize;
use utoipa::ToSchema;

/// Health payload returned by the `/healthcheck` route.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    /// Health status ("ok" or "degraded").
    pub status: String,
    /// Whether a league document is loaded in memory.
    pub league_loaded: bool,
    /// Whether changes are waiting to be written to the store.
    pub unsaved_changes: bool,
}

impl HealthResponse {
    /// Build the payload from the storage and working-copy flags.
    pub fn new(degraded: bool, league_loaded: bool, unsaved_changes: bool) -> Self {
        let status = if degraded || !league_loaded {
            "degraded"
        } else {
            "ok"
        };
        Self {
            status: status.to_string(),
            league_loaded,
            unsaved_changes,
        }
    }
}
