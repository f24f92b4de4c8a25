use serde::Serialize;
use utoipa::ToSchema;

/// Overall backend status.
#[derive(Debug, Serialize, ToSchema, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum HealthStatus {
    Ok,
    /// No store connection; actions needing the store answer 503.
    Degraded,
}

/// Body of the `/healthcheck` route.
#[derive(Debug, Serialize, ToSchema)]
pub struct HealthResponse {
    pub status: HealthStatus,
}

impl HealthResponse {
    pub fn new(degraded: bool) -> Self {
        let status = if degraded {
            HealthStatus::Degraded
        } else {
            HealthStatus::Ok
        };
        Self { status }
    }
}
