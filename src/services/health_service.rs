use tracing::warn;

use crate::{dto::health::HealthResponse, state::SharedState};

/// Report whether the store is reachable, logging the failure when it is not.
pub async fn health_status(state: &SharedState) -> HealthResponse {
    let reachable = match state.require_store().await {
        Ok(store) => match store.health_check().await {
            Ok(()) => true,
            Err(err) => {
                warn!(error = %err, "store health check failed");
                false
            }
        },
        Err(_) => {
            warn!("store unavailable (degraded mode)");
            false
        }
    };

    HealthResponse::new(!reachable || state.is_degraded())
}
