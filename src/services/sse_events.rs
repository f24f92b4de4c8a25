use serde::Serialize;
use tracing::{debug, warn};

use crate::{
    dto::{session::SessionView, sse::SystemStatus},
    state::SharedState,
};

pub(crate) const EVENT_SESSION_UPDATED: &str = "session.updated";
const EVENT_SYSTEM_STATUS: &str = "system.status";

/// Broadcast the current session view to every public subscriber.
pub async fn broadcast_session(state: &SharedState) {
    let view = session_view(state).await;
    publish(state, EVENT_SESSION_UPDATED, &view);
}

/// Broadcast whether the backend is currently running without a store.
pub fn broadcast_system_status(state: &SharedState) {
    let payload = SystemStatus {
        degraded: state.is_degraded(),
    };
    publish(state, EVENT_SYSTEM_STATUS, &payload);
}

/// Project the shared state into the view sent to renderers.
pub async fn session_view(state: &SharedState) -> SessionView {
    let snapshot = state.snapshot().await;
    let degraded = state.is_degraded();
    let max_round = state.config().max_round;
    state
        .read_session(|session| SessionView::build(session, &snapshot, degraded, max_round))
        .await
}

fn publish(state: &SharedState, event: &'static str, payload: &impl Serialize) {
    match state.public_sse().publish(event, payload) {
        Ok(receivers) => debug!(event, receivers, "public event sent"),
        Err(err) => warn!(event, error = %err, "failed to serialize public SSE payload"),
    }
}
