use tracing::warn;

use crate::{
    error::ServiceError,
    services::sse_events::broadcast_session,
    state::{
        SharedState,
        state_machine::{SessionEvent, SessionPhase},
    },
};

/// Execute a store-backed transition: broadcast the loading overlay while `work` runs, then
/// broadcast the settled session whether the plan was applied or aborted.
pub async fn run_transition_with_broadcast<F, Fut, T>(
    state: &SharedState,
    event: SessionEvent,
    work: F,
) -> Result<T, ServiceError>
where
    F: FnOnce() -> Fut,
    Fut: std::future::Future<Output = Result<T, ServiceError>>,
{
    let result = state
        .run_transition(event, move || async move {
            broadcast_session(state).await;
            work().await
        })
        .await;
    settle(state, event, result).await
}

/// Execute a transition whose work only touches local session data, so no loading overlay is
/// broadcast.
pub async fn run_local_transition<F, Fut, T>(
    state: &SharedState,
    event: SessionEvent,
    work: F,
) -> Result<T, ServiceError>
where
    F: FnOnce() -> Fut,
    Fut: std::future::Future<Output = Result<T, ServiceError>>,
{
    let result = state.run_transition(event, work).await;
    settle(state, event, result).await
}

async fn settle<T>(
    state: &SharedState,
    event: SessionEvent,
    result: Result<(T, SessionPhase), ServiceError>,
) -> Result<T, ServiceError> {
    broadcast_session(state).await;
    match result {
        Ok((value, _next)) => Ok(value),
        Err(err) => {
            warn!(event = ?event, error = %err, "session action failed");
            Err(err)
        }
    }
}
