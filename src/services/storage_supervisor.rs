use std::{future::Future, sync::Arc, time::Duration};

use tokio::time::sleep;
use tracing::{info, warn};

use crate::{
    dao::{storage::StorageError, trivia_store::TriviaStore},
    services::{
        session_service,
        sse_events::{broadcast_session, broadcast_system_status},
    },
    state::SharedState,
};

const INITIAL_DELAY: Duration = Duration::from_millis(1_000);
const MAX_DELAY: Duration = Duration::from_secs(10);
const HEALTH_POLL_INTERVAL: Duration = Duration::from_secs(5);

/// Connect to the store and keep the shared state in degraded mode while it is unreachable.
///
/// Once connected the store is polled every few seconds; a failed health check drops the
/// store and starts reconnecting with exponential backoff.
pub async fn run<F, Fut>(state: SharedState, mut connect: F)
where
    F: FnMut() -> Fut + Send + 'static,
    Fut: Future<Output = Result<Arc<dyn TriviaStore>, StorageError>> + Send,
{
    let mut delay = INITIAL_DELAY;

    loop {
        match connect().await {
            Ok(store) => {
                state.install_store(store.clone()).await;
                info!("store connection established; leaving degraded mode");
                on_store_available(&state).await;
                delay = INITIAL_DELAY;

                loop {
                    sleep(HEALTH_POLL_INTERVAL).await;
                    if let Err(err) = store.health_check().await {
                        warn!(error = %err, "store health check failed; entering degraded mode");
                        state.clear_store().await;
                        broadcast_system_status(&state);
                        broadcast_session(&state).await;
                        break;
                    }
                }

                sleep(delay).await;
            }
            Err(err) => {
                warn!(error = %err, "store connection attempt failed");
                sleep(delay).await;
                delay = (delay * 2).min(MAX_DELAY);
            }
        }
    }
}

async fn on_store_available(state: &SharedState) {
    broadcast_system_status(state);
    if let Err(err) = session_service::refresh_categories(state).await {
        warn!(error = %err, "failed to load categories after connecting");
    }
    broadcast_session(state).await;
}
