use axum::Router;

use crate::state::SharedState;

pub mod docs;
pub mod health;
pub mod session;
pub mod sse;

/// Compose all route trees and attach the shared state.
pub fn router(state: SharedState) -> Router<()> {
    health::router()
        .merge(sse::router())
        .merge(session::router())
        .merge(docs::router())
        .with_state(state)
}
