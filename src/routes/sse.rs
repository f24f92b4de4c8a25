use std::convert::Infallible;

use axum::{Router, extract::State, response::sse::Sse, routing::get};
use futures::Stream;
use tracing::info;

use crate::{services::sse_service, state::SharedState};

#[utoipa::path(
    get,
    path = "/sse/public",
    tag = "sse",
    responses((status = 200, description = "Public SSE stream: `session.updated` and `system.status` events", content_type = "text/event-stream", body = String))
)]
/// Stream session updates to connected renderers, starting with the current view.
pub async fn public_stream(
    State(state): State<SharedState>,
) -> Sse<impl Stream<Item = Result<axum::response::sse::Event, Infallible>>> {
    let (receiver, initial) = sse_service::subscribe_public(&state).await;
    info!("New public SSE connection");
    sse_service::to_sse_stream(receiver, initial)
}

/// Configure the SSE endpoints.
pub fn router() -> Router<SharedState> {
    Router::<SharedState>::new().route("/sse/public", get(public_stream))
}
