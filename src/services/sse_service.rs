use std::{convert::Infallible, time::Duration};

use axum::response::sse::{Event, KeepAlive, Sse};
use futures::Stream;
use tokio::sync::broadcast::{self, error::RecvError};
use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;
use tracing::{info, warn};

use crate::{
    dto::sse::ServerEvent,
    services::sse_events::{EVENT_SESSION_UPDATED, session_view},
    state::SharedState,
};

/// Subscribe to the shared public SSE stream.
///
/// The returned event carries the current session view so a freshly connected renderer can draw
/// its first frame without waiting for the next action.
pub async fn subscribe_public(
    state: &SharedState,
) -> (broadcast::Receiver<ServerEvent>, Option<ServerEvent>) {
    let receiver = state.public_sse().subscribe();
    let view = session_view(state).await;
    let initial = match ServerEvent::json(EVENT_SESSION_UPDATED, &view) {
        Ok(event) => Some(event),
        Err(err) => {
            warn!(error = %err, "failed to serialize initial session view");
            None
        }
    };
    (receiver, initial)
}

/// Convert a broadcast receiver into an SSE response, forwarding events until the client
/// disconnects.
pub fn to_sse_stream(
    mut receiver: broadcast::Receiver<ServerEvent>,
    initial: Option<ServerEvent>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let (tx, rx) = mpsc::channel::<Result<Event, Infallible>>(8);

    tokio::spawn(async move {
        if let Some(payload) = initial {
            if tx.send(Ok(to_event(payload))).await.is_err() {
                return;
            }
        }

        loop {
            tokio::select! {
                _ = tx.closed() => break,
                recv_result = receiver.recv() => {
                    match recv_result {
                        Ok(payload) => {
                            if tx.send(Ok(to_event(payload))).await.is_err() {
                                break;
                            }
                        }
                        Err(RecvError::Closed) => break,
                        // Every session event is a full view; the next one catches the client up.
                        Err(RecvError::Lagged(skipped)) => {
                            warn!(skipped, "public SSE subscriber lagged");
                            continue;
                        }
                    }
                }
            }
        }

        info!("Public SSE stream disconnected");
    });

    let stream = ReceiverStream::new(rx);
    Sse::new(stream).keep_alive(
        KeepAlive::new()
            .interval(Duration::from_secs(15))
            .text("keep-alive"),
    )
}

fn to_event(payload: ServerEvent) -> Event {
    Event::default().event(payload.name).data(payload.data)
}
