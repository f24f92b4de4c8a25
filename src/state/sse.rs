use serde::Serialize;
use tokio::sync::broadcast;

use crate::dto::sse::ServerEvent;

/// Fan-out of session events to every connected renderer.
pub struct SseHub {
    sender: broadcast::Sender<ServerEvent>,
}

impl SseHub {
    /// Hub keeping up to `capacity` undelivered events per subscriber.
    pub fn new(capacity: usize) -> Self {
        let (sender, _receiver) = broadcast::channel(capacity);
        Self { sender }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<ServerEvent> {
        self.sender.subscribe()
    }

    /// Serialise `payload` as event `name` and send it, returning how many renderers got it.
    ///
    /// Having no renderer connected is not an error.
    pub fn publish<T: Serialize>(&self, name: &'static str, payload: &T) -> serde_json::Result<usize> {
        let event = ServerEvent::json(name, payload)?;
        Ok(self.sender.send(event).unwrap_or(0))
    }
}
