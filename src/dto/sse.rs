use serde::Serialize;
use utoipa::ToSchema;

/// Named payload pushed to renderers over the public stream.
#[derive(Clone, Debug)]
pub struct ServerEvent {
    /// SSE `event:` field.
    pub name: &'static str,
    /// JSON-encoded SSE `data:` field.
    pub data: String,
}

impl ServerEvent {
    /// Serialise `payload` into an event called `name`.
    pub fn json<T: Serialize>(name: &'static str, payload: &T) -> serde_json::Result<Self> {
        Ok(Self {
            name,
            data: serde_json::to_string(payload)?,
        })
    }
}

/// Payload of `system.status`, sent when the store connection comes or goes.
#[derive(Debug, Serialize, ToSchema)]
pub struct SystemStatus {
    pub degraded: bool,
}
