use serde::Serialize;
use utoipa::ToSchema;

use crate::state::state_machine::SessionPhase;

/// Screen exposed to renderers (REST/SSE).
#[derive(Debug, Serialize, ToSchema, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum VisiblePhase {
    /// Rules overlay before the game starts.
    Rules,
    /// Teams and scoreboard.
    Teams,
    /// Category picker.
    Categories,
    /// Numbers grid of the current category.
    Numbers,
    /// Question with its options.
    Question,
}

impl From<SessionPhase> for VisiblePhase {
    fn from(value: SessionPhase) -> Self {
        match value {
            SessionPhase::Rules => VisiblePhase::Rules,
            SessionPhase::Teams => VisiblePhase::Teams,
            SessionPhase::Categories => VisiblePhase::Categories,
            SessionPhase::Numbers => VisiblePhase::Numbers,
            SessionPhase::Question => VisiblePhase::Question,
        }
    }
}
