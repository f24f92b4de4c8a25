use std::time::Instant;

use thiserror::Error;
use uuid::Uuid;

/// Screens the session can be on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SessionPhase {
    /// Rules are displayed until the host dismisses them.
    Rules,
    /// Teams and scoreboard.
    Teams,
    /// Category picker.
    Categories,
    /// Numbers grid of the current category.
    Numbers,
    /// A question with its four options.
    Question,
}

/// Host actions that can be applied to the state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEvent {
    /// Leave the rules screen.
    DismissRules,
    /// Fetch the roster and rebuild the teams.
    DrawTeams,
    /// Change the in-memory score of a team.
    AdjustScore,
    /// Flip the lightning-round flag; `enabled` is the new value.
    ToggleLightning {
        /// Whether the lightning round is being switched on.
        enabled: bool,
    },
    /// Move on to the next round.
    StartNextRound,
    /// Open the category picker from the scoreboard.
    OpenCategories,
    /// A category was picked (by hand or drawn) and its questions loaded.
    ChooseCategory,
    /// Go back to the scoreboard.
    ViewScoreboard,
    /// A question was opened from the numbers grid.
    OpenQuestion,
    /// Leave the numbers grid for the category picker.
    BackToCategories,
    /// An option of the current question was clicked.
    SelectOption,
    /// Reveal the correct option after a wrong guess.
    RevealAnswer,
    /// Persist the used flag of the current question.
    MarkUsed,
    /// Leave the question for the numbers grid.
    BackToNumbers,
}

/// Error returned when attempting to apply an invalid transition.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid transition: {event:?} cannot be applied while in {from:?}")]
pub struct InvalidTransition {
    /// The phase the state machine was in when the invalid event was received.
    pub from: SessionPhase,
    /// The event that cannot be applied from this phase.
    pub event: SessionEvent,
}

/// Errors that can occur when planning a state machine transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlanError {
    /// A transition is already pending and must be applied or aborted.
    AlreadyPending,
    /// The requested transition is not valid from the current phase.
    InvalidTransition(InvalidTransition),
}

/// Errors that can occur when applying a planned state machine transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApplyError {
    /// No transition is currently pending.
    NoPending,
    /// Plan ID does not match the pending plan.
    IdMismatch {
        /// Expected plan ID.
        expected: PlanId,
        /// Provided plan ID.
        got: PlanId,
    },
    /// State machine phase changed since the plan was created.
    PhaseMismatch {
        /// Phase when plan was created.
        expected: SessionPhase,
        /// Current phase.
        actual: SessionPhase,
    },
    /// State machine version changed since the plan was created.
    VersionMismatch {
        /// Version when plan was created.
        expected: usize,
        /// Current version.
        actual: usize,
    },
}

/// Errors that can occur when aborting a planned state machine transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AbortError {
    /// No transition is currently pending.
    NoPending,
    /// Plan ID does not match the pending plan.
    IdMismatch {
        /// Expected plan ID.
        expected: PlanId,
        /// Provided plan ID.
        got: PlanId,
    },
}

/// Unique identifier for a planned state transition.
pub type PlanId = Uuid;

/// A planned transition that has been validated but not yet applied.
///
/// While a plan is pending the session shows its loading overlay.
#[derive(Debug, Clone)]
pub struct Plan {
    /// Unique identifier for this plan.
    pub id: PlanId,
    /// Phase the state machine is currently in.
    pub from: SessionPhase,
    /// Phase the state machine will transition to.
    pub to: SessionPhase,
    /// Event that triggered this transition.
    pub event: SessionEvent,
    /// Version number after applying this transition.
    pub version_next: usize,
    /// Timestamp when this plan was created.
    pub pending_since: Instant,
}

/// Snapshot of the current state machine state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snapshot {
    /// Current phase of the state machine.
    pub phase: SessionPhase,
    /// Version number of the state machine (increments on each transition).
    pub version: usize,
    /// Pending transition phase, if a transition is planned but not yet applied.
    pub pending: Option<SessionPhase>,
}

/// State machine driving the screens of a game night.
#[derive(Debug, Clone)]
pub struct SessionStateMachine {
    phase: SessionPhase,
    version: usize,
    pending: Option<Plan>,
}

impl Default for SessionStateMachine {
    fn default() -> Self {
        Self {
            phase: SessionPhase::Rules,
            version: 0,
            pending: None,
        }
    }
}

impl SessionStateMachine {
    /// Create a new state machine showing the rules.
    pub fn new() -> Self {
        Self::default()
    }

    /// Inspect the current phase.
    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    /// Whether a transition is in flight.
    pub fn is_loading(&self) -> bool {
        self.pending.is_some()
    }

    /// Create a snapshot of the current state machine state.
    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            phase: self.phase,
            version: self.version,
            pending: self.pending.as_ref().map(|plan| plan.to),
        }
    }

    /// Plan a transition by validating that the event can be applied from the current phase.
    /// Returns a Plan that can later be applied or aborted.
    pub fn plan(&mut self, event: SessionEvent) -> Result<Plan, PlanError> {
        if self.pending.is_some() {
            return Err(PlanError::AlreadyPending);
        }

        let next = self
            .compute_transition(event)
            .map_err(PlanError::InvalidTransition)?;

        let plan = Plan {
            id: Uuid::new_v4(),
            from: self.phase,
            to: next,
            event,
            version_next: self.version + 1,
            pending_since: Instant::now(),
        };

        self.pending = Some(plan.clone());

        Ok(plan)
    }

    /// Apply a planned transition, moving the state machine to the next phase.
    /// Returns the new phase after the transition.
    pub fn apply(&mut self, plan_id: PlanId) -> Result<SessionPhase, ApplyError> {
        let plan = self.pending.take().ok_or(ApplyError::NoPending)?;

        if plan.id != plan_id {
            let expected_plan_id = plan.id;
            self.pending = Some(plan);
            return Err(ApplyError::IdMismatch {
                expected: expected_plan_id,
                got: plan_id,
            });
        }

        if self.phase != plan.from {
            return Err(ApplyError::PhaseMismatch {
                expected: plan.from,
                actual: self.phase,
            });
        }

        if self.version + 1 != plan.version_next {
            return Err(ApplyError::VersionMismatch {
                expected: plan.version_next,
                actual: self.version + 1,
            });
        }

        self.phase = plan.to;
        self.version = plan.version_next;

        Ok(self.phase)
    }

    /// Abort a planned transition without applying it, leaving the phase unchanged.
    pub fn abort(&mut self, plan_id: PlanId) -> Result<(), AbortError> {
        let plan = self.pending.as_ref().ok_or(AbortError::NoPending)?;

        if plan.id != plan_id {
            return Err(AbortError::IdMismatch {
                expected: plan.id,
                got: plan_id,
            });
        }

        self.pending = None;
        Ok(())
    }

    /// Compute a transition from an event if the transition is valid.
    fn compute_transition(&self, event: SessionEvent) -> Result<SessionPhase, InvalidTransition> {
        use SessionEvent as E;
        use SessionPhase as P;

        let next = match (self.phase, event) {
            (P::Rules, E::DismissRules) => P::Teams,
            (P::Teams, E::DrawTeams | E::AdjustScore) => P::Teams,
            // Entering the lightning round always routes to the category picker.
            (P::Teams, E::ToggleLightning { enabled: true }) => P::Categories,
            (P::Teams, E::ToggleLightning { enabled: false }) => P::Teams,
            (P::Teams, E::StartNextRound | E::OpenCategories) => P::Categories,
            (P::Categories, E::ChooseCategory) => P::Numbers,
            (P::Categories | P::Numbers | P::Question, E::ViewScoreboard) => P::Teams,
            (P::Numbers, E::OpenQuestion) => P::Question,
            (P::Numbers, E::BackToCategories) => P::Categories,
            (P::Question, E::SelectOption | E::RevealAnswer) => P::Question,
            (P::Question, E::MarkUsed | E::BackToNumbers) => P::Numbers,
            (from, event) => return Err(InvalidTransition { from, event }),
        };

        Ok(next)
    }
}
