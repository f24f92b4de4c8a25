pub mod categories;
pub mod roster;
pub mod session;
mod sse;
pub mod state_machine;
pub mod transitions;

use std::{sync::Arc, time::Duration};

use tokio::sync::{Mutex, RwLock, watch};
use tokio::time::timeout;
use tracing::warn;

use crate::{
    config::AppConfig,
    dao::trivia_store::TriviaStore,
    error::ServiceError,
    state::{session::Session, state_machine::SessionPhase},
};

pub use self::sse::SseHub;
pub use self::state_machine::{AbortError, ApplyError, Plan, PlanError, PlanId, Snapshot};
use self::state_machine::{SessionEvent, SessionStateMachine};

pub type SharedState = Arc<AppState>;

/// Capacity of the public SSE broadcast channel.
const PUBLIC_SSE_CAPACITY: usize = 16;

/// Central application state: the session, its phase machine and the store handle.
pub struct AppState {
    config: AppConfig,
    store: RwLock<Option<Arc<dyn TriviaStore>>>,
    sse: SseHub,
    machine: RwLock<SessionStateMachine>,
    session: RwLock<Session>,
    degraded: watch::Sender<bool>,
    transition_gate: Mutex<()>,
    transition_timeout: Option<Duration>,
}

impl AppState {
    /// Construct a new [`AppState`] wrapped in an [`Arc`] so it can be cloned cheaply.
    ///
    /// The application starts in degraded mode until a store is installed.
    pub fn new(config: AppConfig) -> SharedState {
        let (degraded_tx, _rx) = watch::channel(true);
        let session = Session::new(config.pinned_category.clone());
        let transition_timeout = Some(config.transition_timeout);
        Arc::new(Self {
            config,
            store: RwLock::new(None),
            sse: SseHub::new(PUBLIC_SSE_CAPACITY),
            machine: RwLock::new(SessionStateMachine::new()),
            session: RwLock::new(session),
            degraded: degraded_tx,
            transition_gate: Mutex::new(()),
            transition_timeout,
        })
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Obtain a handle to the current store, if one is installed.
    pub async fn store(&self) -> Option<Arc<dyn TriviaStore>> {
        let guard = self.store.read().await;
        guard.as_ref().cloned()
    }

    /// Obtain the current store or fail with [`ServiceError::Degraded`].
    pub async fn require_store(&self) -> Result<Arc<dyn TriviaStore>, ServiceError> {
        self.store().await.ok_or(ServiceError::Degraded)
    }

    /// Install a store implementation and leave degraded mode.
    pub async fn install_store(&self, store: Arc<dyn TriviaStore>) {
        {
            let mut guard = self.store.write().await;
            *guard = Some(store);
        }
        self.update_degraded(false);
    }

    /// Remove the current store and enter degraded mode.
    pub async fn clear_store(&self) {
        {
            let mut guard = self.store.write().await;
            guard.take();
        }
        self.update_degraded(true);
    }

    /// Current degraded flag.
    pub fn is_degraded(&self) -> bool {
        *self.degraded.borrow()
    }

    /// Set the degraded flag, returning whether it changed.
    pub fn update_degraded(&self, value: bool) -> bool {
        self.degraded.send_if_modified(|current| {
            if *current == value {
                return false;
            }
            *current = value;
            true
        })
    }

    /// Broadcast hub used for the public SSE stream.
    pub fn public_sse(&self) -> &SseHub {
        &self.sse
    }

    /// Current phase of the session state machine.
    pub async fn phase(&self) -> SessionPhase {
        self.machine.read().await.phase()
    }

    pub async fn snapshot(&self) -> Snapshot {
        let sm = self.machine.read().await;
        sm.snapshot()
    }

    /// Run `f` against the session data.
    pub async fn read_session<R>(&self, f: impl FnOnce(&Session) -> R) -> R {
        let guard = self.session.read().await;
        f(&guard)
    }

    /// Run `f` against the session data with write access.
    pub async fn with_session_mut<R>(&self, f: impl FnOnce(&mut Session) -> R) -> R {
        let mut guard = self.session.write().await;
        f(&mut guard)
    }

    /// Plan a transition to the session state machine, returning the plan.
    async fn plan_transition(&self, event: SessionEvent) -> Result<Plan, PlanError> {
        let mut sm = self.machine.write().await;
        sm.plan(event)
    }

    /// Apply the planned transition, returning the next phase.
    async fn apply_planned_transition(&self, plan_id: PlanId) -> Result<SessionPhase, ApplyError> {
        let mut sm = self.machine.write().await;
        sm.apply(plan_id)
    }

    /// Abort a planned transition of the session state machine.
    async fn abort_transition(&self, plan_id: PlanId) -> Result<(), AbortError> {
        let mut sm = self.machine.write().await;
        sm.abort(plan_id)
    }

    /// Plan `event`, run `work` while the plan is pending, then apply it on success.
    ///
    /// Work failures and timeouts abort the plan so the phase stays where it was. Actions are
    /// serialised by the transition gate, so at most one store call is in flight.
    pub async fn run_transition<F, Fut, T>(
        &self,
        event: SessionEvent,
        work: F,
    ) -> Result<(T, SessionPhase), ServiceError>
    where
        F: FnOnce() -> Fut,
        Fut: std::future::Future<Output = Result<T, ServiceError>>,
    {
        let gate = self.transition_gate.lock().await;
        let Plan { id: plan_id, .. } = self.plan_transition(event).await?;

        let work_future = work();
        let outcome = if let Some(limit) = self.transition_timeout {
            match timeout(limit, work_future).await {
                Ok(result) => result,
                Err(_) => {
                    if let Err(abort_err) = self.abort_transition(plan_id).await {
                        warn!(
                            event = ?event,
                            plan_id = %plan_id,
                            error = ?abort_err,
                            "failed to abort transition after timeout"
                        );
                    }
                    drop(gate);
                    return Err(ServiceError::Timeout);
                }
            }
        } else {
            work_future.await
        };

        match outcome {
            Ok(value) => {
                let next = self.apply_planned_transition(plan_id).await?;
                drop(gate);
                Ok((value, next))
            }
            Err(err) => {
                if let Err(abort_err) = self.abort_transition(plan_id).await {
                    warn!(
                        event = ?event,
                        plan_id = %plan_id,
                        error = ?abort_err,
                        "failed to abort transition after work error"
                    );
                }
                drop(gate);
                Err(err)
            }
        }
    }
}
