use std::time::Instant;

use tokio::time::timeout;
use tracing::{debug, info, warn};

use crate::{
    dao::trivia_store::TriviaStore,
    dto::session::SessionView,
    error::ServiceError,
    services::sse_events::session_view,
    state::{
        SharedState,
        categories::CategoryBoard,
        roster::{TeamId, group_into_teams},
        session::{OptionLetter, QuestionId, QuestionSummary, Session},
        state_machine::{InvalidTransition, SessionEvent, SessionPhase},
        transitions::{run_local_transition, run_transition_with_broadcast},
    },
};

/// Current view of the session.
pub async fn view(state: &SharedState) -> SessionView {
    session_view(state).await
}

/// Fetch the themes and rebuild the category board.
///
/// Runs outside the phase machine; called when a store becomes available.
pub async fn refresh_categories(state: &SharedState) -> Result<usize, ServiceError> {
    let store = state.require_store().await?;
    load_categories(state, store.as_ref()).await
}

/// Leave the rules screen.
pub async fn dismiss_rules(state: &SharedState) -> Result<SessionView, ServiceError> {
    run_local_transition(state, SessionEvent::DismissRules, || async { Ok(()) }).await?;
    Ok(session_view(state).await)
}

/// Fetch the roster and replace the teams. Scores of the previous draw are discarded.
pub async fn draw_teams(state: &SharedState) -> Result<SessionView, ServiceError> {
    let store = state.require_store().await?;
    let unassigned = state.config().unassigned_team.clone();

    run_transition_with_broadcast(state, SessionEvent::DrawTeams, || async move {
        let rows = store.list_players().await?;
        let teams = group_into_teams(rows, &unassigned);
        info!(teams = teams.len(), "teams drawn");
        state
            .with_session_mut(|session| session.replace_teams(teams))
            .await;
        Ok(())
    })
    .await?;

    Ok(session_view(state).await)
}

/// Add `delta` points (the configured step when absent) to a team.
pub async fn adjust_score(
    state: &SharedState,
    team_id: TeamId,
    delta: Option<i32>,
) -> Result<SessionView, ServiceError> {
    let delta = delta.unwrap_or(state.config().score_step);

    run_local_transition(state, SessionEvent::AdjustScore, || async move {
        let score = state
            .with_session_mut(|session| session.adjust_score(team_id, delta))
            .await
            .ok_or_else(|| ServiceError::NotFound(format!("team {team_id}")))?;
        debug!(team_id, delta, score, "score adjusted");
        Ok(())
    })
    .await?;

    Ok(session_view(state).await)
}

/// Flip the lightning round; switching it on opens the category picker.
pub async fn toggle_lightning(state: &SharedState) -> Result<SessionView, ServiceError> {
    let enabled = !state.read_session(|session| session.lightning).await;
    let event = SessionEvent::ToggleLightning { enabled };

    if enabled {
        enter_categories(state, event, move |session| session.set_lightning(true)).await
    } else {
        run_local_transition(state, event, || async move {
            state
                .with_session_mut(|session| session.set_lightning(false))
                .await;
            Ok(())
        })
        .await?;
        Ok(session_view(state).await)
    }
}

/// Advance the round counter and open the category picker.
pub async fn start_next_round(state: &SharedState) -> Result<SessionView, ServiceError> {
    let max_round = state.config().max_round;
    enter_categories(state, SessionEvent::StartNextRound, move |session| {
        session.start_next_round(max_round)
    })
    .await
}

/// Open the category picker from the scoreboard.
pub async fn open_categories(state: &SharedState) -> Result<SessionView, ServiceError> {
    enter_categories(state, SessionEvent::OpenCategories, |_| {}).await
}

/// Leave the numbers grid for the category picker.
pub async fn back_to_categories(state: &SharedState) -> Result<SessionView, ServiceError> {
    enter_categories(state, SessionEvent::BackToCategories, |_| {}).await
}

/// Open a category by name and load its numbers grid.
pub async fn pick_category(
    state: &SharedState,
    theme: String,
) -> Result<SessionView, ServiceError> {
    choose_category(state, theme).await
}

/// Draw a category at random among the eligible ones.
///
/// Nothing happens when no category is eligible.
pub async fn draw_category(state: &SharedState) -> Result<SessionView, ServiceError> {
    let phase = state.phase().await;
    if phase != SessionPhase::Categories {
        return Err(InvalidTransition {
            from: phase,
            event: SessionEvent::ChooseCategory,
        }
        .into());
    }

    let drawn = state
        .read_session(|session| {
            session
                .categories
                .draw(&mut rand::rng())
                .map(str::to_string)
        })
        .await;

    match drawn {
        Some(theme) => {
            info!(theme = %theme, "category drawn");
            choose_category(state, theme).await
        }
        None => {
            info!("no category eligible for the draw");
            Ok(session_view(state).await)
        }
    }
}

/// Go back to the scoreboard.
pub async fn view_scoreboard(state: &SharedState) -> Result<SessionView, ServiceError> {
    run_local_transition(state, SessionEvent::ViewScoreboard, || async move {
        state.with_session_mut(Session::close_question).await;
        Ok(())
    })
    .await?;
    Ok(session_view(state).await)
}

/// Open a question of the current grid.
pub async fn open_question(
    state: &SharedState,
    id: QuestionId,
) -> Result<SessionView, ServiceError> {
    let store = state.require_store().await?;

    run_transition_with_broadcast(state, SessionEvent::OpenQuestion, || async move {
        let summary = state
            .read_session(|session| session.summary(id).cloned())
            .await
            .ok_or_else(|| ServiceError::NotFound(format!("question {id} is not in the grid")))?;
        if summary.used {
            return Err(ServiceError::InvalidState(format!(
                "question {} was already played",
                summary.number
            )));
        }

        let entity = store.find_question(id).await?;
        info!(id, number = entity.question_number, "question opened");
        state
            .with_session_mut(|session| session.open_question(entity.into()))
            .await;
        Ok(())
    })
    .await?;

    Ok(session_view(state).await)
}

/// Leave the question for the numbers grid without touching its used flag.
pub async fn back_to_numbers(state: &SharedState) -> Result<SessionView, ServiceError> {
    run_local_transition(state, SessionEvent::BackToNumbers, || async move {
        state.with_session_mut(Session::close_question).await;
        Ok(())
    })
    .await?;
    Ok(session_view(state).await)
}

/// Record a click on an answer button.
///
/// Clicks on an already selected option, or after the correct one was found, leave the
/// selection unchanged.
pub async fn select_option(
    state: &SharedState,
    letter: OptionLetter,
) -> Result<SessionView, ServiceError> {
    run_local_transition(state, SessionEvent::SelectOption, || async move {
        let (changed, correct) = state
            .with_session_mut(|session| {
                (
                    session.select_option(letter),
                    session.answer.correct_answered,
                )
            })
            .await;
        if changed {
            info!(option = %letter, correct, "option selected");
        } else {
            debug!(option = %letter, "selection ignored");
        }
        Ok(())
    })
    .await?;
    Ok(session_view(state).await)
}

/// Show the correct option after a wrong guess.
pub async fn reveal_answer(state: &SharedState) -> Result<SessionView, ServiceError> {
    run_local_transition(state, SessionEvent::RevealAnswer, || async move {
        let revealed = state.with_session_mut(Session::reveal_answer).await;
        if revealed {
            Ok(())
        } else {
            Err(ServiceError::InvalidState(
                "the answer can only be revealed after a wrong guess".into(),
            ))
        }
    })
    .await?;
    Ok(session_view(state).await)
}

/// Persist the used flag of the question on screen and return to its grid.
///
/// The session stays on the question when the write fails. A failed refetch after a successful
/// write only flags the question locally.
pub async fn mark_used(state: &SharedState) -> Result<SessionView, ServiceError> {
    let store = state.require_store().await?;

    run_transition_with_broadcast(state, SessionEvent::MarkUsed, || async move {
        let started = Instant::now();
        let (id, theme) = state
            .read_session(|session| {
                if !session.can_mark_used() {
                    return None;
                }
                let question = session.current_question.as_ref()?;
                let theme = session
                    .current_category
                    .clone()
                    .unwrap_or_else(|| question.theme.clone());
                Some((question.id, theme))
            })
            .await
            .ok_or_else(|| {
                ServiceError::InvalidState(
                    "a question can only be marked used once its answer is known".into(),
                )
            })?;

        store.mark_used(id).await?;
        info!(id, "question marked used");

        // The write is committed: the refetch must settle well before the transition limit so
        // the session still leaves the question.
        let refetch_limit = state
            .config()
            .transition_timeout
            .saturating_sub(started.elapsed())
            / 2;
        let refreshed = match timeout(refetch_limit, store.list_questions(theme.clone())).await {
            Ok(Ok(rows)) => Some(rows.into_iter().map(QuestionSummary::from).collect()),
            Ok(Err(err)) => {
                warn!(theme = %theme, error = %err, "failed to refresh questions after marking used");
                None
            }
            Err(_) => {
                warn!(theme = %theme, ?refetch_limit, "question refresh timed out after marking used");
                None
            }
        };

        state
            .with_session_mut(|session| {
                match refreshed {
                    Some(questions) => session.refresh_questions(questions),
                    None => session.flag_used(id),
                }
                session.close_question();
            })
            .await;
        Ok(())
    })
    .await?;

    Ok(session_view(state).await)
}

async fn choose_category(state: &SharedState, theme: String) -> Result<SessionView, ServiceError> {
    let store = state.require_store().await?;

    run_transition_with_broadcast(state, SessionEvent::ChooseCategory, || async move {
        let known = state
            .read_session(|session| session.categories.contains(&theme))
            .await;
        if !known {
            return Err(ServiceError::NotFound(format!("category `{theme}`")));
        }

        let rows = store.list_questions(theme.clone()).await?;
        let questions = rows
            .into_iter()
            .map(QuestionSummary::from)
            .collect::<Vec<_>>();
        info!(theme = %theme, questions = questions.len(), "category opened");
        state
            .with_session_mut(|session| session.enter_category(theme, questions))
            .await;
        Ok(())
    })
    .await?;

    Ok(session_view(state).await)
}

/// Run a transition landing on the category picker, loading the categories first when the
/// board is still empty.
///
/// A failed load is logged and the picker opens empty.
async fn enter_categories<F>(
    state: &SharedState,
    event: SessionEvent,
    mutate: F,
) -> Result<SessionView, ServiceError>
where
    F: FnOnce(&mut Session),
{
    let needs_load = state
        .read_session(|session| session.categories.is_empty())
        .await;
    let store = if needs_load {
        state.store().await
    } else {
        None
    };

    match store {
        Some(store) => {
            run_transition_with_broadcast(state, event, || async move {
                if let Err(err) = load_categories(state, store.as_ref()).await {
                    warn!(error = %err, "failed to load categories");
                }
                state
                    .with_session_mut(|session| {
                        mutate(session);
                        session.close_question();
                    })
                    .await;
                Ok(())
            })
            .await?
        }
        None => {
            run_local_transition(state, event, || async move {
                state
                    .with_session_mut(|session| {
                        mutate(session);
                        session.close_question();
                    })
                    .await;
                Ok(())
            })
            .await?
        }
    }

    Ok(session_view(state).await)
}

async fn load_categories(
    state: &SharedState,
    store: &dyn TriviaStore,
) -> Result<usize, ServiceError> {
    let rows = store.list_themes().await?;
    let board = CategoryBoard::from_themes(
        rows.into_iter().map(|row| row.theme),
        state.config().pinned_category.clone(),
    );
    let count = board.categories().len();
    info!(categories = count, "categories loaded");
    state
        .with_session_mut(|session| session.set_categories(board))
        .await;
    Ok(count)
}
