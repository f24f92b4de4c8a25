use axum::{
    Json, Router,
    extract::{Path, State},
    routing::{get, post},
};
use axum_valid::Valid;
use validator::Validate;

use crate::{
    dto::{
        actions::{PickCategoryRequest, ScoreAdjustmentRequest, SelectOptionRequest},
        session::SessionView,
    },
    error::{AppError, ServiceError},
    services::session_service,
    state::{
        SharedState,
        roster::TeamId,
        session::{OptionLetter, QuestionId},
        state_machine::SessionPhase,
    },
};

/// Routes driving the game night. Every action answers with the resulting session view.
pub fn router() -> Router<SharedState> {
    Router::new()
        .route("/session", get(get_session))
        .route("/session/rules/dismiss", post(dismiss_rules))
        .route("/session/teams/draw", post(draw_teams))
        .route("/session/teams/{id}/score", post(adjust_score))
        .route("/session/lightning", post(toggle_lightning))
        .route("/session/rounds/next", post(start_next_round))
        .route("/session/categories", post(open_categories))
        .route("/session/categories/pick", post(pick_category))
        .route("/session/categories/random", post(draw_category))
        .route("/session/scoreboard", post(view_scoreboard))
        .route("/session/questions/{id}", post(open_question))
        .route("/session/numbers", post(back_to_numbers))
        .route("/session/answer", post(select_option))
        .route("/session/answer/reveal", post(reveal_answer))
        .route("/session/question/used", post(mark_used))
}

type ViewResult = Result<Json<SessionView>, AppError>;

/// Current state of the game night.
#[utoipa::path(
    get,
    path = "/session",
    tag = "session",
    responses((status = 200, description = "Current session view", body = SessionView))
)]
pub async fn get_session(State(state): State<SharedState>) -> Json<SessionView> {
    Json(session_service::view(&state).await)
}

/// Leave the rules screen for the scoreboard.
#[utoipa::path(
    post,
    path = "/session/rules/dismiss",
    tag = "session",
    responses(
        (status = 200, description = "Rules dismissed", body = SessionView),
        (status = 409, description = "Not on the rules screen")
    )
)]
pub async fn dismiss_rules(State(state): State<SharedState>) -> ViewResult {
    Ok(Json(session_service::dismiss_rules(&state).await?))
}

/// Fetch the roster and form the teams.
#[utoipa::path(
    post,
    path = "/session/teams/draw",
    tag = "session",
    responses(
        (status = 200, description = "Teams drawn", body = SessionView),
        (status = 409, description = "Not on the scoreboard"),
        (status = 503, description = "Store unavailable")
    )
)]
pub async fn draw_teams(State(state): State<SharedState>) -> ViewResult {
    Ok(Json(session_service::draw_teams(&state).await?))
}

/// Add points to a team. Omitting `delta` adds the configured step.
#[utoipa::path(
    post,
    path = "/session/teams/{id}/score",
    tag = "session",
    params(("id" = u32, Path, description = "Team identifier from the last draw")),
    request_body(
        content = ScoreAdjustmentRequest,
        description = "Optional; a request without a body adds the configured step"
    ),
    responses(
        (status = 200, description = "Score adjusted", body = SessionView),
        (status = 400, description = "Delta out of range"),
        (status = 404, description = "Unknown team")
    )
)]
pub async fn adjust_score(
    State(state): State<SharedState>,
    Path(id): Path<TeamId>,
    payload: Option<Json<ScoreAdjustmentRequest>>,
) -> ViewResult {
    let request = payload.map(|Json(body)| body).unwrap_or_default();
    request.validate()?;
    Ok(Json(
        session_service::adjust_score(&state, id, request.delta).await?,
    ))
}

/// Flip the lightning round; switching it on opens the category picker.
#[utoipa::path(
    post,
    path = "/session/lightning",
    tag = "session",
    responses(
        (status = 200, description = "Lightning round toggled", body = SessionView),
        (status = 409, description = "Not on the scoreboard")
    )
)]
pub async fn toggle_lightning(State(state): State<SharedState>) -> ViewResult {
    Ok(Json(session_service::toggle_lightning(&state).await?))
}

/// Move on to the next round.
#[utoipa::path(
    post,
    path = "/session/rounds/next",
    tag = "session",
    responses(
        (status = 200, description = "Next round started", body = SessionView),
        (status = 409, description = "Not on the scoreboard")
    )
)]
pub async fn start_next_round(State(state): State<SharedState>) -> ViewResult {
    Ok(Json(session_service::start_next_round(&state).await?))
}

/// Open the category picker, from the scoreboard or the numbers grid.
#[utoipa::path(
    post,
    path = "/session/categories",
    tag = "session",
    responses(
        (status = 200, description = "Category picker opened", body = SessionView),
        (status = 409, description = "Not reachable from the current screen")
    )
)]
pub async fn open_categories(State(state): State<SharedState>) -> ViewResult {
    let view = match state.phase().await {
        SessionPhase::Numbers => session_service::back_to_categories(&state).await?,
        _ => session_service::open_categories(&state).await?,
    };
    Ok(Json(view))
}

/// Open a category by name.
#[utoipa::path(
    post,
    path = "/session/categories/pick",
    tag = "session",
    request_body = PickCategoryRequest,
    responses(
        (status = 200, description = "Category opened", body = SessionView),
        (status = 404, description = "Unknown category"),
        (status = 409, description = "Not on the category picker"),
        (status = 503, description = "Store unavailable")
    )
)]
pub async fn pick_category(
    State(state): State<SharedState>,
    Valid(Json(payload)): Valid<Json<PickCategoryRequest>>,
) -> ViewResult {
    Ok(Json(
        session_service::pick_category(&state, payload.theme).await?,
    ))
}

/// Open a category drawn at random; does nothing when no category is eligible.
#[utoipa::path(
    post,
    path = "/session/categories/random",
    tag = "session",
    responses(
        (status = 200, description = "Category drawn, or unchanged view", body = SessionView),
        (status = 409, description = "Not on the category picker"),
        (status = 503, description = "Store unavailable")
    )
)]
pub async fn draw_category(State(state): State<SharedState>) -> ViewResult {
    Ok(Json(session_service::draw_category(&state).await?))
}

/// Go back to the scoreboard.
#[utoipa::path(
    post,
    path = "/session/scoreboard",
    tag = "session",
    responses(
        (status = 200, description = "Scoreboard shown", body = SessionView),
        (status = 409, description = "Not reachable from the current screen")
    )
)]
pub async fn view_scoreboard(State(state): State<SharedState>) -> ViewResult {
    Ok(Json(session_service::view_scoreboard(&state).await?))
}

/// Open a question of the numbers grid.
#[utoipa::path(
    post,
    path = "/session/questions/{id}",
    tag = "session",
    params(("id" = i64, Path, description = "Question identifier")),
    responses(
        (status = 200, description = "Question opened", body = SessionView),
        (status = 404, description = "Question not in the grid or missing from the store"),
        (status = 409, description = "Question already played, duplicated, or wrong screen"),
        (status = 503, description = "Store unavailable")
    )
)]
pub async fn open_question(
    State(state): State<SharedState>,
    Path(id): Path<QuestionId>,
) -> ViewResult {
    Ok(Json(session_service::open_question(&state, id).await?))
}

/// Leave the question for the numbers grid.
#[utoipa::path(
    post,
    path = "/session/numbers",
    tag = "session",
    responses(
        (status = 200, description = "Numbers grid shown", body = SessionView),
        (status = 409, description = "No question on screen")
    )
)]
pub async fn back_to_numbers(State(state): State<SharedState>) -> ViewResult {
    Ok(Json(session_service::back_to_numbers(&state).await?))
}

/// Record a click on an answer button.
#[utoipa::path(
    post,
    path = "/session/answer",
    tag = "session",
    request_body = SelectOptionRequest,
    responses(
        (status = 200, description = "Selection recorded", body = SessionView),
        (status = 400, description = "Not one of A, B, C or D"),
        (status = 409, description = "No question on screen")
    )
)]
pub async fn select_option(
    State(state): State<SharedState>,
    Valid(Json(payload)): Valid<Json<SelectOptionRequest>>,
) -> ViewResult {
    let letter = payload
        .option
        .parse::<OptionLetter>()
        .map_err(|err| ServiceError::InvalidInput(err.to_string()))?;
    Ok(Json(session_service::select_option(&state, letter).await?))
}

/// Show the correct option after a wrong guess.
#[utoipa::path(
    post,
    path = "/session/answer/reveal",
    tag = "session",
    responses(
        (status = 200, description = "Answer revealed", body = SessionView),
        (status = 409, description = "Nothing to reveal")
    )
)]
pub async fn reveal_answer(State(state): State<SharedState>) -> ViewResult {
    Ok(Json(session_service::reveal_answer(&state).await?))
}

/// Flag the question on screen as played and return to its grid.
#[utoipa::path(
    post,
    path = "/session/question/used",
    tag = "session",
    responses(
        (status = 200, description = "Question marked used", body = SessionView),
        (status = 404, description = "Question missing from the store"),
        (status = 409, description = "Answer not known yet"),
        (status = 503, description = "Store unavailable")
    )
)]
pub async fn mark_used(State(state): State<SharedState>) -> ViewResult {
    Ok(Json(session_service::mark_used(&state).await?))
}
